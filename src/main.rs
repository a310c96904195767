use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use native_bridge::module::names;
use native_bridge::{Bridge, HostValue, Manifest, NativeModule, Signature, WasmModule};

#[derive(Parser)]
#[command(name = "native-bridge")]
#[command(about = "Call entry points of a native WebAssembly module with JSON arguments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke an entry point and print its result as JSON
    Call {
        /// Name of the exported entry point
        entry: String,

        /// Arguments as JSON literals (e.g. 42, 1.5, '"text"', '[1, [2]]')
        args: Vec<String>,

        /// Path to the .wasm or .wat module (defaults to the manifest's module)
        #[arg(long, env = "NATIVE_BRIDGE_MODULE")]
        module: Option<PathBuf>,

        /// Declared parameter types, comma separated
        #[arg(long, value_delimiter = ',')]
        params: Option<Vec<String>>,

        /// Declared return type
        #[arg(long, value_delimiter = ',')]
        returns: Option<Vec<String>>,

        /// TOML manifest with entry signatures
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// List the entry points a module exports
    Exports {
        /// Path to the .wasm or .wat module
        #[arg(long, env = "NATIVE_BRIDGE_MODULE")]
        module: PathBuf,
    },

    /// Verify that a module exports every entry declared in a manifest
    Check {
        /// TOML manifest with entry signatures
        #[arg(long)]
        manifest: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Call {
            entry,
            args,
            module,
            params,
            returns,
            manifest,
        } => {
            let manifest = manifest
                .map(|path| {
                    Manifest::from_file(&path)
                        .with_context(|| format!("loading manifest {}", path.display()))
                })
                .transpose()?;

            let signature = resolve_signature(&entry, params, returns, manifest.as_ref())?;

            let module_path = module
                .or_else(|| manifest.as_ref().and_then(Manifest::module_path))
                .context("no module given: pass --module or a manifest with [module] path")?;

            let args = args
                .iter()
                .enumerate()
                .map(|(i, arg)| parse_arg(i, arg))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let module = WasmModule::from_file(&module_path)
                .with_context(|| format!("loading module {}", module_path.display()))?;
            let mut bridge = Bridge::new(module);

            tracing::debug!(%entry, %signature, "invoking");
            let result = bridge.invoke_signature(&entry, &signature, args)?;
            println!("{}", serde_json::Value::from(result));
        }

        Commands::Exports { module } => {
            let module = WasmModule::from_file(&module)
                .with_context(|| format!("loading module {}", module.display()))?;
            for name in module
                .entry_names()
                .into_iter()
                .filter(|name| !names::PRIMITIVES.contains(name))
            {
                println!("{name}");
            }
        }

        Commands::Check { manifest: path } => {
            let manifest = Manifest::from_file(&path)
                .with_context(|| format!("loading manifest {}", path.display()))?;
            let module_path = manifest
                .module_path()
                .context("manifest has no [module] path")?;
            let module = WasmModule::from_file(&module_path)
                .with_context(|| format!("loading module {}", module_path.display()))?;

            let missing: Vec<&str> = manifest
                .entry_names()
                .filter(|name| !module.has_entry(name))
                .collect();
            if !missing.is_empty() {
                bail!("module does not export: {}", missing.join(", "));
            }

            for entry in &manifest.entries {
                println!("{} {}", entry.name, entry.signature());
            }
        }
    }

    Ok(())
}

/// Explicit flags win over the manifest; with neither the entry takes no
/// arguments and its result passes through undecoded.
fn resolve_signature(
    entry: &str,
    params: Option<Vec<String>>,
    returns: Option<Vec<String>>,
    manifest: Option<&Manifest>,
) -> anyhow::Result<Signature> {
    if params.is_none() && returns.is_none() {
        if let Some(signature) = manifest.and_then(|m| m.signature(entry)) {
            return Ok(signature);
        }
    }

    let tokens = |list: &Option<Vec<String>>| -> Vec<String> {
        list.iter()
            .flatten()
            .filter(|t| !t.trim().is_empty())
            .map(|t| t.trim().to_string())
            .collect()
    };
    Ok(Signature::parse(&tokens(&params), &tokens(&returns))?)
}

fn parse_arg(index: usize, arg: &str) -> anyhow::Result<HostValue> {
    let json: serde_json::Value = serde_json::from_str(arg)
        .with_context(|| format!("argument {index} is not valid JSON: {arg}"))?;
    HostValue::try_from(json).with_context(|| format!("argument {index}: {arg}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use native_bridge::ValueType;

    fn list(tokens: &[&str]) -> Option<Vec<String>> {
        Some(tokens.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_flags_override_manifest() {
        let manifest = Manifest::from_str(
            r#"
[[entries]]
name = "add"
params = ["int", "int"]
returns = ["int"]
"#,
        )
        .unwrap();

        let sig = resolve_signature("add", None, None, Some(&manifest)).unwrap();
        assert_eq!(sig.return_type(), Some(ValueType::Int));

        let sig = resolve_signature("add", list(&["float"]), list(&[" void "]), Some(&manifest))
            .unwrap();
        assert_eq!(sig, Signature::new(vec![ValueType::Float], None));
    }

    #[test]
    fn test_unknown_param_token_is_rejected() {
        assert!(resolve_signature("f", list(&["int", "i64"]), None, None).is_err());
        let sig = resolve_signature("f", None, None, None).unwrap();
        assert!(sig.params.is_empty());
    }
}
