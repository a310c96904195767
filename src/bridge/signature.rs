//! Declared signatures and argument coercion.

use std::fmt;

use super::CallError;
use crate::logging::debug;
use crate::module::RawValue;
use crate::value::{HostValue, ValueType};

/// Declared parameter and return types of an entry point.
///
/// Only the first declared return token is kept. A token outside the known
/// set leaves the return undeclared, so the raw result passes through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<ValueType>,
    pub returns: Option<ValueType>,
}

impl Signature {
    pub fn new(params: Vec<ValueType>, returns: Option<ValueType>) -> Self {
        Self { params, returns }
    }

    /// Parse declared type tokens such as `["string", "int"]`.
    ///
    /// Parameter tokens must all be known. Of the return tokens only the
    /// first is consulted, and an unknown one (`"void"`, `"tuple"`) is ignored.
    pub fn parse<S: AsRef<str>>(params: &[S], returns: &[S]) -> Result<Self, CallError> {
        let params = params
            .iter()
            .map(|p| p.as_ref().parse::<ValueType>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            params,
            returns: declared_return(returns),
        })
    }

    /// The return type the bridge decodes.
    pub fn return_type(&self) -> Option<ValueType> {
        self.returns
    }
}

/// The return type named by the first of `returns`, if it is a known token.
pub fn declared_return<S: AsRef<str>>(returns: &[S]) -> Option<ValueType> {
    let token = returns.first()?.as_ref();
    let parsed = token.parse::<ValueType>().ok();
    if parsed.is_none() {
        debug!(token, "return type not decoded, passing result through");
    }
    parsed
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        match self.returns {
            Some(ret) => write!(f, "({params}) -> {ret}"),
            None => write!(f, "({params})"),
        }
    }
}

/// An argument that passed validation, before encoding.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Checked<'a> {
    Raw(RawValue),
    String(&'a str),
    Array(&'a [HostValue]),
}

/// Validate `value` against `expected` and pick its calling-convention form.
///
/// Primitives pass through unchanged; booleans and numbers declared `bool`
/// become `1` when true or strictly positive and `0` otherwise (so negative
/// numbers map to `0`).
pub(crate) fn check(
    index: usize,
    expected: ValueType,
    value: &HostValue,
) -> Result<Checked<'_>, CallError> {
    let checked = match (expected, value) {
        (ValueType::String, HostValue::String(s)) => Some(Checked::String(s)),
        (ValueType::Array, HostValue::Array(items)) => Some(Checked::Array(items)),
        (ValueType::Int, HostValue::Int(v)) => Some(Checked::Raw(RawValue::I32(*v))),
        (ValueType::Int, HostValue::Float(v)) if is_integral(*v) => {
            Some(Checked::Raw(RawValue::F32(*v)))
        }
        (ValueType::Float, HostValue::Int(v)) => Some(Checked::Raw(RawValue::I32(*v))),
        (ValueType::Float, HostValue::Float(v)) if !v.is_nan() => {
            Some(Checked::Raw(RawValue::F32(*v)))
        }
        (ValueType::Bool, HostValue::Bool(b)) => Some(Checked::Raw(RawValue::I32(i32::from(*b)))),
        (ValueType::Bool, HostValue::Int(v)) => Some(Checked::Raw(RawValue::I32(i32::from(*v > 0)))),
        (ValueType::Bool, HostValue::Float(v)) => {
            Some(Checked::Raw(RawValue::I32(i32::from(*v > 0.0))))
        }
        _ => None,
    };

    checked.ok_or(CallError::TypeMismatch {
        index,
        expected,
        got: value.kind(),
    })
}

/// A float that an integer parameter accepts: finite, whole and within `i32`.
fn is_integral(v: f32) -> bool {
    v.is_finite() && v.fract() == 0.0 && v >= i32::MIN as f32 && v < i32::MAX as f32
}
