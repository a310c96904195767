//! Library-level tracing that disappears without the `logging` feature.
//!
//! The bridge never installs a subscriber; binaries and embedders do. With
//! `logging` off every macro expands to an empty block.
//!
//! ```rust,ignore
//! use crate::logging::{debug, trace};
//!
//! debug!(entry = name, args = args.len(), "calling entry");
//! trace!(ptr = ptr.offset(), len, "encoded string");
//! ```

macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        tracing::trace!($($arg)*);
    }};
}

macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        tracing::debug!($($arg)*);
    }};
}

/// Lifecycle events such as module instantiation.
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        tracing::info!($($arg)*);
    }};
}

/// Data the decoder had to drop.
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        tracing::warn!($($arg)*);
    }};
}

pub(crate) use log_debug as debug;
#[allow(unused_imports)]
pub(crate) use log_info as info;
pub(crate) use log_trace as trace;
pub(crate) use log_warn as warn;
