//! Logging macros that forward to either `tracing` or `defmt`.
//!
//! Both crates expose macros of the same names, so each of ours is a thin forwarder to whichever
//! backend is enabled. Only integers are passed as arguments, since those format on both.

#[cfg(feature = "tracing")]
pub(crate) use tracing as backend;
// `embedded` pulls in `defmt`, and one of the two features is required (see `lib.rs`).
#[cfg(not(feature = "tracing"))]
pub(crate) use defmt as backend;

macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log::backend::warn!($($arg)*)
    }
}

macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log::backend::debug!($($arg)*)
    }
}

macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log::backend::trace!($($arg)*)
    }
}
