#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs
)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]

#[cfg(feature = "host")]
pub use ninasock_host::*;
#[cfg(not(feature = "host"))]
pub use ninasock_core::*;
