#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs
)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]

pub use ninasock_core::*;
mod host_driver;
pub use host_driver::HostDriver;
mod entry;
mod error;
