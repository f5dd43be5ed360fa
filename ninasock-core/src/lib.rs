#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs
)]
#![warn(unreachable_pub, clippy::std_instead_of_core)]
#![doc = include_str!("../README.md")]

#[cfg(all(not(feature = "std"), not(feature = "embedded")))]
compile_error!("Either 'std' or 'embedded' feature must be enabled.");

#[macro_use]
mod log;

pub mod driver;
pub use driver::{Completion, Driver};
mod error;
pub use error::{errno, Error, Result};
mod interface;
pub use interface::Interface;
pub mod socket;
pub use socket::{IoControl, Protocol, Socket, State, Type, INVALID_HANDLE};

#[cfg(test)]
mod test_utils;
