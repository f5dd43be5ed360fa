//! Utilities shared by the unit tests.

mod mock_driver;
pub(crate) use mock_driver::MockDriver;
