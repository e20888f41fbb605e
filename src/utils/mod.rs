//! Utility functions
//!
//! Provides logging setup and handle validation.

pub mod logging;
pub mod validation;

pub use validation::is_valid_handle;
