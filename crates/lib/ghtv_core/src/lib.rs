//! # ghtv_core
//!
//! Token validation, batch scheduling and reporting for ghtv.

// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

pub mod batch;
pub mod credentials;
pub mod models;
pub mod report;
pub mod validator;

#[cfg(test)]
mod test_support;
