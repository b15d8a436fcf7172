//! Laser hair-removal package quote engine.

pub mod config;
pub mod error;
pub mod logging;
pub mod pricing;

pub use config::Config;
pub use error::{AppError, Result};
