//! Greenprompt core — shared configuration, errors, token estimation,
//! and savings arithmetic.

pub mod config;
pub mod error;
pub mod savings;
pub mod tokens;

pub use config::{load_filler_rules, CompressorConfig, FillerRule};
pub use error::{GpError, Result};
pub use savings::{Savings, SavingsEstimator};
pub use tokens::estimate_tokens;
