// deepdive library - sql safety lint plus chart and diagram helpers

pub mod chart;
pub mod cli;
mod core;
pub mod diagram;
mod error;
mod files;
pub mod output;
mod server;

pub use self::core::{
    BatchCheckResult, DEFAULT_BATCH_THRESHOLD, QueryType, ValidationResult, Validator,
    ValidatorConfig, classify, detect_write,
};
pub use error::Error;
pub use server::Server;
