// core logic - query validation and batch size advice

mod batch;
mod rules;
mod validator;

pub use batch::BatchCheckResult;
pub use validator::{
    DEFAULT_BATCH_THRESHOLD, QueryType, ValidationResult, Validator, ValidatorConfig, classify,
    detect_write,
};
