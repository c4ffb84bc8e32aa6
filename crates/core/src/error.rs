/// Errors raised by the shared domain types, e.g. when parsing configuration values.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}
