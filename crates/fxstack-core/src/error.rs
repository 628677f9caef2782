//! Error types for FxStack.

use thiserror::Error;

/// Main error type for filter stack operations.
#[derive(Error, Debug)]
pub enum FxStackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A saved snapshot was made for a different filter type or schema.
    #[error(
        "Saved Filter data not applicable for this Filter! \
         Saved data is for {saved} Filter, current edited Filter is {current}."
    )]
    Incompatible { saved: String, current: String },

    #[error("Filter index {index} out of range for stack of {len}")]
    InvalidIndex { index: usize, len: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for FxStack operations.
pub type Result<T> = std::result::Result<T, FxStackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incompatible_message_names_both_filters() {
        let err = FxStackError::Incompatible {
            saved: "Blur".into(),
            current: "Saturation".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Saved data is for Blur Filter"));
        assert!(msg.contains("current edited Filter is Saturation"));
    }
}
