use std::error::Error;
use std::fmt;

/// Error crossing the evaluation-engine boundary.
///
/// The trial-evaluation probe is the only fallible call in an analysis pass;
/// everything it can go wrong with is folded into this one message-carrying
/// type so the rule engine can classify it by content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvalError: {}", self.message)
    }
}

impl Error for EvalError {}

impl From<String> for EvalError {
    fn from(message: String) -> Self {
        EvalError { message }
    }
}

impl From<&str> for EvalError {
    fn from(message: &str) -> Self {
        EvalError::new(message)
    }
}
