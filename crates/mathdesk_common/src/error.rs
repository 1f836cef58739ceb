//! Error types shared across the pipeline.
//!
//! Parse and dispatch failures are local to one execution step: they are
//! captured into the trace and never abort a run. Only service-level
//! failures (defined engine-side) are fatal.

use thiserror::Error;

/// Failure to extract a tool action from generated text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionParseError {
    /// No `<ACTION>...</ACTION>` span was found in the continuation.
    #[error("no tool action found in response")]
    MissingAction,

    /// An action span was found but it does not match `identifier(...)`.
    #[error("tool call format invalid: {0}")]
    MalformedCall(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_call_keeps_the_span_text_unescaped() {
        let err = ActionParseError::MalformedCall("just \"do\" it".to_string());
        assert_eq!(err.to_string(), "tool call format invalid: just \"do\" it");
    }
}

/// Failure to parse argument text as a strict literal sequence.
///
/// Carries the original text so the step diagnostic keeps the exact
/// input that was rejected. There is deliberately no fallback path:
/// text that is not a literal is an error, never something to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse arguments at offset {offset}: {message}")]
pub struct ArgParseError {
    pub message: String,
    pub offset: usize,
    pub text: String,
}

/// Failure to parse or evaluate a restricted expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExprError {
    pub message: String,
}

impl ExprError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A tool name outside the closed capability set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool requested: {0}")]
pub struct UnknownToolError(pub String);
