//! Output validation.
//!
//! Fails closed: a result is valid only when the capability reported
//! success and produced a value, plus a per-tool shape check. These are
//! total functions — validation can never panic or propagate an error,
//! only return `false`.

use mathdesk_common::{Literal, ToolName, ToolResult};
use tracing::debug;

/// Check per-tool success postconditions for one executed call.
pub fn validate(tool: ToolName, input: &[Literal], output: &ToolResult) -> bool {
    if !output.success {
        return false;
    }
    let Some(value) = output.value.as_ref() else {
        return false;
    };

    let valid = match tool {
        // A calculator result must be numeric and must come from a
        // non-empty invocation. The one non-numeric shape the calculator
        // produces is the ratio rendering ("3:2"); any other string is
        // invalid.
        ToolName::Calculator => {
            !input.is_empty()
                && match value {
                    Literal::Number(_) => true,
                    Literal::Str(s) => is_ratio_shaped(s),
                    _ => false,
                }
        }
        ToolName::AlgebraSolver | ToolName::ConstraintSolver => !value.is_null(),
        ToolName::LpSolver => !value.is_null(),
    };

    if !valid {
        debug!(tool = %tool, "tool output failed validation");
    }
    valid
}

/// Colon-separated integers, the calculator's ratio rendering.
fn is_ratio_shaped(s: &str) -> bool {
    let parts: Vec<&str> = s.split(':').collect();
    parts.len() >= 2 && parts.iter().all(|p| p.parse::<i64>().is_ok())
}
