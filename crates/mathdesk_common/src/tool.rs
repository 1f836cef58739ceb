//! Tool call and result types.
//!
//! The capability set is a closed enum rather than a string-keyed map, so
//! adding or removing a tool is a compile-time-checked change and the
//! unknown-tool case is a single explicit `FromStr` failure before any
//! dispatch happens.

use crate::error::UnknownToolError;
use crate::literal::Literal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The fixed set of computational capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    Calculator,
    AlgebraSolver,
    ConstraintSolver,
    LpSolver,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::Calculator,
        ToolName::AlgebraSolver,
        ToolName::ConstraintSolver,
        ToolName::LpSolver,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Calculator => "calculator",
            ToolName::AlgebraSolver => "algebra_solver",
            ToolName::ConstraintSolver => "constraint_solver",
            ToolName::LpSolver => "lp_solver",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = UnknownToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calculator" => Ok(ToolName::Calculator),
            "algebra_solver" => Ok(ToolName::AlgebraSolver),
            "constraint_solver" => Ok(ToolName::ConstraintSolver),
            "lp_solver" => Ok(ToolName::LpSolver),
            other => Err(UnknownToolError(other.to_string())),
        }
    }
}

/// A parsed, typed invocation request. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCall {
    pub tool: ToolName,
    pub arguments: Vec<Literal>,
}

impl ToolCall {
    pub fn new(tool: ToolName, arguments: Vec<Literal>) -> Self {
        Self { tool, arguments }
    }

    /// Canonical `tool(arg, arg)` rendering for traces and memory.
    pub fn render(&self) -> String {
        let args = self
            .arguments
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.tool, args)
    }
}

/// Outcome of one capability invocation. Capability-internal problems
/// (infeasible systems, division by zero, bad shapes) are reported here
/// via `success = false`, never by panicking across the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub value: Option<Literal>,
    pub error: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl ToolResult {
    pub fn ok(value: Literal) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.into()),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// One-line summary for the memory window.
    pub fn summary(&self) -> String {
        if self.success {
            match &self.value {
                Some(value) => value.to_string(),
                None => "(no value)".to_string(),
            }
        } else {
            format!(
                "failed: {}",
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_name_round_trips_through_str() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
    }

    #[test]
    fn unknown_tool_is_an_error() {
        let err = "shell".parse::<ToolName>().unwrap_err();
        assert_eq!(err.0, "shell");
    }

    #[test]
    fn call_rendering() {
        let call = ToolCall::new(
            ToolName::Calculator,
            vec![
                Literal::Str("add".to_string()),
                Literal::List(vec![Literal::Number(1.0), Literal::Number(2.0)]),
            ],
        );
        assert_eq!(call.render(), "calculator(\"add\", [1, 2])");
    }

    #[test]
    fn result_summaries() {
        assert_eq!(ToolResult::ok(Literal::Number(6.0)).summary(), "6");
        assert_eq!(
            ToolResult::fail("no operands provided").summary(),
            "failed: no operands provided"
        );
    }
}
