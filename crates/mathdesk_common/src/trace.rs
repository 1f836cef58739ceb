//! Execution trace types and the trace formatter.
//!
//! Every step of a run lands in the trace, failed or not, with its full
//! diagnostic text. The formatter is a pure function used to build the
//! refiner prompt; it filters nothing.

use crate::plan::Step;
use crate::tool::{ToolCall, ToolResult};
use serde::Serialize;

/// Record of one executed (or attempted) plan step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionStep {
    pub step: Step,
    /// The parsed call, when action extraction and argument parsing both
    /// succeeded.
    pub call: Option<ToolCall>,
    pub result: Option<ToolResult>,
    /// Output validator verdict for this step.
    pub valid: bool,
    /// The full generated continuation, kept verbatim for audit and for
    /// the refinement pass.
    pub diagnostic_text: String,
}

/// Ordered record of all steps in one run. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    pub steps: Vec<ExecutionStep>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: ExecutionStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Render the trace as labeled per-step blocks joined by blank lines.
pub fn format_trace(trace: &Trace) -> String {
    let mut blocks = Vec::with_capacity(trace.steps.len());
    for (i, step) in trace.steps.iter().enumerate() {
        let tool = step
            .call
            .as_ref()
            .map(|c| c.tool.to_string())
            .unwrap_or_else(|| "none".to_string());
        let input = step
            .call
            .as_ref()
            .map(|c| c.render())
            .unwrap_or_else(|| "N/A".to_string());
        let (output, result) = match &step.result {
            Some(r) if r.success => {
                let value = r
                    .value
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "null".to_string());
                ("success".to_string(), value)
            }
            Some(r) => {
                let error = r.error.as_deref().unwrap_or("unknown error");
                (format!("error: {}", error), "N/A".to_string())
            }
            None => ("no tool executed".to_string(), "N/A".to_string()),
        };
        blocks.push(format!(
            "Step {}:\n  - Task: {}\n  - Tool: {}\n  - Input: {}\n  - Output: {}\n  - Result: {}",
            i + 1,
            step.step.text,
            tool,
            input,
            output,
            result
        ));
    }
    blocks.join("\n\n")
}
