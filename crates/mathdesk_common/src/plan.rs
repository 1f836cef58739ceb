//! Plan normalization.
//!
//! Turns the raw decomposition text produced by the planner model into an
//! ordered, non-empty list of steps. The model output is free text with
//! assorted enumerator styles and the occasional leaked reasoning block;
//! normalization strips all of that and keeps only lines that look like
//! actual instructions.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Sentinel step used when no usable plan line survives normalization.
/// Plan emptiness is recoverable, never fatal.
pub const FALLBACK_PLAN_STEP: &str = "Could not determine plan.";

/// Marker for leaked internal reasoning; lines containing it are dropped.
const REASONING_CLOSE_MARKER: &str = "</think>";

/// One unit of the decomposed plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub text: String,
}

impl Step {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Ordered sequence of steps for one problem. Created once per run and
/// never mutated; re-planning replaces the whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    /// True when the plan is only the fallback sentinel.
    pub fn is_fallback(&self) -> bool {
        self.steps.len() == 1 && self.steps[0].text == FALLBACK_PLAN_STEP
    }
}

fn enumerator_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Leading enumerators: "1.", "-", "*", "Step 3:".
    RE.get_or_init(|| Regex::new(r"^\s*(\d+\.|-|\*|Step \d+:)\s*").expect("valid regex"))
}

/// Normalize raw plan text into an ordered, non-empty plan.
///
/// A line survives when, after enumerator stripping and trimming, it is
/// non-empty and contains at least one alphabetic character. If nothing
/// survives, the plan degrades to [`FALLBACK_PLAN_STEP`].
pub fn normalize_plan(raw: &str) -> Plan {
    let mut steps = Vec::new();
    for line in raw.lines() {
        let stripped = enumerator_pattern().replace(line, "");
        let text = stripped.trim();
        if text.is_empty() {
            continue;
        }
        if !text.chars().any(|c| c.is_alphabetic()) {
            continue;
        }
        if text.contains(REASONING_CLOSE_MARKER) {
            continue;
        }
        steps.push(Step::new(text));
    }

    if steps.is_empty() {
        steps.push(Step::new(FALLBACK_PLAN_STEP));
    }
    Plan { steps }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_enumerators_and_drops_junk_lines() {
        let plan = normalize_plan("1. Compute x\n- Solve for y\n   \n*** \nStep 3: Done");
        let texts: Vec<&str> = plan.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Compute x", "Solve for y", "Done"]);
    }

    #[test]
    fn drops_leaked_reasoning_lines() {
        let plan = normalize_plan("1. Add the numbers\nokay let me think </think>\n2. Report");
        let texts: Vec<&str> = plan.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Add the numbers", "Report"]);
    }

    #[test]
    fn empty_input_degrades_to_fallback() {
        let plan = normalize_plan("\n  \n123\n***\n");
        assert!(plan.is_fallback());
        assert_eq!(plan.steps.len(), 1);
    }

    #[test]
    fn preserves_order() {
        let plan = normalize_plan("3. c\n1. a\n2. b");
        let texts: Vec<&str> = plan.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
    }
}
