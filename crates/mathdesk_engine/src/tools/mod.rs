//! Tool capabilities and dispatch.
//!
//! The registry is stateless and deterministic: it adapts parsed literal
//! arguments to each capability's expected shape and forwards them. The
//! capability set is the closed [`ToolName`] enum, so dispatch is an
//! exhaustive match — there is no lookup that could fall through to
//! anything else, and an unknown tool name never reaches this module
//! (it fails at `ToolName::from_str`).

mod algebra;
mod calculator;
mod constraint;
mod linear;

pub use algebra::AlgebraSolver;
pub use calculator::Calculator;
pub use constraint::ConstraintSolver;
pub use linear::LpSolver;

use mathdesk_common::{Literal, ToolCall, ToolName, ToolResult};

/// One computational capability. Implementations must never panic across
/// this boundary; every internal problem is a `success = false` result.
pub trait Capability {
    fn name(&self) -> ToolName;
    fn execute(&self, arguments: &[Literal]) -> ToolResult;
}

/// Bounds for the built-in search backends.
#[derive(Debug, Clone, Copy)]
pub struct SolverLimits {
    /// Inclusive lower bound of the integer domain searched by the
    /// constraint solver.
    pub domain_min: i64,
    /// Inclusive upper bound of the same domain.
    pub domain_max: i64,
    /// Cap on the number of assignments any bounded search may visit.
    pub max_search_space: u128,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            domain_min: -50,
            domain_max: 50,
            max_search_space: 2_000_000,
        }
    }
}

/// The fixed capability registry.
pub struct ToolRegistry {
    calculator: Calculator,
    algebra: AlgebraSolver,
    constraint: ConstraintSolver,
    linear: LpSolver,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::with_limits(SolverLimits::default())
    }

    pub fn with_limits(limits: SolverLimits) -> Self {
        Self {
            calculator: Calculator,
            algebra: AlgebraSolver,
            constraint: ConstraintSolver::new(limits),
            linear: LpSolver::new(limits),
        }
    }

    /// Execute a parsed call. Shape mismatches surface as the
    /// capability's own error text; no partial coercion is attempted
    /// beyond exact arity checking inside each capability.
    pub fn dispatch(&self, call: &ToolCall) -> ToolResult {
        match call.tool {
            ToolName::Calculator => self.calculator.execute(&call.arguments),
            ToolName::AlgebraSolver => self.algebra.execute(&call.arguments),
            ToolName::ConstraintSolver => self.constraint.execute(&call.arguments),
            ToolName::LpSolver => self.linear.execute(&call.arguments),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape helper: a list literal whose items are all numbers.
pub(crate) fn expect_numbers(literal: &Literal) -> Result<Vec<f64>, String> {
    let items = literal
        .as_list()
        .ok_or_else(|| format!("expected a list of numbers, got {}", literal.type_name()))?;
    items
        .iter()
        .map(|item| {
            item.as_number()
                .ok_or_else(|| format!("expected a number in list, got {}", item.type_name()))
        })
        .collect()
}

/// Shape helper: a list literal whose items are all strings.
pub(crate) fn expect_strings(literal: &Literal) -> Result<Vec<String>, String> {
    let items = literal
        .as_list()
        .ok_or_else(|| format!("expected a list of strings, got {}", literal.type_name()))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("expected a string in list, got {}", item.type_name()))
        })
        .collect()
}
