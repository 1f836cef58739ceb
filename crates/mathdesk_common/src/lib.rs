//! Shared types for the mathdesk pipeline.
//!
//! Everything here is synchronous and network-free: the data model
//! (literals, tool calls, traces), the two small grammars (argument
//! literals, restricted expressions), the plan normalizer and the
//! bounded memory window. The engine crate layers agents, tool
//! capabilities and service clients on top.

pub mod args;
pub mod error;
pub mod expr;
pub mod literal;
pub mod memory;
pub mod plan;
pub mod tool;
pub mod trace;

pub use args::parse_arguments;
pub use error::{ActionParseError, ArgParseError, ExprError, UnknownToolError};
pub use expr::{Expr, Value};
pub use literal::Literal;
pub use memory::{MemoryEntry, MemoryWindow};
pub use plan::{normalize_plan, Plan, Step, FALLBACK_PLAN_STEP};
pub use tool::{ToolCall, ToolName, ToolResult};
pub use trace::{format_trace, ExecutionStep, Trace};
