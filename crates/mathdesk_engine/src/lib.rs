//! Mathdesk engine: agents, tools and services for the math-solving
//! pipeline.
//!
//! The [`pipeline::Pipeline`] wires a planner, an executor and a refiner
//! over two service traits ([`llm::GenerationService`] and
//! [`retrieval::RetrievalService`]); the executor dispatches parsed tool
//! calls through the closed [`tools::ToolRegistry`]. Parsing and data
//! types shared with other frontends live in `mathdesk_common`.

pub mod action;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod refiner;
pub mod retrieval;
pub mod tools;
pub mod validator;

pub use config::EngineConfig;
pub use error::{PipelineError, ServiceError};
pub use pipeline::{Pipeline, Solution};
