//! Planner agent.
//!
//! One generation call per run: retrieve decomposition examples, build
//! the decomposition prompt, and normalize whatever comes back into an
//! ordered plan. A plan that degrades to the fallback sentinel is still
//! a plan; the run continues.

use crate::error::ServiceError;
use crate::llm::{AgentProfile, GenerationService, SamplingParams};
use crate::prompts;
use crate::retrieval::{ExampleCorpus, RetrievalService};
use mathdesk_common::{normalize_plan, Plan};
use std::sync::Arc;
use tracing::{info, warn};

pub struct PlannerAgent {
    generation: Arc<dyn GenerationService>,
    retrieval: Arc<dyn RetrievalService>,
    top_k: usize,
    params: SamplingParams,
}

impl PlannerAgent {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        retrieval: Arc<dyn RetrievalService>,
        top_k: usize,
        params: SamplingParams,
    ) -> Self {
        Self {
            generation,
            retrieval,
            top_k,
            params,
        }
    }

    /// Decompose a problem into an ordered plan.
    pub async fn plan(&self, problem: &str) -> Result<Plan, ServiceError> {
        let examples = self
            .retrieval
            .retrieve(problem, self.top_k, ExampleCorpus::Decomposition)
            .await?;
        let prompt = prompts::decomposition_prompt(problem, &examples);
        let raw = self
            .generation
            .generate(AgentProfile::Planner, &prompt, &self.params)
            .await?;

        let plan = normalize_plan(&raw);
        if plan.is_fallback() {
            warn!("plan normalization produced no usable steps");
        } else {
            info!(steps = plan.steps.len(), "plan ready");
        }
        Ok(plan)
    }
}
