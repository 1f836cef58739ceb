//! Refiner agent.
//!
//! Formats the full execution trace (failed steps included) and asks the
//! refiner profile for a human-readable solution. Refinement never
//! filters the trace; the model sees exactly what happened.

use crate::error::ServiceError;
use crate::llm::{AgentProfile, GenerationService, SamplingParams};
use crate::prompts;
use mathdesk_common::{format_trace, Trace};
use std::sync::Arc;
use tracing::info;

pub struct RefinerAgent {
    generation: Arc<dyn GenerationService>,
    params: SamplingParams,
}

impl RefinerAgent {
    pub fn new(generation: Arc<dyn GenerationService>, params: SamplingParams) -> Self {
        Self { generation, params }
    }

    pub async fn refine(&self, problem: &str, trace: &Trace) -> Result<String, ServiceError> {
        let prompt = prompts::refiner_prompt(problem, &format_trace(trace));
        let answer = self
            .generation
            .generate(AgentProfile::Refiner, &prompt, &self.params)
            .await?;
        info!(steps = trace.len(), "trace refined into final answer");
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGeneration;
    use mathdesk_common::{ExecutionStep, Literal, Step, ToolResult};

    #[tokio::test]
    async fn refiner_prompt_carries_the_formatted_trace() {
        let service = Arc::new(ScriptedGeneration::new(vec!["The total is 6."]));
        let refiner = RefinerAgent::new(service.clone(), SamplingParams::default());

        let mut trace = Trace::new();
        trace.push(ExecutionStep {
            step: Step::new("Add the numbers"),
            call: None,
            result: Some(ToolResult::ok(Literal::Number(6.0))),
            valid: true,
            diagnostic_text: String::new(),
        });

        let answer = refiner.refine("What is 1+2+3?", &trace).await.unwrap();
        assert_eq!(answer, "The total is 6.");

        let prompts = service.prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, AgentProfile::Refiner);
        assert!(prompts[0].1.contains("- Task: Add the numbers"));
        assert!(prompts[0].1.contains("What is 1+2+3?"));
    }
}
