//! Executor agent.
//!
//! One plan step in, one [`ExecutionStep`] out. The happy path is
//! generate, extract the action, resolve the tool name, parse the
//! argument literals, dispatch, validate. Every failure along that chain
//! is recorded into the step as a failed result and the run moves on;
//! only a generation service failure propagates.

use crate::action::extract_action;
use crate::error::ServiceError;
use crate::llm::{AgentProfile, GenerationService, SamplingParams};
use crate::prompts::{self, THOUGHT_SEED};
use crate::retrieval::{ExampleCorpus, RetrievalService};
use crate::tools::ToolRegistry;
use crate::validator;
use mathdesk_common::{parse_arguments, ExecutionStep, MemoryWindow, Step, ToolCall, ToolName, ToolResult};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ExecutorAgent {
    generation: Arc<dyn GenerationService>,
    retrieval: Arc<dyn RetrievalService>,
    registry: ToolRegistry,
    top_k: usize,
    params: SamplingParams,
}

impl ExecutorAgent {
    pub fn new(
        generation: Arc<dyn GenerationService>,
        retrieval: Arc<dyn RetrievalService>,
        registry: ToolRegistry,
        top_k: usize,
        params: SamplingParams,
    ) -> Self {
        Self {
            generation,
            retrieval,
            registry,
            top_k,
            params,
        }
    }

    /// Execute one plan step against the current memory window.
    pub async fn execute_step(
        &self,
        step: &Step,
        memory: &MemoryWindow,
    ) -> Result<ExecutionStep, ServiceError> {
        let examples = self
            .retrieval
            .retrieve(&step.text, self.top_k, ExampleCorpus::ToolUsage)
            .await?;
        let prompt = prompts::executor_prompt(&step.text, &memory.render(), &examples);
        let continuation = self
            .generation
            .generate(AgentProfile::Executor, &prompt, &self.params)
            .await?;
        // The prompt ends with the opening tag, so the continuation
        // starts inside the thought block.
        let response = format!("{}{}", THOUGHT_SEED, continuation);

        Ok(self.interpret(step, &response))
    }

    /// Turn one generated response into an execution record. Total: every
    /// parse or dispatch problem lands in the record, never in an error.
    fn interpret(&self, step: &Step, response: &str) -> ExecutionStep {
        let raw = match extract_action(response) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(step = %step.text, error = %e, "no executable action in response");
                return failed_step(step, response, e.to_string());
            }
        };

        let tool: ToolName = match raw.tool_name.parse() {
            Ok(tool) => tool,
            Err(e) => {
                warn!(step = %step.text, tool = %raw.tool_name, "unknown tool requested");
                return failed_step(step, response, e.to_string());
            }
        };

        let arguments = match parse_arguments(&raw.raw_arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                warn!(step = %step.text, tool = %tool, error = %e, "argument parsing failed");
                return failed_step(step, response, e.to_string());
            }
        };

        let call = ToolCall::new(tool, arguments);
        debug!(call = %call.render(), "dispatching tool call");
        let result = self.registry.dispatch(&call);
        let valid = validator::validate(tool, &call.arguments, &result);
        if !valid {
            warn!(call = %call.render(), "step result failed validation");
        }

        ExecutionStep {
            step: step.clone(),
            call: Some(call),
            result: Some(result),
            valid,
            diagnostic_text: response.to_string(),
        }
    }
}

fn failed_step(step: &Step, response: &str, error: String) -> ExecutionStep {
    ExecutionStep {
        step: step.clone(),
        call: None,
        result: Some(ToolResult::fail(error)),
        valid: false,
        diagnostic_text: response.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedGeneration;
    use crate::retrieval::CorpusRetriever;
    use mathdesk_common::Literal;

    fn agent(responses: Vec<&str>) -> ExecutorAgent {
        ExecutorAgent::new(
            Arc::new(ScriptedGeneration::new(responses)),
            Arc::new(CorpusRetriever::builtin()),
            ToolRegistry::new(),
            2,
            SamplingParams::default(),
        )
    }

    #[tokio::test]
    async fn executes_well_formed_calculator_call() {
        let executor = agent(vec![
            "sum them</THOUGHT><ACTION>calculator(\"add\", [1, 2, 3])</ACTION>",
        ]);
        let step = Step::new("Add 1, 2 and 3");
        let record = executor
            .execute_step(&step, &MemoryWindow::new(5))
            .await
            .unwrap();
        assert!(record.valid);
        let result = record.result.unwrap();
        assert!(result.success);
        assert_eq!(result.value, Some(Literal::Number(6.0)));
        // The seeded tag is restored in the diagnostic text.
        assert!(record.diagnostic_text.starts_with("<THOUGHT>"));
    }

    #[tokio::test]
    async fn missing_action_is_recorded_not_fatal() {
        let executor = agent(vec!["I would just add them in my head."]);
        let record = executor
            .execute_step(&Step::new("Add things"), &MemoryWindow::new(5))
            .await
            .unwrap();
        assert!(!record.valid);
        assert!(record.call.is_none());
        let result = record.result.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("no tool action"));
    }

    #[tokio::test]
    async fn unknown_tool_is_recorded_not_fatal() {
        let executor = agent(vec!["ok</THOUGHT><ACTION>shell(\"rm -rf /\")</ACTION>"]);
        let record = executor
            .execute_step(&Step::new("Do it"), &MemoryWindow::new(5))
            .await
            .unwrap();
        assert!(!record.valid);
        assert!(record.call.is_none());
        assert!(record
            .result
            .unwrap()
            .error
            .unwrap()
            .contains("unknown tool"));
    }

    #[tokio::test]
    async fn expression_arguments_are_rejected_not_evaluated() {
        let executor = agent(vec![
            "ok</THOUGHT><ACTION>calculator(\"add\", [__import__('os'), 2])</ACTION>",
        ]);
        let record = executor
            .execute_step(&Step::new("Add"), &MemoryWindow::new(5))
            .await
            .unwrap();
        assert!(!record.valid);
        assert!(record.call.is_none());
        assert!(record
            .result
            .unwrap()
            .error
            .unwrap()
            .contains("not a literal"));
    }

    #[tokio::test]
    async fn capability_failure_is_an_invalid_step_with_a_call() {
        let executor = agent(vec![
            "divide</THOUGHT><ACTION>calculator(\"divide\", [1, 0])</ACTION>",
        ]);
        let record = executor
            .execute_step(&Step::new("Divide by zero"), &MemoryWindow::new(5))
            .await
            .unwrap();
        assert!(!record.valid);
        assert!(record.call.is_some());
        assert!(!record.result.unwrap().success);
    }
}
