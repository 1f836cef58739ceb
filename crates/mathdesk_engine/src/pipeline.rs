//! Sequential solving pipeline.
//!
//! Plan, then execute each step in order against a shared memory window,
//! then refine the full trace into the final answer. Step-level failures
//! (unparseable actions, unknown tools, capability errors, invalid
//! outputs) are recorded and the run continues; only a generation
//! service failure aborts the run.

use crate::error::PipelineError;
use crate::executor::ExecutorAgent;
use crate::planner::PlannerAgent;
use crate::refiner::RefinerAgent;
use chrono::{DateTime, Utc};
use mathdesk_common::{MemoryWindow, Plan, Trace};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Final product of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub run_id: Uuid,
    pub answer: String,
    pub plan: Plan,
    pub trace: Trace,
    pub completed_at: DateTime<Utc>,
}

pub struct Pipeline {
    planner: PlannerAgent,
    executor: ExecutorAgent,
    refiner: RefinerAgent,
    memory_size: usize,
}

impl Pipeline {
    pub fn new(
        planner: PlannerAgent,
        executor: ExecutorAgent,
        refiner: RefinerAgent,
        memory_size: usize,
    ) -> Self {
        Self {
            planner,
            executor,
            refiner,
            memory_size,
        }
    }

    /// Run the full pipeline on one problem.
    pub async fn solve(&self, problem: &str) -> Result<Solution, PipelineError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, "run started");

        let plan = self.planner.plan(problem).await?;
        info!(%run_id, steps = plan.steps.len(), "executing plan");

        let mut memory = MemoryWindow::new(self.memory_size);
        let mut trace = Trace::new();
        for step in &plan.steps {
            let record = self.executor.execute_step(step, &memory).await?;
            let summary = record
                .result
                .as_ref()
                .map(|r| r.summary())
                .unwrap_or_else(|| "no result".to_string());
            memory.record(&step.text, summary);
            trace.push(record);
        }

        let answer = self.refiner.refine(problem, &trace).await?;
        info!(%run_id, steps = trace.len(), "run complete");
        Ok(Solution {
            run_id,
            answer,
            plan,
            trace,
            completed_at: Utc::now(),
        })
    }
}
