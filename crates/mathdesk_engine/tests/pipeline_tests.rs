//! End-to-end pipeline runs over scripted generation.

use mathdesk_common::Literal;
use mathdesk_engine::executor::ExecutorAgent;
use mathdesk_engine::llm::{AgentProfile, SamplingParams, ScriptedGeneration};
use mathdesk_engine::pipeline::Pipeline;
use mathdesk_engine::planner::PlannerAgent;
use mathdesk_engine::refiner::RefinerAgent;
use mathdesk_engine::retrieval::CorpusRetriever;
use mathdesk_engine::tools::ToolRegistry;
use std::sync::Arc;

fn pipeline(service: Arc<ScriptedGeneration>) -> Pipeline {
    let retrieval = Arc::new(CorpusRetriever::builtin());
    let params = SamplingParams::default();
    Pipeline::new(
        PlannerAgent::new(service.clone(), retrieval.clone(), 2, params.clone()),
        ExecutorAgent::new(
            service.clone(),
            retrieval,
            ToolRegistry::new(),
            2,
            params.clone(),
        ),
        RefinerAgent::new(service, params),
        5,
    )
}

#[tokio::test]
async fn full_run_with_two_calculator_steps() {
    let service = Arc::new(ScriptedGeneration::new(vec![
        // Planner
        "1. Add the numbers 1, 2 and 3\n2. Report the total",
        // Executor, step 1 (the opening <THOUGHT> is seeded by the prompt)
        "sum them</THOUGHT><ACTION>calculator(\"add\", [1, 2, 3])</ACTION>",
        // Executor, step 2
        "carry the total forward</THOUGHT><ACTION>calculator(\"add\", [6, 0])</ACTION>",
        // Refiner
        "The total of 1, 2 and 3 is 6.",
    ]));

    let solution = pipeline(service.clone())
        .solve("What is 1 + 2 + 3?")
        .await
        .unwrap();

    assert_eq!(solution.answer, "The total of 1, 2 and 3 is 6.");
    assert_eq!(solution.plan.steps.len(), 2);
    assert_eq!(solution.trace.len(), 2);
    assert!(solution.trace.steps.iter().all(|s| s.valid));
    assert_eq!(
        solution.trace.steps[0].result.as_ref().unwrap().value,
        Some(Literal::Number(6.0))
    );

    // One planner call, two executor calls, one refiner call, in order.
    let prompts = service.prompts();
    let profiles: Vec<AgentProfile> = prompts.iter().map(|(p, _)| *p).collect();
    assert_eq!(
        profiles,
        vec![
            AgentProfile::Planner,
            AgentProfile::Executor,
            AgentProfile::Executor,
            AgentProfile::Refiner,
        ]
    );

    // The second executor prompt sees the first step's result via memory.
    assert!(prompts[2]
        .1
        .contains("Step 1: Add the numbers 1, 2 and 3 → Result: 6"));
    // The first executor prompt saw an empty window.
    assert!(prompts[1].1.contains("None - this is the first step"));
}

#[tokio::test]
async fn step_failures_are_recorded_and_the_run_still_refines() {
    let service = Arc::new(ScriptedGeneration::new(vec![
        "1. Add the numbers",
        // No action tags at all.
        "I would just add them mentally, no tool needed.",
        "I could not compute a result.",
    ]));

    let solution = pipeline(service.clone()).solve("Add 1 and 2").await.unwrap();

    assert_eq!(solution.trace.len(), 1);
    let step = &solution.trace.steps[0];
    assert!(!step.valid);
    assert!(step.call.is_none());
    let result = step.result.as_ref().unwrap();
    assert!(!result.success);
    assert!(result
        .error
        .as_ref()
        .unwrap()
        .contains("no tool action found"));

    // The refiner still sees the failed step in the trace.
    let prompts = service.prompts();
    let refiner_prompt = &prompts.last().unwrap().1;
    assert!(refiner_prompt.contains("error: no tool action found"));
    assert_eq!(solution.answer, "I could not compute a result.");
}

#[tokio::test]
async fn generation_failure_aborts_the_run() {
    // Script covers the planner only; the first executor call fails.
    let service = Arc::new(ScriptedGeneration::new(vec!["1. Add the numbers"]));
    let result = pipeline(service).solve("Add 1 and 2").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn constraint_step_solves_and_lands_in_memory() {
    let service = Arc::new(ScriptedGeneration::new(vec![
        "1. Find integers x and y with sum 10 and x greater than 6",
        "search</THOUGHT><ACTION>constraint_solver([\"x + y == 10\", \"x > 6\"], {\"x\": \"int\", \"y\": \"int\"})</ACTION>",
        "x is 7 and y is 3.",
    ]));

    let solution = pipeline(service)
        .solve("Find two integers that sum to 10 where the first exceeds 6")
        .await
        .unwrap();

    let step = &solution.trace.steps[0];
    assert!(step.valid);
    let value = step.result.as_ref().unwrap().value.clone().unwrap();
    let x = value.get("x").and_then(|v| v.as_number()).unwrap();
    let y = value.get("y").and_then(|v| v.as_number()).unwrap();
    assert_eq!(x + y, 10.0);
    assert!(x > 6.0);
}
