//! Prompt construction for the three generation profiles.
//!
//! Each builder produces the complete prompt for one call. The executor
//! prompt ends with an opening `<THOUGHT>` so the model starts inside
//! the expected format; the caller prepends the same tag to the
//! continuation before parsing.

/// Tag seeded at the end of the executor prompt.
pub const THOUGHT_SEED: &str = "<THOUGHT>";

pub fn decomposition_prompt(problem: &str, examples: &[String]) -> String {
    format!(
        "You are a problem decomposition expert. Break the problem into clear, executable steps.\n\
         Provide ONLY the steps, one per line. Do NOT include reasoning, explanations, or any \
         text other than the steps themselves.\n\n\
         RELEVANT EXAMPLES:\n{}\n\n\
         PROBLEM TO DECOMPOSE:\n{}\n\n\
         The plan is:\n",
        examples.join("\n\n"),
        problem
    )
}

pub fn executor_prompt(task: &str, memory_summary: &str, examples: &[String]) -> String {
    format!(
        "You are an executor agent. You MUST use one of the available tools.\n\
         AVAILABLE TOOLS: calculator, algebra_solver, constraint_solver, lp_solver\n\
         You MUST respond ONLY in the following format (no other text is allowed):\n\
         <THOUGHT>Your reasoning for choosing the tool and arguments</THOUGHT>\n\
         <ACTION>tool_name(arguments)</ACTION>\n\n\
         RELEVANT TOOL EXAMPLES:\n{}\n\n\
         PREVIOUS STEPS SUMMARY:\n{}\n\n\
         CURRENT TASK:\n{}\n\n\
         {}",
        examples.join("\n\n"),
        memory_summary,
        task,
        THOUGHT_SEED
    )
}

pub fn refiner_prompt(problem: &str, trace_text: &str) -> String {
    format!(
        "You are a solution refiner. Convert the technical execution trace into a clean, \
         human-readable solution.\n\
         Do not include technical jargon or tool names. Explain the steps clearly and provide \
         the final answer.\n\
         Provide ONLY the final, refined solution, not your thoughts or self-reflection.\n\n\
         ORIGINAL PROBLEM:\n{}\n\n\
         EXECUTION TRACE:\n{}\n\n\
         Here is the clear, human-readable solution:\n",
        problem, trace_text
    )
}
