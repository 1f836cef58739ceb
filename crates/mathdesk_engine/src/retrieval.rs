//! Example retrieval.
//!
//! Prompts for the planner and executor are seeded with worked examples
//! drawn from two corpora: problem decompositions and tool-call syntax.
//! Building an embedding index is out of scope here; the in-process
//! retriever scores by token overlap, which is deterministic for a fixed
//! corpus and query. Anything smarter can implement the same trait.

use crate::error::ServiceError;
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tracing::info;

/// Which example corpus to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleCorpus {
    Decomposition,
    ToolUsage,
}

#[async_trait]
pub trait RetrievalService: Send + Sync {
    /// Return up to `top_k` examples most relevant to `query`, best
    /// first. Deterministic for a fixed corpus and query.
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        corpus: ExampleCorpus,
    ) -> Result<Vec<String>, ServiceError>;
}

/// In-memory retriever over newline-delimited example corpora.
pub struct CorpusRetriever {
    decomposition: Vec<String>,
    tool_usage: Vec<String>,
}

impl CorpusRetriever {
    pub fn new(decomposition: Vec<String>, tool_usage: Vec<String>) -> Self {
        Self {
            decomposition,
            tool_usage,
        }
    }

    /// Load both corpora from newline-delimited files (one example per
    /// non-empty line).
    pub fn from_files(
        decomposition_path: &Path,
        tool_usage_path: &Path,
    ) -> Result<Self, std::io::Error> {
        let decomposition = read_lines(decomposition_path)?;
        let tool_usage = read_lines(tool_usage_path)?;
        info!(
            decomposition_examples = decomposition.len(),
            tool_examples = tool_usage.len(),
            "example corpora loaded"
        );
        Ok(Self::new(decomposition, tool_usage))
    }

    /// Small built-in corpus used when no corpus files are configured.
    pub fn builtin() -> Self {
        let decomposition = [
            "Problem: A shop sells 12 apples and 8 oranges. How many fruits total? \
             Plan: 1. Add the number of apples and oranges.",
            "Problem: Find two numbers whose sum is 10 and difference is 2. \
             Plan: 1. Set up equations x + y = 10 and x - y = 2. 2. Solve the system for x and y.",
            "Problem: Maximize profit 3x + 5y subject to x + y <= 10. \
             Plan: 1. Define the objective and constraints. 2. Solve the linear program.",
        ];
        let tool_usage = [
            "calculator(\"add\", [12, 8]) — sums a list of numbers",
            "calculator(\"percentage\", [25, 200]) — 25 percent of 200",
            "algebra_solver([\"x + y - 10\", \"x - y - 2\"], [\"x\", \"y\"]) — solves a linear system",
            "constraint_solver([\"x + y == 10\", \"x > 3\"], {\"x\": \"int\", \"y\": \"int\"}) — finds a satisfying assignment",
            "lp_solver(\"3*x + 5*y\", [\"x + y <= 10\"], {\"x\": {\"low_bound\": 0, \"up_bound\": 10, \"cat\": \"Integer\"}, \"y\": {\"low_bound\": 0, \"up_bound\": 10, \"cat\": \"Integer\"}}, \"maximize\") — optimizes a linear objective",
        ];
        Self::new(
            decomposition.iter().map(|s| s.to_string()).collect(),
            tool_usage.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn corpus(&self, corpus: ExampleCorpus) -> &[String] {
        match corpus {
            ExampleCorpus::Decomposition => &self.decomposition,
            ExampleCorpus::ToolUsage => &self.tool_usage,
        }
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, std::io::Error> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Token-overlap score between query and example, both lowercased.
fn overlap_score(query: &str, example: &str) -> usize {
    let example_lower = example.to_lowercase();
    let example_tokens: std::collections::HashSet<&str> =
        example_lower.split_whitespace().collect();
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|token| example_tokens.contains(token))
        .count()
}

#[async_trait]
impl RetrievalService for CorpusRetriever {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        corpus: ExampleCorpus,
    ) -> Result<Vec<String>, ServiceError> {
        let entries = self.corpus(corpus);
        let mut scored: Vec<(usize, &String)> = entries
            .iter()
            .map(|example| (overlap_score(query, example), example))
            .collect();
        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, example)| example.clone())
            .collect())
    }
}
