//! Engine configuration.
//!
//! TOML file with per-field defaults, so a partial (or absent) file
//! yields a fully usable configuration. Tuning knobs cover the
//! generation backend, per-profile sampling budgets, the memory window,
//! retrieval depth and the built-in solver limits.

use crate::llm::SamplingParams;
use crate::tools::SolverLimits;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the Ollama-compatible backend.
    pub base_url: String,
    pub planner_model: String,
    pub executor_model: String,
    pub refiner_model: String,
    pub keep_alive: String,
    pub request_timeout_secs: u64,

    pub planner_max_tokens: u32,
    pub executor_max_tokens: u32,
    pub refiner_max_tokens: u32,
    pub temperature: f32,

    /// Memory window capacity in (step, result) entries.
    pub memory_size: usize,
    /// Examples retrieved per prompt.
    pub retrieval_top_k: usize,

    pub solver_domain_min: i64,
    pub solver_domain_max: i64,
    pub solver_max_search_space: u64,

    /// Optional newline-delimited corpus files; the built-in corpus is
    /// used when unset.
    pub decomposition_corpus: Option<PathBuf>,
    pub tool_corpus: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let limits = SolverLimits::default();
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            planner_model: "qwen3:4b".to_string(),
            executor_model: "qwen3:4b".to_string(),
            refiner_model: "qwen3:4b".to_string(),
            keep_alive: "5m".to_string(),
            request_timeout_secs: 120,
            planner_max_tokens: 512,
            executor_max_tokens: 512,
            refiner_max_tokens: 1024,
            temperature: 0.2,
            memory_size: 5,
            retrieval_top_k: 2,
            solver_domain_min: limits.domain_min,
            solver_domain_max: limits.domain_max,
            solver_max_search_space: limits.max_search_space as u64,
            decomposition_corpus: None,
            tool_corpus: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn planner_params(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.planner_max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn executor_params(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.executor_max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn refiner_params(&self) -> SamplingParams {
        SamplingParams {
            max_tokens: self.refiner_max_tokens,
            temperature: self.temperature,
        }
    }

    pub fn solver_limits(&self) -> SolverLimits {
        SolverLimits {
            domain_min: self.solver_domain_min,
            domain_max: self.solver_domain_max,
            max_search_space: self.solver_max_search_space as u128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_usable() {
        let config = EngineConfig::default();
        assert_eq!(config.memory_size, 5);
        assert_eq!(config.retrieval_top_k, 2);
        assert_eq!(config.solver_limits().domain_max, 50);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "memory_size = 8\nexecutor_model = \"qwen3:8b\"").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.memory_size, 8);
        assert_eq!(config.executor_model, "qwen3:8b");
        assert_eq!(config.planner_model, "qwen3:4b");
        assert_eq!(config.retrieval_top_k, 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(EngineConfig::load(Path::new("/nonexistent/mathdesk.toml")).is_err());
    }
}
