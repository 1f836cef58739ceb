//! Generation service abstraction and the Ollama-backed client.
//!
//! The behavioral profile (planner / executor / refiner) is an explicit
//! parameter on every call, not mutable client state: two runs sharing a
//! client can never race on an "active" configuration, and the per-call
//! model choice is visible at every call site.
//!
//! Production uses [`OllamaClient`] against a local Ollama-compatible
//! `/api/chat` endpoint. Tests use [`ScriptedGeneration`] with canned
//! responses.

use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Which behavioral profile a generation call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentProfile {
    Planner,
    Executor,
    Refiner,
}

impl AgentProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentProfile::Planner => "planner",
            AgentProfile::Executor => "executor",
            AgentProfile::Refiner => "refiner",
        }
    }
}

impl fmt::Display for AgentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling settings for one generation call.
#[derive(Debug, Clone)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.2,
        }
    }
}

/// Text generation behind a trait so the pipeline can be driven by a
/// real model or by scripted responses in tests.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        profile: AgentProfile,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, ServiceError>;
}

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_MODEL: &str = "qwen3:4b";

/// How long the backend keeps a model loaded after the last request.
const DEFAULT_KEEP_ALIVE: &str = "5m";

/// Ollama-compatible HTTP client with one model name per profile.
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    planner_model: String,
    executor_model: String,
    refiner_model: String,
    keep_alive: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    keep_alive: &'a str,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    num_predict: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaClient {
    /// Create a client with a single model for all profiles.
    pub fn new(model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self::with_profile_models(model.clone(), model.clone(), model)
    }

    /// Create a client with separate models per profile.
    pub fn with_profile_models(planner: String, executor: String, refiner: String) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            planner_model: planner,
            executor_model: executor,
            refiner_model: refiner,
            keep_alive: DEFAULT_KEEP_ALIVE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = keep_alive.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    pub fn model_for(&self, profile: AgentProfile) -> &str {
        match profile {
            AgentProfile::Planner => &self.planner_model,
            AgentProfile::Executor => &self.executor_model,
            AgentProfile::Refiner => &self.refiner_model,
        }
    }

    /// Check whether the backend is reachable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        self.http_client.get(&url).send().await.is_ok()
    }
}

#[async_trait]
impl GenerationService for OllamaClient {
    async fn generate(
        &self,
        profile: AgentProfile,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, ServiceError> {
        let model = self.model_for(profile);
        let url = format!("{}/api/chat", self.base_url);
        debug!(%profile, model, prompt_chars = prompt.len(), "generation request");

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            keep_alive: &self.keep_alive,
            options: ChatOptions {
                num_predict: params.max_tokens,
                temperature: params.temperature,
            },
        };

        let response = self.http_client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(ServiceError::Unavailable(format!(
                "generation backend returned HTTP {}",
                response.status()
            )));
        }
        let payload: ChatResponse = response.json().await?;
        let content = payload
            .message
            .map(|m| m.content)
            .ok_or_else(|| ServiceError::MalformedPayload("missing message content".to_string()))?;

        info!(%profile, model, response_chars = content.len(), "generation complete");
        Ok(content)
    }
}

/// Deterministic generation for tests: pops pre-scripted responses in
/// order and records every prompt it was given.
#[derive(Default)]
pub struct ScriptedGeneration {
    responses: Mutex<Vec<String>>,
    prompts: Mutex<Vec<(AgentProfile, String)>>,
}

impl ScriptedGeneration {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<(AgentProfile, String)> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedGeneration {
    async fn generate(
        &self,
        profile: AgentProfile,
        prompt: &str,
        _params: &SamplingParams,
    ) -> Result<String, ServiceError> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push((profile, prompt.to_string()));
        self.responses
            .lock()
            .expect("script poisoned")
            .pop()
            .ok_or_else(|| ServiceError::Unavailable("script exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_models_are_independent() {
        let client = OllamaClient::with_profile_models(
            "small".to_string(),
            "medium".to_string(),
            "large".to_string(),
        );
        assert_eq!(client.model_for(AgentProfile::Planner), "small");
        assert_eq!(client.model_for(AgentProfile::Executor), "medium");
        assert_eq!(client.model_for(AgentProfile::Refiner), "large");
    }

    #[tokio::test]
    async fn scripted_generation_pops_in_order() {
        let service = ScriptedGeneration::new(vec!["first", "second"]);
        let params = SamplingParams::default();
        assert_eq!(
            service
                .generate(AgentProfile::Planner, "p1", &params)
                .await
                .unwrap(),
            "first"
        );
        assert_eq!(
            service
                .generate(AgentProfile::Executor, "p2", &params)
                .await
                .unwrap(),
            "second"
        );
        assert!(service
            .generate(AgentProfile::Executor, "p3", &params)
            .await
            .is_err());
        assert_eq!(service.prompts().len(), 3);
    }
}
