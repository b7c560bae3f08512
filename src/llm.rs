//! Generation service interface and the Ollama-backed client
//!
//! The pipeline never talks to a concrete LLM client. Stages hold a
//! `GenerationService` trait object; production wires in `OllamaClient`,
//! tests wire in deterministic stubs.

use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One role-tagged message in a generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single request to the generation service.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    /// Structured-output hint; "json" asks the server for a JSON body.
    pub format: Option<String>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: None,
            format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_json_format(mut self) -> Self {
        self.format = Some("json".to_string());
        self
    }
}

/// Capability interface over the external generator. The service is treated
/// as untrusted and non-deterministic; callers own all response parsing.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize, Debug)]
struct OllamaResponseMessage {
    content: String,
}

/// Ollama API client speaking `/api/chat`.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GenerationService for OllamaClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let body = OllamaChatRequest {
            model: request.model,
            messages: request.messages,
            stream: false,
            format: request.format,
            options: request
                .temperature
                .map(|t| OllamaOptions { temperature: Some(t) }),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Llm(format!("Request to generation service failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GatewayError::Llm(format!(
                "Generation service returned HTTP {}",
                response.status()
            )));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Llm(format!("Failed to parse generation response: {}", e)))?;

        Ok(parsed.message.content)
    }
}
