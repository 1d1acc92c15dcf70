//! OpenAI-compatible chat-completions client.
//!
//! Speaks the `/chat/completions` wire format over a blocking HTTP
//! client. Works against api.openai.com or any compatible endpoint via
//! a custom base URL. Per-model API keys can be mapped for multi-vendor
//! routing through a translating proxy.

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::{CompletionClient, CompletionRequest, CompletionResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors raised by the completion endpoint
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Error payload shape returned by OpenAI-compatible endpoints
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI-compatible completion client
pub struct OpenAiClient {
    /// Default API key
    api_key: String,
    /// Per-model key overrides (opaque, passed through as bearer tokens)
    model_keys: HashMap<String, String>,
    /// Endpoint base URL (no trailing slash)
    base_url: String,
    /// HTTP client
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Create a client with the given default API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_keys: HashMap::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Point the client at a compatible non-OpenAI endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a dedicated API key for one model
    pub fn with_model_key(mut self, model: impl Into<String>, key: impl Into<String>) -> Self {
        self.model_keys.insert(model.into(), key.into());
        self
    }

    /// Replace the whole per-model key mapping
    pub fn with_model_keys(mut self, keys: HashMap<String, String>) -> Self {
        self.model_keys = keys;
        self
    }

    fn key_for(&self, model: &str) -> &str {
        self.model_keys
            .get(model)
            .map(String::as_str)
            .unwrap_or(&self.api_key)
    }

    fn post(&self, request: &CompletionRequest) -> Result<reqwest::blocking::Response> {
        let url = format!("{}/chat/completions", self.base_url);
        self.client
            .post(&url)
            .bearer_auth(self.key_for(&request.model))
            .json(request)
            .send()
            .with_context(|| format!("Failed to reach completion endpoint at {}", url))
    }
}

impl CompletionClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let mut response = self.post(request)?;

        // Some compatible backends reject response_format outright. With
        // drop_params set, retry once without it instead of failing.
        if response.status().as_u16() == 400
            && request.drop_params
            && request.response_format.is_some()
        {
            debug!(model = %request.model, "Backend rejected request, retrying without response_format");
            let mut bare = request.clone();
            bare.response_format = None;
            response = self.post(&bare)?;
        }

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        response
            .json()
            .context("Failed to parse completion response body")
    }
}
