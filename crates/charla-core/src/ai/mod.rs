//! Model gateway contract and backends
//!
//! The core only needs a single-shot, non-streaming completion call; the
//! backend behind it is opaque. `OllamaClient` is the default backend for a
//! locally hosted server.

pub mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;
use thiserror::Error;

/// Sampling parameters sent with every inference request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_k: 50,
            max_tokens: 500,
        }
    }
}

/// Failures at the inference boundary
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request to model backend failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model backend returned status {status}: {message}")]
    Backend {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// A single-shot completion call against some model backend.
///
/// Implementations block the caller for the full inference; the UI is
/// responsible for moving the call off its event loop if it needs to stay
/// responsive.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn infer(&self, prompt: &str, params: SamplingParams) -> Result<String, GatewayError>;
}
