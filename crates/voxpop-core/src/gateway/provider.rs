//! Provider-facing request types and the `TextGenerator` trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Identifier of the provider model to run a request against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    /// Default fast completion model.
    GeminiFlash,
    /// Any other provider-specific model name.
    Custom(String),
}

impl ModelId {
    /// Returns the provider-side model name.
    pub fn as_str(&self) -> &str {
        match self {
            ModelId::GeminiFlash => "gemini-1.5-flash",
            ModelId::Custom(name) => name,
        }
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId::GeminiFlash
    }
}

/// Role of a single prompt turn as seen by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptRole {
    /// Interviewer side (provider "user" role).
    User,
    /// Persona side (provider "model" role).
    Model,
}

/// One turn of role-tagged text handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTurn {
    pub role: PromptRole,
    pub text: String,
}

impl PromptTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Model,
            text: text.into(),
        }
    }
}

/// A complete generation request: ordered role history plus sampling
/// settings.
///
/// The core always passes the full ordered turn history explicitly instead
/// of relying on a stateful provider-side conversation handle, so behavior
/// is reproducible with an injected fake provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub turns: Vec<PromptTurn>,
    pub temperature: f32,
    pub model: ModelId,
}

impl GenerationRequest {
    /// Builds a single-turn request from a bare prompt.
    pub fn from_prompt(prompt: impl Into<String>, temperature: f32) -> Self {
        Self {
            turns: vec![PromptTurn::user(prompt)],
            temperature,
            model: ModelId::default(),
        }
    }

    /// Builds a request from an already-accumulated turn history.
    pub fn from_turns(turns: Vec<PromptTurn>, temperature: f32) -> Self {
        Self {
            turns,
            temperature,
            model: ModelId::default(),
        }
    }

    /// Total number of characters sent to the provider.
    pub fn input_chars(&self) -> u64 {
        self.turns
            .iter()
            .map(|turn| turn.text.chars().count() as u64)
            .sum()
    }
}

/// Errors surfaced by a `TextGenerator` implementation.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transient condition (timeout, unavailable, overload). The gateway
    /// retries these up to its attempt budget.
    #[error("Provider overloaded: {message}")]
    Overloaded {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Any other upstream failure. Propagated immediately, never retried.
    #[error("Provider error: {message}")]
    Provider { message: String },
}

impl GatewayError {
    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::Overloaded {
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Whether the gateway may retry the failed call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Overloaded { .. })
    }
}

/// Outcome of one provider call. A distinct alias so implementations and
/// test doubles are unambiguous even where the crate-wide `Result` alias
/// is in scope.
pub type ProviderResult = std::result::Result<String, GatewayError>;

/// The single abstract capability the core needs from an LLM provider:
/// generate text given a prompt, role history, and temperature.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult;
}
