//! Gemini REST adapter for the `TextGenerator` gateway trait.
//!
//! Talks to the `generateContent` endpoint directly over reqwest. Rate
//! limits and upstream outages map to the gateway's retryable error so
//! the retry loop above this adapter can do its job; everything else is
//! terminal.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use voxpop_core::error::{Result, VoxError};
use voxpop_core::gateway::{
    GatewayError, GenerationRequest, PromptRole, ProviderResult, TextGenerator,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Kept below the gateway's own call timeout so transport timeouts are
/// reported by this adapter, not raced by the wrapper.
const HTTP_TIMEOUT: Duration = Duration::from_secs(110);

#[derive(Debug, Serialize)]
struct ApiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// HTTP client for the Gemini `generateContent` API.
pub struct GeminiClient {
    api_key: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| VoxError::internal(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            api_key: api_key.into(),
            http,
        })
    }

    fn body_for(request: &GenerationRequest) -> ApiRequest {
        ApiRequest {
            contents: request
                .turns
                .iter()
                .map(|turn| Content {
                    role: match turn.role {
                        PromptRole::User => "user".to_string(),
                        PromptRole::Model => "model".to_string(),
                    },
                    parts: vec![Part {
                        text: turn.text.clone(),
                    }],
                })
                .collect(),
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult {
        // The key rides in the query string; never log the URL.
        let url = format!(
            "{BASE_URL}/{}:generateContent?key={}",
            request.model.as_str(),
            self.api_key
        );

        tracing::debug!(
            target: "gemini",
            model = request.model.as_str(),
            turns = request.turns.len(),
            "sending generateContent request"
        );

        let response = self
            .http
            .post(&url)
            .json(&Self::body_for(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let detail = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, retry_after, &detail));
        }

        let payload: ApiResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::provider(format!("malformed response body: {err}")))?;
        extract_text(payload)
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() || err.is_connect() {
        GatewayError::overloaded(format!("transport failure: {err}"))
    } else {
        GatewayError::provider(format!("transport failure: {err}"))
    }
}

fn map_http_error(status: StatusCode, retry_after: Option<Duration>, detail: &str) -> GatewayError {
    match status {
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => GatewayError::Overloaded {
            message: format!("HTTP {status}: {detail}"),
            retry_after,
        },
        _ => GatewayError::provider(format!("HTTP {status}: {detail}")),
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn extract_text(payload: ApiResponse) -> ProviderResult {
    let text: String = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        Err(GatewayError::provider(
            "response contained no candidate text",
        ))
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use voxpop_core::gateway::PromptTurn;

    #[test]
    fn request_body_maps_roles_to_provider_names() {
        let request = GenerationRequest::from_turns(
            vec![PromptTurn::user("hello"), PromptTurn::model("hi there")],
            0.7,
        );

        let body = serde_json::to_value(GeminiClient::body_for(&request)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "hi there");
        assert_eq!(body["generationConfig"]["temperature"], 0.7);
    }

    #[test]
    fn rate_limits_and_server_errors_are_retryable() {
        for status in [429u16, 500, 502, 503, 504] {
            let err = map_http_error(StatusCode::from_u16(status).unwrap(), None, "busy");
            assert!(err.is_retryable(), "HTTP {status} should be retryable");
        }

        let err = map_http_error(StatusCode::BAD_REQUEST, None, "bad prompt");
        assert!(!err.is_retryable());
    }

    #[test]
    fn retry_after_header_is_honored() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));

        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            parse_retry_after(&headers),
            "slow down",
        );
        match err {
            GatewayError::Overloaded { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected Overloaded, got {other:?}"),
        }
    }

    #[test]
    fn candidate_parts_are_concatenated() {
        let payload = ApiResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: "model".to_string(),
                    parts: vec![
                        Part {
                            text: "Hello, ".to_string(),
                        },
                        Part {
                            text: "world.".to_string(),
                        },
                    ],
                }),
            }],
        };
        assert_eq!(extract_text(payload).unwrap(), "Hello, world.");
    }

    #[test]
    fn empty_candidates_are_a_provider_error() {
        let payload = ApiResponse { candidates: vec![] };
        assert!(matches!(
            extract_text(payload),
            Err(GatewayError::Provider { .. })
        ));
    }
}
