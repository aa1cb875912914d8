//! Backend HTTP client with deadline and error classification.
//!
//! # Responsibilities
//! - POST one question to the ask endpoint as JSON
//! - Enforce connect and total-request deadlines
//! - Classify failures (timeout, transport, status, decode)
//! - Propagate the exchange's request ID to the backend

use std::time::Duration;

use reqwest::header::HeaderValue;
use url::Url;
use uuid::Uuid;

use crate::config::BackendConfig;
use crate::relay::error::{ClientBuildError, RelayError, RelayResult};
use crate::relay::types::{AskRequest, AskResponse};

/// Header carrying the per-exchange correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Longest backend error detail surfaced to clients.
const MAX_DETAIL_CHARS: usize = 256;

/// Client for the question-answering backend.
///
/// Holds a single pooled HTTP client; cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout_secs: u64,
}

impl RelayClient {
    /// Create a client for the configured backend.
    pub fn new(config: &BackendConfig) -> Result<Self, ClientBuildError> {
        let endpoint = Url::parse(&config.url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        tracing::info!(
            endpoint = %endpoint,
            timeout_secs = config.timeout_secs,
            "Relay client initialized"
        );

        Ok(Self {
            http,
            endpoint,
            timeout_secs: config.timeout_secs,
        })
    }

    /// The backend ask endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the backend one question.
    ///
    /// The returned exchange always carries `question` as given here, whatever
    /// the backend echoed back.
    pub async fn ask(&self, question: &str, request_id: Uuid) -> RelayResult<AskResponse> {
        let body = AskRequest {
            question: question.to_owned(),
        };

        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            request = request.header(X_REQUEST_ID, value);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
                detail: error_detail(&bytes),
            });
        }

        let mut exchange: AskResponse = serde_json::from_slice(&bytes)?;
        exchange.question = body.question;

        tracing::debug!(
            request_id = %request_id,
            references = exchange.answer.references.len(),
            "Backend answered"
        );

        Ok(exchange)
    }

    fn classify(&self, err: reqwest::Error) -> RelayError {
        if err.is_timeout() {
            RelayError::Timeout(self.timeout_secs)
        } else {
            RelayError::Unavailable(err)
        }
    }
}

/// Best human-readable detail from a non-success body.
///
/// Prefers a JSON `detail` field, then the raw text.
fn error_detail(body: &[u8]) -> String {
    let detail = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::from_utf8_lossy(body).into_owned(),
        },
        _ => String::from_utf8_lossy(body).into_owned(),
    };

    let detail = detail.trim();
    if detail.is_empty() {
        "empty response body".to_string()
    } else {
        detail.chars().take(MAX_DETAIL_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_json_field() {
        let body = br#"{"detail": "An internal server error occurred."}"#;
        assert_eq!(error_detail(body), "An internal server error occurred.");
    }

    #[test]
    fn detail_falls_back_to_text() {
        assert_eq!(error_detail(b"  Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_detail(b""), "empty response body");
    }

    #[test]
    fn structured_detail_is_stringified() {
        let body = br#"{"detail": [{"loc": ["body", "question"]}]}"#;
        assert!(error_detail(body).contains("question"));
    }

    #[test]
    fn detail_is_truncated() {
        let body = "x".repeat(MAX_DETAIL_CHARS * 2);
        assert_eq!(error_detail(body.as_bytes()).len(), MAX_DETAIL_CHARS);
    }

    #[test]
    fn rejects_unparseable_url() {
        let config = BackendConfig {
            url: "not a url".into(),
            ..BackendConfig::default()
        };
        assert!(matches!(RelayClient::new(&config), Err(ClientBuildError::Url(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = BackendConfig {
            url: format!("http://{}/ask", addr),
            ..BackendConfig::default()
        };
        let client = RelayClient::new(&config).unwrap();
        let err = client.ask("anyone there?", Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RelayError::Unavailable(_)), "got {err}");
    }
}
