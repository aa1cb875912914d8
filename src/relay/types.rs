//! Wire types exchanged with the backend and the client.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Body of a backend ask call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// A document location supporting an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,

    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub h2: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub h3: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub h4: Option<String>,
}

impl Reference {
    /// A reference to a whole document.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            h2: None,
            h3: None,
            h4: None,
        }
    }
}

/// Free-text answer with its ordered references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,

    #[serde(default)]
    pub references: Vec<Reference>,
}

/// A complete exchange: the question and the backend's answer to it.
///
/// This is both the backend's reply body and the outbound frame payload.
/// The backend is allowed to omit `question`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub question: String,

    pub answer: Answer,
}

/// Machine-readable classification of a failed exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidQuestion,
    BackendUnavailable,
    BackendTimeout,
    BackendStatus,
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Frame sent in place of an [`AskResponse`] when an exchange fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub question: String,
    pub error: ErrorBody,
}

/// A data frame payload that could not be read as a question.
#[derive(Debug, Error)]
#[error("question is not valid UTF-8: {0}")]
pub struct InvalidQuestion(#[from] std::string::FromUtf8Error);

// An empty heading is the same as no heading; it must never be re-emitted as "".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
