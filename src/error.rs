//! # Error Handling
//!
//! This module provides the unified error taxonomy for the Book Network client
//! and the closed set of failure reasons that list screens surface to the user.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of characters of an upstream body kept in an error.
const BODY_SNIPPET_CHARS: usize = 200;

/// Errors produced by the client library.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed with status {status}: {}", body.as_deref().unwrap_or("no body"))]
    Http { status: u16, body: Option<String> },

    #[error("authentication required")]
    Unauthorized,

    #[error("operation not permitted: {0}")]
    Forbidden(String),

    #[error("resource not found")]
    NotFound,

    #[error("business error {code} (status {status}): {description}")]
    Business {
        status: u16,
        code: i32,
        description: String,
    },

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("credential cannot be used as an Authorization header value")]
    InvalidCredential,

    #[error("credential store I/O failed: {0}")]
    CredentialStore(#[from] std::io::Error),

    #[error("no book is selected for this action")]
    NoSelection,
}

/// Error body emitted by the Book Network backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionResponse {
    #[serde(default)]
    pub business_error_code: Option<i32>,
    #[serde(default)]
    pub business_error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub validation_errors: Option<Vec<String>>,
}

impl ClientError {
    /// Classify a non-success response into a client error.
    pub fn from_status(status: StatusCode, body: Option<String>) -> Self {
        let parsed = body
            .as_deref()
            .and_then(|b| serde_json::from_str::<ExceptionResponse>(b).ok());

        if let Some(ExceptionResponse {
            business_error_code: Some(code),
            business_error_description,
            ..
        }) = parsed.clone()
        {
            return ClientError::Business {
                status: status.as_u16(),
                code,
                description: business_error_description.unwrap_or_default(),
            };
        }

        if let Some(errors) = parsed
            .as_ref()
            .and_then(|p| p.validation_errors.clone())
            .filter(|errors| !errors.is_empty())
        {
            return ClientError::Validation(errors);
        }

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => {
                let message = parsed
                    .and_then(|p| p.error)
                    .or(body.map(truncate_body))
                    .unwrap_or_else(|| "access denied".to_string());
                ClientError::Forbidden(message)
            }
            StatusCode::NOT_FOUND => ClientError::NotFound,
            _ => ClientError::Http {
                status: status.as_u16(),
                body: body.map(truncate_body),
            },
        }
    }

    /// The user-facing failure reason for this error.
    pub fn reason(&self) -> FailureReason {
        match self {
            ClientError::Network(_) => FailureReason::Network,
            ClientError::Unauthorized | ClientError::InvalidCredential => {
                FailureReason::Unauthorized
            }
            ClientError::Forbidden(message) => FailureReason::Rejected {
                status: StatusCode::FORBIDDEN.as_u16(),
                message: message.clone(),
            },
            ClientError::NotFound => FailureReason::Rejected {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: self.to_string(),
            },
            ClientError::Http { status, .. } => FailureReason::Rejected {
                status: *status,
                message: self.to_string(),
            },
            ClientError::Business {
                status,
                description,
                ..
            } => FailureReason::Rejected {
                status: *status,
                message: description.clone(),
            },
            ClientError::Validation(errors) => FailureReason::Invalid(errors.join("; ")),
            ClientError::Decode(_) | ClientError::InvalidUrl(_) | ClientError::NoSelection => {
                FailureReason::Invalid(self.to_string())
            }
            ClientError::CredentialStore(_) => FailureReason::Other(self.to_string()),
        }
    }
}

/// Closed set of reasons a screen can be in an error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The backend could not be reached.
    Network,
    /// The credential is missing or was refused.
    Unauthorized,
    /// The backend answered but refused the operation.
    Rejected { status: u16, message: String },
    /// The request or response was malformed.
    Invalid(String),
    Other(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Network => write!(f, "the server could not be reached"),
            FailureReason::Unauthorized => write!(f, "please log in again"),
            FailureReason::Rejected { status, message } => {
                write!(f, "request rejected ({}): {}", status, message)
            }
            FailureReason::Invalid(details) => write!(f, "invalid data: {}", details),
            FailureReason::Other(details) => write!(f, "{}", details),
        }
    }
}

/// Truncate an upstream body so it can be carried in an error.
pub fn truncate_body(body: String) -> String {
    if body.chars().count() > BODY_SNIPPET_CHARS {
        let truncated: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
        format!("{}...", truncated)
    } else {
        body
    }
}
