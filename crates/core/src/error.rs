//! Error types for the task client

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Key the server uses for messages that belong to no particular field
pub const DETAIL: &str = "detail";

/// Key used for validation errors that span several fields
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Error, Debug)]
pub enum ClientError {
    /// No session token is stored; the caller must send the user to login
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The server rejected the session token (HTTP 401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Any other non-success HTTP status
    #[error("Request failed with status {status}: {messages}")]
    RequestFailed { status: u16, messages: FieldMessages },

    /// No response was received
    #[error("Network error: {0}")]
    Network(String),

    /// A success response whose body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The user declined a confirmation prompt
    #[error("Cancelled by user")]
    UserCancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Create a RequestFailed error from a status code and raw response body
    pub fn request_failed(status: u16, body: &str) -> Self {
        Self::RequestFailed {
            status,
            messages: FieldMessages::from_body(body),
        }
    }

    /// Whether this error means the session is gone and the user has to log in again
    pub fn redirects_to_login(&self) -> bool {
        matches!(self, Self::NotAuthenticated | Self::Unauthorized)
    }

    /// Whether this error should be shown to the user at all
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::UserCancelled)
    }

    /// Text suitable for an inline message region or alert
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Please log in first.".to_string(),
            Self::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            Self::RequestFailed { status, messages } if messages.is_empty() => {
                format!("Request failed (HTTP {}).", status)
            }
            Self::RequestFailed { messages, .. } => messages.joined(),
            Self::Network(_) => "Error connecting to server. Please try again.".to_string(),
            Self::UserCancelled => String::new(),
            other => other.to_string(),
        }
    }
}

/// Field-level messages from an error response body
///
/// Keys are field names, `detail` or `non_field_errors`; each holds one or
/// more human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMessages(BTreeMap<String, Vec<String>>);

impl FieldMessages {
    /// Parse a response body. Bodies that are not JSON yield no messages.
    pub fn from_body(body: &str) -> Self {
        let mut messages = Self::default();
        let value = match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(_) => return messages,
        };

        match value {
            Value::Object(map) => {
                for (field, value) in map {
                    messages.extend(field, flatten(value));
                }
            }
            Value::Array(items) => {
                messages.extend(NON_FIELD_ERRORS, flatten(Value::Array(items)))
            }
            Value::String(text) => messages.push(DETAIL, text),
            _ => {}
        }
        messages
    }

    /// A single message under one key
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut messages = Self::default();
        messages.push(field, message);
        messages
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    fn extend(&mut self, field: impl Into<String>, items: Vec<String>) {
        if !items.is_empty() {
            self.0.entry(field.into()).or_default().extend(items);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Join every message into one line.
    ///
    /// Field messages are prefixed with their field name; `detail` and
    /// `non_field_errors` messages are shown bare.
    pub fn joined(&self) -> String {
        let mut parts = Vec::new();
        for (field, messages) in &self.0 {
            for message in messages {
                if field == DETAIL || field == NON_FIELD_ERRORS {
                    parts.push(message.clone());
                } else {
                    parts.push(format!("{}: {}", field, message));
                }
            }
        }
        parts.join("; ")
    }
}

impl fmt::Display for FieldMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

fn flatten(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(text) => vec![text],
        Value::Array(items) => items.into_iter().flat_map(flatten).collect(),
        other => vec![other.to_string()],
    }
}
