//! Typed error hierarchy for the board client.
//!
//! - `TransportError` covers every failed call to the task API
//! - `ValidationErrors` covers form input rejected before any request is made
//! - `BoardError` is what controller operations return
//! - `ConfigError` is raised while reading settings at startup

use std::fmt;
use thiserror::Error;

/// A failed round trip to the task API.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{operation}: request failed: {source}")]
    Network {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: server returned {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation}: could not decode response: {source}")]
    Decode {
        operation: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation}: cannot build request URL from {base_url:?}: {reason}")]
    InvalidUrl {
        operation: String,
        base_url: String,
        reason: String,
    },
}

impl TransportError {
    /// Response body preserved for diagnostics, when the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } | TransportError::Decode { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Title => f.write_str("title"),
            FormField::Description => f.write_str("description"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// One or more fields failed validation. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid task form: {}", join_field_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn for_field(&self, field: FormField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Errors from board operations driven by the controller.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The refetch issued after a failed mutation failed too. Local and
    /// server state may disagree until the board is reloaded.
    #[error("could not resynchronize after `{original}`: {recovery}")]
    RecoveryFailed {
        original: TransportError,
        #[source]
        recovery: TransportError,
    },

    #[error("task {id} is not on the board")]
    TaskNotFound { id: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API URL {value:?}: {reason}")]
    InvalidApiUrl { value: String, reason: String },
}
