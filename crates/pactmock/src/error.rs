//! Error taxonomy shared by the interaction model, the control plane and the
//! handler registry.

use crate::handlers::HandlerKind;
use serde_json::Value;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A raw interaction description that could not be turned into an
/// [`Interaction`](crate::interaction::Interaction).
///
/// Every variant carries the offending value rendered as text so that test
/// failures point straight at the bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("Invalid interaction provided - {0}")]
    InvalidInteraction(String),
    #[error("Invalid provider name provided - {0}")]
    InvalidProvider(String),
    #[error("Invalid state provided - {0}")]
    InvalidState(String),
    #[error("Invalid upon receiving description provided - {0}")]
    InvalidDescription(String),
    #[error("Invalid interaction request provided - {0}")]
    InvalidRequest(String),
    #[error("Invalid interaction request method provided - {0}")]
    InvalidMethod(String),
    #[error("Invalid interaction request path provided - {0}")]
    InvalidPath(String),
    #[error("Invalid interaction request {field} provided - {value}")]
    InvalidRequestField { field: &'static str, value: String },
    /// `ignoreQuery` / `ignoreBody` on a contract interaction.
    #[error("Pact interaction won't support ignore {0}")]
    UnsupportedForContract(&'static str),
    #[error("Invalid interaction response provided - {0}")]
    InvalidResponse(String),
    #[error("Invalid interaction response status provided - {0}")]
    InvalidStatus(String),
    #[error("Invalid interaction response headers provided - {0}")]
    InvalidResponseHeaders(String),
    #[error("Invalid interaction id provided - {0}")]
    InvalidId(String),
    #[error("Invalid interaction port provided - {0}")]
    InvalidPort(String),
}

/// Bad arguments handed to a control-plane operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid port number provided - {0}")]
    InvalidPort(String),
    #[error("Invalid interaction id - {0}")]
    InvalidId(String),
    #[error("Invalid interactions array passed - {0}")]
    InvalidInteractions(String),
}

/// Registration or lookup failure in a [`Registry`](crate::handlers::Registry).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("`name` is required")]
    NameRequired,
    #[error("`func` is required")]
    FuncRequired,
    #[error("Custom {kind} Handler Not Found - {name}")]
    NotFound { kind: HandlerKind, name: String },
}

/// Top-level error returned by control-plane operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
    /// Failure reported by the injected server, passed through untouched.
    #[error(transparent)]
    Server(anyhow::Error),
    /// Failure reported by the interaction store.
    #[error(transparent)]
    Store(anyhow::Error),
    /// Failure raised by a user-supplied handler while it was running.
    #[error("Handler `{name}` failed: {source}")]
    HandlerFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Render a (possibly absent) raw value for an error message.
///
/// Strings are shown without quotes, everything else as compact JSON.
pub(crate) fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
