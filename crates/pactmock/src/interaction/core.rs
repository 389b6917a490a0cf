//! The `Interaction` aggregate and its construction rules.

use super::request::InteractionRequest;
use super::response::InteractionResponse;
use super::types::{non_empty_str, port_number, InteractionKind};
use crate::error::{describe, InteractionError};
use crate::id::IdGenerator;
use crate::transform::ValueTransform;
use serde::Serialize;
use serde_json::{Map, Value};

/// Everything construction needs besides the raw description.
pub struct InteractionDefaults<'a> {
    pub port: u16,
    pub consumer: &'a str,
    pub ids: &'a dyn IdGenerator,
    pub transform: &'a dyn ValueTransform,
}

/// A validated request/response pair.
///
/// Instances only exist in a fully valid state: [`Interaction::new`] either
/// returns a complete interaction or the first validation error it hit.
/// Fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    id: String,
    port: u16,
    kind: InteractionKind,
    consumer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upon_receiving: Option<String>,
    with_request: InteractionRequest,
    will_respond_with: InteractionResponse,
    #[serde(skip)]
    raw: Value,
}

impl Interaction {
    /// Validate `raw` and build an interaction from it.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// the raw value itself, the contract fields (pact only), the request,
    /// the ignore flags (pact only), then the response. Defaults are only
    /// applied once every check has passed.
    pub fn new(
        raw: &Value,
        kind: InteractionKind,
        defaults: &InteractionDefaults<'_>,
    ) -> Result<Self, InteractionError> {
        let fields = raw
            .as_object()
            .ok_or_else(|| InteractionError::InvalidInteraction(describe(Some(raw))))?;

        let (provider, state, upon_receiving) = match kind {
            InteractionKind::Mock => (None, None, None),
            InteractionKind::Pact => (
                Some(required_text(fields, "provider", InteractionError::InvalidProvider)?),
                Some(required_text(fields, "state", InteractionError::InvalidState)?),
                Some(required_text(
                    fields,
                    "uponReceiving",
                    InteractionError::InvalidDescription,
                )?),
            ),
        };

        let with_request = InteractionRequest::from_raw(fields.get("withRequest"))?;
        if kind == InteractionKind::Pact {
            if with_request.ignore_query() {
                return Err(InteractionError::UnsupportedForContract("query"));
            }
            if with_request.ignore_body() {
                return Err(InteractionError::UnsupportedForContract("body"));
            }
        }

        let will_respond_with =
            InteractionResponse::from_raw(fields.get("willRespondWith"), defaults.transform)?;

        let id = match fields.get("id") {
            None | Some(Value::Null) => defaults.ids.next_id(),
            Some(Value::String(s)) if s.is_empty() => defaults.ids.next_id(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => return Err(InteractionError::InvalidId(other.to_string())),
        };

        let port = match fields.get("port") {
            None | Some(Value::Null) => defaults.port,
            Some(value) => port_number(value)
                .ok_or_else(|| InteractionError::InvalidPort(value.to_string()))?,
        };

        let consumer = non_empty_str(fields.get("consumer"))
            .unwrap_or(defaults.consumer)
            .to_string();

        Ok(Self {
            id,
            port,
            kind,
            consumer,
            provider,
            state,
            upon_receiving,
            with_request,
            will_respond_with,
            raw: raw.clone(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn kind(&self) -> InteractionKind {
        self.kind
    }

    /// True for ephemeral mock interactions, false for pact interactions.
    pub fn is_mock(&self) -> bool {
        self.kind.is_mock()
    }

    pub fn consumer(&self) -> &str {
        &self.consumer
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn upon_receiving(&self) -> Option<&str> {
        self.upon_receiving.as_deref()
    }

    pub fn request(&self) -> &InteractionRequest {
        &self.with_request
    }

    pub fn response(&self) -> &InteractionResponse {
        &self.will_respond_with
    }

    /// The description this interaction was built from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

fn required_text(
    fields: &Map<String, Value>,
    field: &str,
    err: fn(String) -> InteractionError,
) -> Result<String, InteractionError> {
    let value = fields.get(field);
    non_empty_str(value)
        .map(str::to_string)
        .ok_or_else(|| err(describe(value)))
}
