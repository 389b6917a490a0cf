//! Response side of an interaction.

use super::types::whole_number;
use crate::error::{describe, InteractionError};
use crate::transform::ValueTransform;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Normalized `willRespondWith` block.
///
/// `raw_body` is the body exactly as supplied; `body` is what the mock
/// server answers with after the value-matcher transform. Both are owned
/// copies, so later changes to the caller's value never reach them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
}

impl InteractionResponse {
    pub(crate) fn from_raw(
        raw: Option<&Value>,
        transform: &dyn ValueTransform,
    ) -> Result<Self, InteractionError> {
        let response = raw
            .and_then(Value::as_object)
            .ok_or_else(|| InteractionError::InvalidResponse(describe(raw)))?;

        let status_value = response.get("status");
        let status = status_value
            .and_then(whole_number)
            .and_then(|s| u16::try_from(s).ok())
            .ok_or_else(|| InteractionError::InvalidStatus(describe(status_value)))?;

        let headers = match response.get("headers") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            Some(other) => {
                return Err(InteractionError::InvalidResponseHeaders(other.to_string()))
            }
        };

        let raw_body = response.get("body").filter(|b| !b.is_null()).cloned();
        let body = raw_body.as_ref().map(|b| transform.transform(b));

        Ok(Self {
            status,
            headers,
            raw_body,
            body,
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> Option<&BTreeMap<String, Value>> {
        self.headers.as_ref()
    }

    /// Body as supplied, matcher wrappers included.
    pub fn raw_body(&self) -> Option<&Value> {
        self.raw_body.as_ref()
    }

    /// Body after the value-matcher transform.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}
