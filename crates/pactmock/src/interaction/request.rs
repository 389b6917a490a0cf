//! Request side of an interaction.

use super::types::{is_truthy, non_empty_str, Method};
use crate::error::{describe, InteractionError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Normalized `withRequest` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    method: Method,
    path: String,
    /// Header names are stored lower-cased.
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    ignore_body: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    ignore_query: bool,
}

impl InteractionRequest {
    /// Build a request descriptor from the raw `withRequest` value.
    ///
    /// Checks the block itself, then `method`, then `path`. Whether the
    /// ignore flags are allowed depends on the owning interaction and is
    /// checked there.
    pub(crate) fn from_raw(raw: Option<&Value>) -> Result<Self, InteractionError> {
        let request = raw
            .and_then(Value::as_object)
            .ok_or_else(|| InteractionError::InvalidRequest(describe(raw)))?;

        let method_value = request.get("method");
        let method = non_empty_str(method_value)
            .and_then(|m| m.parse::<Method>().ok())
            .ok_or_else(|| InteractionError::InvalidMethod(describe(method_value)))?;

        let path_value = request.get("path");
        let path = non_empty_str(path_value)
            .ok_or_else(|| InteractionError::InvalidPath(describe(path_value)))?
            .to_string();

        let headers = optional_map(request, "headers")?
            .map(|headers| lowercase_names(headers, request.get("headers")))
            .transpose()?;
        let query = optional_map(request, "query")?;

        Ok(Self {
            method,
            path,
            headers,
            query,
            body: request.get("body").filter(|b| !b.is_null()).cloned(),
            ignore_body: is_truthy(request.get("ignoreBody")),
            ignore_query: is_truthy(request.get("ignoreQuery")),
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> Option<&BTreeMap<String, Value>> {
        self.headers.as_ref()
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(&name.to_ascii_lowercase()))
    }

    pub fn query(&self) -> Option<&BTreeMap<String, Value>> {
        self.query.as_ref()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn ignore_body(&self) -> bool {
        self.ignore_body
    }

    pub fn ignore_query(&self) -> bool {
        self.ignore_query
    }
}

/// Lower-case header names. Two names that only differ by case are rejected
/// rather than letting one value silently replace the other.
fn lowercase_names(
    headers: BTreeMap<String, Value>,
    raw: Option<&Value>,
) -> Result<BTreeMap<String, Value>, InteractionError> {
    let mut lowered = BTreeMap::new();
    for (name, value) in headers {
        if lowered.insert(name.to_ascii_lowercase(), value).is_some() {
            return Err(InteractionError::InvalidRequestField {
                field: "headers",
                value: describe(raw),
            });
        }
    }
    Ok(lowered)
}

fn optional_map(
    request: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<BTreeMap<String, Value>>, InteractionError> {
    match request.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        )),
        Some(other) => Err(InteractionError::InvalidRequestField {
            field,
            value: other.to_string(),
        }),
    }
}
