use apidoc_core::request::scalar_to_string;
use serde::Serialize;
use serde_json::Value;

use crate::error::ExecuteError;

pub const JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART: &str = "multipart/form-data";

/// A request body, encoded according to its content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart(Vec<(String, String)>),
    Raw(String),
}

impl RequestBody {
    /// Choose the encoding from `content_type`: JSON types, URL-encoded forms and
    /// multipart forms are recognised, anything else is sent as text.
    pub fn encode(content_type: &str, value: Value) -> Result<Self, ExecuteError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();

        if essence == JSON || essence.ends_with("+json") {
            return Ok(RequestBody::Json(value));
        }
        if essence == FORM_URLENCODED {
            return Ok(RequestBody::Form(form_fields(value)?));
        }
        if essence == MULTIPART {
            return Ok(RequestBody::Multipart(form_fields(value)?));
        }
        Ok(RequestBody::Raw(match value {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    /// Whether the `Content-Type` header should be left to the HTTP client
    /// (multipart needs the generated boundary).
    pub fn sets_own_content_type(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }

    pub(crate) fn into_reqwest(
        self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ExecuteError> {
        Ok(match self {
            RequestBody::Json(value) => {
                let bytes =
                    serde_json::to_vec(&value).map_err(|e| ExecuteError::Body(e.to_string()))?;
                builder.body(bytes)
            }
            RequestBody::Form(fields) => {
                let encoded = serde_urlencoded::to_string(&fields)
                    .map_err(|e| ExecuteError::Body(e.to_string()))?;
                builder.body(encoded)
            }
            RequestBody::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(reqwest::multipart::Form::new(), |form, (name, value)| {
                        form.text(name, value)
                    });
                builder.multipart(form)
            }
            RequestBody::Raw(text) => builder.body(text),
        })
    }
}

/// Flatten an object into form fields. Arrays repeat the field name; nested
/// objects are sent as JSON text.
fn form_fields(value: Value) -> Result<Vec<(String, String)>, ExecuteError> {
    let Value::Object(map) = value else {
        return Err(ExecuteError::Body(
            "form bodies must be JSON objects".to_string(),
        ));
    };
    let mut fields = Vec::with_capacity(map.len());
    for (name, value) in map {
        match value {
            Value::Array(items) => {
                fields.extend(
                    items
                        .iter()
                        .filter_map(scalar_to_string)
                        .map(|v| (name.clone(), v)),
                );
            }
            other => {
                if let Some(v) = scalar_to_string(&other) {
                    fields.push((name, v));
                }
            }
        }
    }
    Ok(fields)
}
