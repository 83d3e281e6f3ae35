use std::time::Duration;

use indexmap::IndexMap;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;

use crate::error::ExecuteError;

/// A response body, decoded by its content type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseData {
    Json(Value),
    Text(String),
    Binary(Vec<u8>),
}

impl ResponseData {
    pub fn decode(content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
        if content_type.contains("json") && !bytes.is_empty() {
            if let Ok(value) = serde_json::from_slice(&bytes) {
                return ResponseData::Json(value);
            }
        }
        if content_type.is_empty()
            || content_type.starts_with("text/")
            || content_type.contains("json")
            || content_type.contains("xml")
            || content_type.contains("javascript")
            || content_type.contains("x-www-form-urlencoded")
        {
            return match String::from_utf8(bytes) {
                Ok(text) => ResponseData::Text(text),
                Err(e) => ResponseData::Binary(e.into_bytes()),
            };
        }
        ResponseData::Binary(bytes)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: IndexMap<String, String>,
    pub data: ResponseData,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl ExecutionResponse {
    pub(crate) async fn read(
        response: reqwest::Response,
        duration: Duration,
    ) -> Result<Self, ExecuteError> {
        let status = response.status();
        let mut headers = IndexMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        let content_type = headers.get(CONTENT_TYPE.as_str()).cloned();
        let bytes = response.bytes().await?.to_vec();
        Ok(Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            data: ResponseData::decode(content_type.as_deref(), bytes),
            duration,
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body's `message` field if it has one, else `HTTP {status}: {reason}`.
    pub fn error_message(&self) -> String {
        self.data
            .as_json()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}: {}", self.status, self.status_text))
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, status_text: &str, data: ResponseData) -> ExecutionResponse {
        ExecutionResponse {
            status,
            status_text: status_text.to_string(),
            headers: IndexMap::new(),
            data,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_decode_by_content_type() {
        assert_eq!(
            ResponseData::decode(Some("application/json"), br#"{"ok":true}"#.to_vec()),
            ResponseData::Json(json!({"ok": true}))
        );
        assert_eq!(
            ResponseData::decode(Some("text/plain; charset=utf-8"), b"hi".to_vec()),
            ResponseData::Text("hi".to_string())
        );
        assert_eq!(
            ResponseData::decode(Some("image/png"), vec![0x89, 0x50]),
            ResponseData::Binary(vec![0x89, 0x50])
        );
        // malformed JSON falls back to text
        assert_eq!(
            ResponseData::decode(Some("application/json"), b"{oops".to_vec()),
            ResponseData::Text("{oops".to_string())
        );
    }

    #[test]
    fn test_error_message_prefers_body() {
        let r = response(
            404,
            "Not Found",
            ResponseData::Json(json!({"message": "User not found"})),
        );
        assert_eq!(r.error_message(), "User not found");

        let r = response(500, "Internal Server Error", ResponseData::Text("boom".into()));
        assert_eq!(r.error_message(), "HTTP 500: Internal Server Error");
        assert!(!r.is_success());
    }
}
