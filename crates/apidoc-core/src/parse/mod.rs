pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;

use serde_json::Value;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Decode raw spec text into a JSON value.
///
/// JSON is attempted first, then YAML. When both fail the error carries both
/// decoder messages.
pub fn parse_document(input: &str) -> Result<Value, ParseError> {
    let json_err = match serde_json::from_str::<Value>(input) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    match serde_yaml_ng::from_str::<Value>(input) {
        Ok(Value::Null) if input.trim().is_empty() => Err(ParseError::Undecodable {
            json: json_err.to_string(),
            yaml: "document is empty".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(yaml_err) => Err(ParseError::Undecodable {
            json: json_err.to_string(),
            yaml: yaml_err.to_string(),
        }),
    }
}

/// Read the typed document out of an already-decoded value.
pub fn from_value(value: &Value) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_value(value.clone()).map_err(ParseError::Shape)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}
