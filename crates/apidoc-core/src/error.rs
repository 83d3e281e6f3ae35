use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is neither valid JSON ({json}) nor valid YAML ({yaml})")]
    Undecodable { json: String, yaml: String },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document does not match the OpenAPI shape: {0}")]
    Shape(serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("reference {ref_path} points at an unexpected node: {source}")]
    InvalidTarget {
        ref_path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("operation id '{id}' is used by both {first} and {second}")]
    DuplicateOperationId {
        id: String,
        first: String,
        second: String,
    },
}

/// A caller asked for an operation or schema the loaded spec does not have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no endpoint with operation id '{0}'")]
    UnknownOperation(String),

    #[error("no schema named '{0}'")]
    UnknownSchema(String),
}

/// A spec-dependent accessor was used before any spec was provided.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("no API spec loaded; provide one to the spec context before querying it")]
    NoSpecLoaded,
}
