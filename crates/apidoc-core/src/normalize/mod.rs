pub mod endpoint_id;
pub mod schema_normalizer;
pub mod spec_to_model;

use serde_json::Value;

use crate::error::{NormalizeError, ParseError};
use crate::model::ParsedApiSpec;
use crate::parse;
use crate::parse::spec::OpenApiSpec;

pub use endpoint_id::endpoint_id;
pub use spec_to_model::SpecNormalizer;

/// Normalize a decoded document.
pub fn normalize(document: &Value) -> Result<ParsedApiSpec, NormalizeError> {
    let spec = parse::from_value(document)?;
    SpecNormalizer::new(&spec, document).run()
}

/// Normalize an already-typed document. References resolve against its own
/// serialized form.
pub fn normalize_spec(spec: &OpenApiSpec) -> Result<ParsedApiSpec, NormalizeError> {
    let root = serde_json::to_value(spec).map_err(ParseError::Json)?;
    SpecNormalizer::new(spec, &root).run()
}

/// Decode JSON or YAML text and normalize it.
pub fn normalize_str(input: &str) -> Result<ParsedApiSpec, NormalizeError> {
    let document = parse::parse_document(input)?;
    normalize(&document)
}
