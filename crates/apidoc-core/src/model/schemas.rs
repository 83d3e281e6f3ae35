use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::parse::schema::{Discriminator, TypeSet};

/// A dereferenced schema tree.
///
/// Nested schemas are fully expanded. The only place a pointer survives is
/// `circular_ref`: when a schema refers back to one that is still being expanded
/// above it, the recursion stops at a node carrying nothing but that pointer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedSchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub write_only: bool,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, NormalizedSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<NormalizedAdditionalProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<NormalizedSchema>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<NormalizedSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<NormalizedSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<NormalizedSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "SchemaConstraints::is_empty")]
    pub constraints: SchemaConstraints,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub circular_ref: Option<String>,
}

/// Numeric, string and array bounds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default)]
    pub unique_items: bool,
}

impl SchemaConstraints {
    pub fn is_empty(&self) -> bool {
        *self == SchemaConstraints::default()
    }
}

/// `additionalProperties` after normalization: still either a flag or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedAdditionalProperties {
    Bool(bool),
    Schema(Box<NormalizedSchema>),
}

impl NormalizedSchema {
    /// The first non-null type keyword, e.g. `string` for `type: [string, null]`.
    pub fn primary_type(&self) -> Option<&'static str> {
        use crate::parse::schema::SchemaType;
        match self.schema_type.as_ref()? {
            TypeSet::Single(t) => Some(t.as_str()),
            TypeSet::Multiple(types) => types
                .iter()
                .find(|t| **t != SchemaType::Null)
                .or(types.first())
                .map(SchemaType::as_str),
        }
    }

    pub fn is_circular(&self) -> bool {
        self.circular_ref.is_some()
    }

    /// A representative value: the schema's example, else its default, else a
    /// placeholder built from its type. Used for sample request bodies.
    pub fn sample_value(&self) -> serde_json::Value {
        use serde_json::{Map, Value};

        if let Some(example) = &self.example {
            return example.clone();
        }
        if let Some(default) = &self.default_value {
            return default.clone();
        }
        if let Some(first) = self.enum_values.first() {
            return first.clone();
        }
        if let Some(value) = &self.const_value {
            return value.clone();
        }
        if self.is_circular() {
            return Value::Object(Map::new());
        }
        if let Some(first) = self.one_of.first().or(self.any_of.first()) {
            return first.sample_value();
        }
        if !self.all_of.is_empty() {
            let mut merged = Map::new();
            for part in &self.all_of {
                if let Value::Object(fields) = part.sample_value() {
                    merged.extend(fields);
                }
            }
            return Value::Object(merged);
        }

        match self.primary_type() {
            Some("string") => Value::String(match self.format.as_deref() {
                Some("date-time") => "2024-01-01T00:00:00Z".to_string(),
                Some("date") => "2024-01-01".to_string(),
                Some("email") => "user@example.com".to_string(),
                Some("uuid") => "00000000-0000-0000-0000-000000000000".to_string(),
                Some("uri") | Some("url") => "https://example.com".to_string(),
                _ => "string".to_string(),
            }),
            Some("integer") => Value::from(0),
            Some("number") => Value::from(0.0),
            Some("boolean") => Value::Bool(true),
            Some("array") => Value::Array(
                self.items
                    .as_ref()
                    .map(|item| vec![item.sample_value()])
                    .unwrap_or_default(),
            ),
            Some("null") => Value::Null,
            _ if !self.properties.is_empty() || self.primary_type() == Some("object") => {
                Value::Object(
                    self.properties
                        .iter()
                        .map(|(name, prop)| (name.clone(), prop.sample_value()))
                        .collect(),
                )
            }
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::schema::SchemaType;
    use serde_json::json;

    fn typed(t: SchemaType) -> NormalizedSchema {
        NormalizedSchema {
            schema_type: Some(TypeSet::Single(t)),
            ..Default::default()
        }
    }

    #[test]
    fn test_primary_type_skips_null() {
        let schema = NormalizedSchema {
            schema_type: Some(TypeSet::Multiple(vec![SchemaType::Null, SchemaType::String])),
            ..Default::default()
        };
        assert_eq!(schema.primary_type(), Some("string"));
    }

    #[test]
    fn test_sample_value_object() {
        let mut schema = typed(SchemaType::Object);
        schema
            .properties
            .insert("name".to_string(), typed(SchemaType::String));
        schema
            .properties
            .insert("age".to_string(), typed(SchemaType::Integer));
        let mut tags = typed(SchemaType::Array);
        tags.items = Some(Box::new(typed(SchemaType::String)));
        schema.properties.insert("tags".to_string(), tags);

        assert_eq!(
            schema.sample_value(),
            json!({"name": "string", "age": 0, "tags": ["string"]})
        );
    }

    #[test]
    fn test_sample_value_prefers_example() {
        let mut schema = typed(SchemaType::String);
        schema.example = Some(json!("rex"));
        schema.default_value = Some(json!("fido"));
        assert_eq!(schema.sample_value(), json!("rex"));
    }

    #[test]
    fn test_constraints_skipped_when_empty() {
        let value = serde_json::to_value(typed(SchemaType::String)).unwrap();
        assert!(value.get("constraints").is_none());
    }
}
