use log::warn;
use serde::Deserialize;

use crate::error::ResolveError;
use crate::model::{NormalizedAdditionalProperties, NormalizedSchema, SchemaConstraints};
use crate::parse::ref_resolve::{RefResolver, ref_of};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef};

/// Expands schemas into [`NormalizedSchema`] trees, dereferencing every `$ref` on
/// the way down.
///
/// The normalizer tracks the pointers it is currently inside of. A reference back
/// into one of them is a recursive schema; it becomes a `circular_ref` marker node
/// instead of being expanded again.
pub struct SchemaNormalizer<'a> {
    resolver: RefResolver<'a>,
    expanding: Vec<String>,
}

impl<'a> SchemaNormalizer<'a> {
    pub fn new(resolver: RefResolver<'a>) -> Self {
        Self {
            resolver,
            expanding: Vec::new(),
        }
    }

    pub fn normalize(&mut self, schema: &SchemaOrRef) -> Result<NormalizedSchema, ResolveError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => self.normalize_ref(ref_path),
            SchemaOrRef::Schema(schema) => self.normalize_schema(schema),
        }
    }

    /// Normalize a named component schema, e.g. `components.schemas.User`.
    /// Self-references inside it are cut at the first level.
    pub fn normalize_component(
        &mut self,
        name: &str,
        schema: &SchemaOrRef,
    ) -> Result<NormalizedSchema, ResolveError> {
        let pointer = format!("#/components/schemas/{}", escape_segment(name));
        self.expanding.push(pointer);
        let result = self.normalize(schema);
        self.expanding.pop();
        result
    }

    fn normalize_ref(&mut self, ref_path: &str) -> Result<NormalizedSchema, ResolveError> {
        if self.expanding.iter().any(|p| p == ref_path) {
            warn!("recursive schema reference {ref_path} left unexpanded");
            return Ok(NormalizedSchema {
                circular_ref: Some(ref_path.to_string()),
                ..Default::default()
            });
        }

        // Follow ref-to-ref chains hop by hop so every pointer on the way counts as
        // "being expanded" for the nested schemas.
        let mut chain = vec![ref_path.to_string()];
        let mut target = self.resolver.lookup(ref_path)?;
        while let Some(next) = ref_of(target) {
            if chain.iter().any(|p| p == next) {
                return Err(ResolveError::CircularRef(next.to_string()));
            }
            chain.push(next.to_string());
            target = self.resolver.lookup(next)?;
        }

        let schema = Schema::deserialize(target).map_err(|source| ResolveError::InvalidTarget {
            ref_path: ref_path.to_string(),
            source,
        })?;

        let depth = self.expanding.len();
        self.expanding.extend(chain);
        let result = self.normalize_schema(&schema);
        self.expanding.truncate(depth);
        result
    }

    fn normalize_schema(&mut self, schema: &Schema) -> Result<NormalizedSchema, ResolveError> {
        let mut properties = indexmap::IndexMap::with_capacity(schema.properties.len());
        for (name, prop) in &schema.properties {
            properties.insert(name.clone(), self.normalize(prop)?);
        }

        let items = match &schema.items {
            Some(items) => Some(Box::new(self.normalize(items)?)),
            None => None,
        };

        let additional_properties = match &schema.additional_properties {
            Some(AdditionalProperties::Bool(flag)) => {
                Some(NormalizedAdditionalProperties::Bool(*flag))
            }
            Some(AdditionalProperties::Schema(inner)) => Some(
                NormalizedAdditionalProperties::Schema(Box::new(self.normalize(inner)?)),
            ),
            None => None,
        };

        let all_of = self.normalize_all(&schema.all_of)?;
        let one_of = self.normalize_all(&schema.one_of)?;
        let any_of = self.normalize_all(&schema.any_of)?;

        Ok(NormalizedSchema {
            schema_type: schema.schema_type.clone(),
            format: schema.format.clone(),
            title: schema.title.clone(),
            description: schema.description.clone(),
            default_value: schema.default_value.clone(),
            nullable: schema.nullable.unwrap_or(false),
            deprecated: schema.deprecated.unwrap_or(false),
            read_only: schema.read_only.unwrap_or(false),
            write_only: schema.write_only.unwrap_or(false),
            properties,
            required: schema.required.clone(),
            additional_properties,
            items,
            all_of,
            one_of,
            any_of,
            discriminator: schema.discriminator.clone(),
            enum_values: schema.enum_values.clone(),
            const_value: schema.const_value.clone(),
            example: schema.example.clone(),
            constraints: SchemaConstraints {
                minimum: schema.minimum,
                maximum: schema.maximum,
                exclusive_minimum: schema.exclusive_minimum,
                exclusive_maximum: schema.exclusive_maximum,
                min_length: schema.min_length,
                max_length: schema.max_length,
                pattern: schema.pattern.clone(),
                min_items: schema.min_items,
                max_items: schema.max_items,
                unique_items: schema.unique_items.unwrap_or(false),
            },
            circular_ref: None,
        })
    }

    fn normalize_all(
        &mut self,
        schemas: &[SchemaOrRef],
    ) -> Result<Vec<NormalizedSchema>, ResolveError> {
        schemas.iter().map(|s| self.normalize(s)).collect()
    }
}

fn escape_segment(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}
