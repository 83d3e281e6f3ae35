use serde::{Deserialize, Serialize};

use crate::model::{HttpMethod, NormalizedEndpoint};

/// Structured predicates applied before text search. Every active predicate must
/// hold; empty lists and `None` disable a predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub methods: Vec<HttpMethod>,
    pub tags: Vec<String>,
    pub deprecated: Option<bool>,
    pub has_parameters: Option<bool>,
    pub has_request_body: Option<bool>,
    pub response_codes: Vec<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        *self == SearchFilters::default()
    }

    /// Evaluated in a fixed order: method, tags, deprecated, parameters, request
    /// body, response codes.
    pub fn matches(&self, endpoint: &NormalizedEndpoint) -> bool {
        if !self.methods.is_empty() && !self.methods.contains(&endpoint.method) {
            return false;
        }
        if !self.tags.is_empty() && !endpoint.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if let Some(deprecated) = self.deprecated {
            if endpoint.deprecated != deprecated {
                return false;
            }
        }
        if let Some(has_parameters) = self.has_parameters {
            if endpoint.parameters.is_empty() == has_parameters {
                return false;
            }
        }
        if let Some(has_body) = self.has_request_body {
            if endpoint.request_body.is_some() != has_body {
                return false;
            }
        }
        if !self.response_codes.is_empty()
            && !endpoint
                .responses
                .iter()
                .any(|r| self.response_codes.contains(&r.status_code))
        {
            return false;
        }
        true
    }
}
