use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::operations::NormalizedEndpoint;
use super::schemas::NormalizedSchema;
use crate::parse::security::{SecurityRequirement, SecurityScheme};
use crate::parse::spec::{Contact, ExternalDocs, License};

/// The normalized, read-only view of an OpenAPI document that every consumer
/// (queries, search, request execution, snippets) works from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedApiSpec {
    pub openapi: String,
    pub info: ApiInfo,
    #[serde(default)]
    pub servers: Vec<ApiServer>,
    #[serde(default)]
    pub endpoints: Vec<NormalizedEndpoint>,
    #[serde(default)]
    pub schemas: IndexMap<String, NormalizedSchema>,
    #[serde(default)]
    pub tags: Vec<ApiTag>,
    #[serde(default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

impl ParsedApiSpec {
    /// URL of the first declared server, with variables set to their defaults.
    pub fn default_server_url(&self) -> Option<&str> {
        self.servers.first().map(|s| s.url.as_str())
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

/// A server URL. `url` has its variables substituted; `template` keeps the
/// original form when it had any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiServer {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A declared tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}
