use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schemas::NormalizedSchema;
use crate::parse::parameter::ParameterLocation;
use crate::parse::security::SecurityRequirement;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    /// Every method, in the order operations are read out of a path item.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase form, as used for path item keys.
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }

    /// Whether requests with this method conventionally carry a body.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown HTTP method '{s}'"))
    }
}

/// One (path, method) pair of the document, fully dereferenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEndpoint {
    /// The declared `operationId`, or a slug derived from method and path.
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub parameters: Vec<NormalizedParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<NormalizedRequestBody>,
    #[serde(default)]
    pub responses: Vec<NormalizedResponse>,
    /// Effective requirements: the operation's own, else the document default.
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,
}

impl NormalizedEndpoint {
    pub fn parameters_in(
        &self,
        location: ParameterLocation,
    ) -> impl Iterator<Item = &NormalizedParameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    pub fn response(&self, status_code: &str) -> Option<&NormalizedResponse> {
        self.responses.iter().find(|r| r.status_code == status_code)
    }

    /// `GET /users/{id}` style label, used in logs and error messages.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A path/query/header/cookie parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedParameter {
    pub name: String,
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<NormalizedSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
}

/// One entry of a `content` map, flattened out of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMediaType {
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<NormalizedSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, serde_json::Value>,
    /// Field names with an explicit multipart/form encoding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub encoding: Vec<String>,
}

/// A dereferenced request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub content: Vec<NormalizedMediaType>,
}

impl NormalizedRequestBody {
    /// The JSON entry if there is one, else the first declared media type.
    pub fn preferred_content(&self) -> Option<&NormalizedMediaType> {
        self.content
            .iter()
            .find(|mt| mt.media_type == "application/json")
            .or_else(|| self.content.first())
    }
}

/// A response header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedHeader {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<NormalizedSchema>,
}

/// A response for one status code (or `default`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub status_code: String,
    pub description: String,
    #[serde(default)]
    pub content: Vec<NormalizedMediaType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<NormalizedHeader>,
}

impl NormalizedResponse {
    /// `2XX`-style ranges and `default` are not successes by themselves; only
    /// concrete codes in 200..=299 are.
    pub fn is_success(&self) -> bool {
        self.status_code
            .parse::<u16>()
            .is_ok_and(|code| (200..300).contains(&code))
    }
}
