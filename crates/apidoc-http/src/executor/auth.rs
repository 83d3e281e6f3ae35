use apidoc_core::parse::security::ApiKeyLocation;
use apidoc_core::request::ParamMap;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use reqwest::header::{AUTHORIZATION, COOKIE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credentials attached to every request an executor sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecurityConfig {
    ApiKey {
        name: String,
        location: ApiKeyLocation,
        value: String,
    },
    Bearer {
        token: String,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        access_token: String,
    },
    Basic {
        username: String,
        password: String,
    },
}

impl SecurityConfig {
    /// Add the credentials to the outgoing headers or query. Auth headers
    /// override anything set before.
    pub fn apply(&self, headers: &mut IndexMap<String, String>, query: &mut ParamMap) {
        match self {
            SecurityConfig::ApiKey {
                name,
                location,
                value,
            } => match location {
                ApiKeyLocation::Header => {
                    set_header(headers, name, value.clone());
                }
                ApiKeyLocation::Query => {
                    query.insert(name.clone(), Value::String(value.clone()));
                }
                ApiKeyLocation::Cookie => {
                    let pair = format!("{name}={value}");
                    let cookie = match header_value(headers, COOKIE.as_str()) {
                        Some(existing) if !existing.is_empty() => format!("{existing}; {pair}"),
                        _ => pair,
                    };
                    set_header(headers, COOKIE.as_str(), cookie);
                }
            },
            SecurityConfig::Bearer { token } => {
                set_header(headers, AUTHORIZATION.as_str(), format!("Bearer {token}"));
            }
            SecurityConfig::OAuth2 { access_token } => {
                set_header(
                    headers,
                    AUTHORIZATION.as_str(),
                    format!("Bearer {access_token}"),
                );
            }
            SecurityConfig::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                set_header(headers, AUTHORIZATION.as_str(), format!("Basic {encoded}"));
            }
        }
    }
}

fn header_value<'h>(headers: &'h IndexMap<String, String>, name: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Insert a header, replacing any existing entry whose name differs only by case.
pub(crate) fn set_header(headers: &mut IndexMap<String, String>, name: &str, value: String) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}
