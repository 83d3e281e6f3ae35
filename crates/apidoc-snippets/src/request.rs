//! The request a snippet describes, assembled once and shared by every emitter.

use apidoc_core::model::{HttpMethod, NormalizedEndpoint};
use apidoc_core::parse::security::ApiKeyLocation;
use apidoc_core::request::{build_url, encode_query, scalar_to_string};
use indexmap::IndexMap;
use serde_json::Value;

use crate::options::{
    API_KEY_PLACEHOLDER, DEFAULT_API_KEY_NAME, PASSWORD_PLACEHOLDER, SnippetAuth, SnippetOptions,
    TOKEN_PLACEHOLDER, USERNAME_PLACEHOLDER,
};

const JSON: &str = "application/json";

/// Request body, shaped by its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum SnippetBody {
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart(Vec<(String, String)>),
    Text(String),
}

impl SnippetBody {
    fn new(content_type: &str, value: Value) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/x-www-form-urlencoded" => SnippetBody::Form(form_fields(&value)),
            "multipart/form-data" => SnippetBody::Multipart(form_fields(&value)),
            e if e == JSON || e.ends_with("+json") => SnippetBody::Json(value),
            _ => SnippetBody::Text(match value {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        }
    }

    /// The body as it goes on the wire. Multipart bodies have no single text form.
    pub fn text(&self) -> Option<String> {
        match self {
            SnippetBody::Json(value) => Some(serde_json::to_string_pretty(value).unwrap_or_default()),
            SnippetBody::Form(fields) => Some(encode_query(fields)),
            SnippetBody::Multipart(_) => None,
            SnippetBody::Text(text) => Some(text.clone()),
        }
    }
}

fn form_fields(value: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = value else {
        return Vec::new();
    };
    let mut fields = Vec::new();
    for (name, value) in map {
        match value {
            Value::Array(items) => fields.extend(
                items
                    .iter()
                    .filter_map(scalar_to_string)
                    .map(|v| (name.clone(), v)),
            ),
            other => fields.extend(scalar_to_string(other).map(|v| (name.clone(), v))),
        }
    }
    fields
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Everything an emitter needs: method, final URL, headers and body.
///
/// Basic credentials are kept apart from `headers` so each language can use its
/// own idiom for them.
#[derive(Debug, Clone)]
pub struct SnippetRequest<'a> {
    pub endpoint: &'a NormalizedEndpoint,
    pub method: HttpMethod,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub basic_auth: Option<BasicAuth>,
    pub body: Option<SnippetBody>,
}

impl<'a> SnippetRequest<'a> {
    pub fn build(endpoint: &'a NormalizedEndpoint, options: &SnippetOptions, base_url: &str) -> Self {
        let mut headers = IndexMap::new();
        let mut query = options.query_params.clone();
        let mut basic_auth = None;

        let body = sample_body(endpoint, options).map(|(content_type, value)| {
            let body = SnippetBody::new(&content_type, value);
            if !matches!(body, SnippetBody::Multipart(_)) {
                headers.insert("Content-Type".to_string(), content_type);
            }
            body
        });

        for (name, value) in &options.headers {
            set_header(&mut headers, name, value.clone());
        }

        match &options.auth {
            Some(SnippetAuth::Bearer { token }) | Some(SnippetAuth::OAuth2 { token }) => {
                let token = token.as_deref().unwrap_or(TOKEN_PLACEHOLDER);
                set_header(&mut headers, "Authorization", format!("Bearer {token}"));
            }
            Some(SnippetAuth::ApiKey {
                name,
                location,
                value,
            }) => {
                let name = name.as_deref().unwrap_or(DEFAULT_API_KEY_NAME);
                let value = value.as_deref().unwrap_or(API_KEY_PLACEHOLDER);
                match location {
                    ApiKeyLocation::Header => set_header(&mut headers, name, value.to_string()),
                    ApiKeyLocation::Query => {
                        query.insert(name.to_string(), Value::String(value.to_string()));
                    }
                    ApiKeyLocation::Cookie => {
                        set_header(&mut headers, "Cookie", format!("{name}={value}"));
                    }
                }
            }
            Some(SnippetAuth::Basic { username, password }) => {
                basic_auth = Some(BasicAuth {
                    username: username.as_deref().unwrap_or(USERNAME_PLACEHOLDER).to_string(),
                    password: password.as_deref().unwrap_or(PASSWORD_PLACEHOLDER).to_string(),
                });
            }
            None => {}
        }

        Self {
            endpoint,
            method: endpoint.method,
            url: build_url(base_url, &endpoint.path, &options.path_params, &query),
            headers,
            basic_auth,
            body,
        }
    }

    /// Whether a successful response is declared with a JSON body.
    pub fn expects_json(&self) -> bool {
        self.endpoint
            .responses
            .iter()
            .filter(|r| r.is_success())
            .flat_map(|r| &r.content)
            .any(|mt| mt.media_type.contains("json"))
    }
}

/// The body to show and its content type: the explicit one from `options`, or a
/// sample built from the declared request body.
fn sample_body(endpoint: &NormalizedEndpoint, options: &SnippetOptions) -> Option<(String, Value)> {
    let declared = endpoint
        .request_body
        .as_ref()
        .and_then(|rb| rb.preferred_content());
    let content_type = options
        .content_type
        .clone()
        .or_else(|| declared.map(|mt| mt.media_type.clone()))
        .unwrap_or_else(|| JSON.to_string());

    if let Some(body) = &options.body {
        return Some((content_type, body.clone()));
    }
    let media = declared?;
    let value = media
        .example
        .clone()
        .or_else(|| {
            media
                .examples
                .values()
                .next()
                .and_then(|example| example.get("value").cloned())
        })
        .or_else(|| media.schema.as_ref().map(|s| s.sample_value()))?;
    Some((content_type, value))
}

fn set_header(headers: &mut IndexMap<String, String>, name: &str, value: String) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidoc_core::normalize_str;
    use serde_json::json;

    const SPEC: &str = r#"
openapi: 3.0.3
info: { title: T, version: "1" }
paths:
  /users/{id}:
    patch:
      operationId: updateUser
      parameters:
        - { name: id, in: path, required: true, schema: { type: string } }
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name: { type: string, example: Ada }
                admin: { type: boolean }
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema: { type: object }
"#;

    fn endpoint() -> NormalizedEndpoint {
        normalize_str(SPEC).unwrap().endpoints.remove(0)
    }

    #[test]
    fn test_sample_body_from_schema() {
        let endpoint = endpoint();
        let request = SnippetRequest::build(&endpoint, &SnippetOptions::default(), "https://x");
        assert_eq!(
            request.body,
            Some(SnippetBody::Json(json!({"name": "Ada", "admin": true})))
        );
        assert_eq!(request.headers["Content-Type"], "application/json");
        assert!(request.expects_json());
    }

    #[test]
    fn test_explicit_body_and_path_params() {
        let endpoint = endpoint();
        let options = SnippetOptions::default()
            .path_param("id", "42")
            .body(json!({"name": "Grace"}));
        let request = SnippetRequest::build(&endpoint, &options, "https://x/");
        assert_eq!(request.url, "https://x/users/42");
        assert_eq!(request.body, Some(SnippetBody::Json(json!({"name": "Grace"}))));
    }

    #[test]
    fn test_auth_header_overrides_user_header() {
        let endpoint = endpoint();
        let options = SnippetOptions::default()
            .header("authorization", "stale")
            .with_auth(SnippetAuth::bearer());
        let request = SnippetRequest::build(&endpoint, &options, "https://x");
        assert_eq!(request.headers.get("authorization"), None);
        assert_eq!(request.headers["Authorization"], "Bearer <token>");
    }

    #[test]
    fn test_api_key_in_query() {
        let endpoint = endpoint();
        let options = SnippetOptions::default().with_auth(SnippetAuth::ApiKey {
            name: Some("key".to_string()),
            location: ApiKeyLocation::Query,
            value: Some("s3cret".to_string()),
        });
        let request = SnippetRequest::build(&endpoint, &options, "https://x");
        assert_eq!(request.url, "https://x/users/{id}?key=s3cret");
    }

    #[test]
    fn test_form_and_multipart_bodies() {
        assert_eq!(
            SnippetBody::new(
                "application/x-www-form-urlencoded",
                json!({"a": "1 2", "b": [true, false]})
            )
            .text()
            .unwrap(),
            "a=1+2&b=true&b=false"
        );
        let multipart = SnippetBody::new("multipart/form-data", json!({"file": "x"}));
        assert_eq!(
            multipart,
            SnippetBody::Multipart(vec![("file".to_string(), "x".to_string())])
        );
        assert_eq!(multipart.text(), None);
    }
}
