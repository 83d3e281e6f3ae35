use apidoc_core::config::SnippetConfig;
use apidoc_core::parse::security::ApiKeyLocation;
use apidoc_core::request::ParamMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Base URL used when neither the options nor the spec provide one.
pub const DEFAULT_BASE_URL: &str = "https://api.example.com";

pub const TOKEN_PLACEHOLDER: &str = "<token>";
pub const API_KEY_PLACEHOLDER: &str = "<api-key>";
pub const USERNAME_PLACEHOLDER: &str = "<username>";
pub const PASSWORD_PLACEHOLDER: &str = "<password>";
pub const DEFAULT_API_KEY_NAME: &str = "X-API-Key";

/// Credentials shown in a snippet. Missing values render as placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnippetAuth {
    Bearer {
        #[serde(default)]
        token: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        #[serde(default)]
        token: Option<String>,
    },
    ApiKey {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_key_location")]
        location: ApiKeyLocation,
        #[serde(default)]
        value: Option<String>,
    },
    Basic {
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
}

fn default_key_location() -> ApiKeyLocation {
    ApiKeyLocation::Header
}

impl SnippetAuth {
    pub fn bearer() -> Self {
        SnippetAuth::Bearer { token: None }
    }

    pub fn api_key(location: ApiKeyLocation) -> Self {
        SnippetAuth::ApiKey {
            name: None,
            location,
            value: None,
        }
    }

    pub fn basic() -> Self {
        SnippetAuth::Basic {
            username: None,
            password: None,
        }
    }
}

/// What to render and with which request values.
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetOptions {
    /// Language name or alias; parsed when a snippet is generated.
    pub language: String,
    pub base_url: Option<String>,
    pub auth: Option<SnippetAuth>,
    pub path_params: ParamMap,
    pub query_params: ParamMap,
    pub headers: IndexMap<String, String>,
    /// Explicit body; without one a sample is built from the request schema.
    pub body: Option<Value>,
    pub content_type: Option<String>,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            language: "curl".to_string(),
            base_url: None,
            auth: None,
            path_params: ParamMap::new(),
            query_params: ParamMap::new(),
            headers: IndexMap::new(),
            body: None,
            content_type: None,
        }
    }
}

impl SnippetOptions {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    /// Defaults from the `snippets` section of `.apidoc.yaml`.
    pub fn from_settings(settings: &SnippetConfig) -> Self {
        Self {
            language: settings.language.clone(),
            base_url: settings.base_url.clone(),
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_auth(mut self, auth: SnippetAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
