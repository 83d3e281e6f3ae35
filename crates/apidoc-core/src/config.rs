use std::fs;
use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

/// Project configuration loaded from `.apidoc.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApidocConfig {
    pub source: SourceConfig,
    pub loader: LoaderConfig,
    pub execution: ExecutionConfig,
    pub search: SearchConfig,
    pub snippets: SnippetConfig,
}

/// Where the spec comes from when the command line does not say.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub file: Option<String>,
}

/// Retry and cache behaviour of the spec loader.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub cache_ttl_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 1000,
            cache_ttl_secs: 300,
        }
    }
}

impl LoaderConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Defaults applied to every executed request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Overrides the spec's first server.
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub headers: IndexMap<String, String>,
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub fuzzy: bool,
    pub min_query_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy: true,
            min_query_length: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnippetConfig {
    pub language: String,
    pub base_url: Option<String>,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            language: "curl".to_string(),
            base_url: None,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apidoc.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApidocConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ApidocConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apidoc configuration
source:
  file: openapi.yaml
  # url: https://api.example.com/openapi.json

loader:
  retries: 3            # extra attempts after the first failed fetch
  retry_delay_ms: 1000  # doubled after every failed attempt
  cache_ttl_secs: 300

execution:
  # base_url: https://staging.example.com   # overrides servers[0]
  # timeout_secs: 30
  headers: {}
    # X-Client: apidoc

search:
  fuzzy: true
  min_query_length: 1

snippets:
  language: curl        # curl | javascript | typescript | python | node | php | java | go
  # base_url: https://api.example.com
"#
}
