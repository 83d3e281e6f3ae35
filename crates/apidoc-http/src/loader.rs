//! Spec loading: fetch or accept inline, normalize, retry with backoff, cache by URL.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use apidoc_core::ParsedApiSpec;
use apidoc_core::config::LoaderConfig;
use apidoc_core::parse::spec::OpenApiSpec;
use log::{debug, warn};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tokio::sync::watch;

use crate::cache::SpecCache;
use crate::error::LoadError;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Observable state of a [`SpecLoader`].
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded(Arc<ParsedApiSpec>),
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn spec(&self) -> Option<&Arc<ParsedApiSpec>> {
        match self {
            LoadState::Loaded(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// A spec supplied directly instead of fetched.
#[derive(Debug, Clone)]
pub enum SpecInput {
    /// JSON or YAML text.
    Text(String),
    Value(Value),
    Document(Box<OpenApiSpec>),
}

impl SpecInput {
    fn normalize(&self) -> Result<ParsedApiSpec, LoadError> {
        let spec = match self {
            SpecInput::Text(text) => apidoc_core::normalize_str(text)?,
            SpecInput::Value(value) => apidoc_core::normalize(value)?,
            SpecInput::Document(doc) => apidoc_core::normalize_spec(doc)?,
        };
        Ok(spec)
    }
}

/// What to load. Exactly one of `url` and `spec` must be set.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub url: Option<String>,
    pub spec: Option<SpecInput>,
    /// Extra attempts after the first failed fetch.
    pub retries: u32,
    /// Delay before the first retry; doubled after each further failure.
    pub retry_delay: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            url: None,
            spec: None,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl LoadConfig {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn inline(spec: SpecInput) -> Self {
        Self {
            spec: Some(spec),
            ..Self::default()
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Apply the retry settings of a `.apidoc.yaml` loader section.
    pub fn with_settings(self, settings: &LoaderConfig) -> Self {
        self.with_retries(settings.retries)
            .with_retry_delay(settings.retry_delay())
    }

    fn source(&self) -> Result<Source<'_>, LoadError> {
        match (&self.url, &self.spec) {
            (Some(url), None) => Ok(Source::Url(url)),
            (None, Some(input)) => Ok(Source::Inline(input)),
            (Some(_), Some(_)) => Err(LoadError::InvalidConfig(
                "provide either a url or an inline spec, not both",
            )),
            (None, None) => Err(LoadError::InvalidConfig(
                "provide a url or an inline spec",
            )),
        }
    }
}

enum Source<'a> {
    Url(&'a str),
    Inline(&'a SpecInput),
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Source of raw spec text for a URL.
pub trait SpecFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, LoadError>> + Send;
}

/// Fetches specs over HTTP with `reqwest`. Non-2xx answers are errors.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl SpecFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let transport = |e: reqwest::Error| LoadError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json, application/yaml, text/yaml, */*")
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

/// Loads specs and publishes progress through a watch channel.
///
/// Concurrent loads are not coalesced and a running retry loop cannot be
/// cancelled; the state reflects whichever load finished last.
pub struct SpecLoader<F = ReqwestFetcher> {
    fetcher: F,
    cache: Arc<SpecCache>,
    state: watch::Sender<LoadState>,
    last_config: Mutex<Option<LoadConfig>>,
}

impl SpecLoader<ReqwestFetcher> {
    pub fn new() -> Self {
        Self::with_fetcher(ReqwestFetcher::default())
    }
}

impl Default for SpecLoader<ReqwestFetcher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SpecFetcher> SpecLoader<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        let (state, _) = watch::channel(LoadState::Idle);
        Self {
            fetcher,
            cache: Arc::new(SpecCache::default()),
            state,
            last_config: Mutex::new(None),
        }
    }

    pub fn with_cache(mut self, cache: Arc<SpecCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<SpecCache> {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub fn spec(&self) -> Option<Arc<ParsedApiSpec>> {
        self.state.borrow().spec().cloned()
    }

    /// Load according to `config` and return the normalized spec.
    ///
    /// An invalid config fails immediately and leaves the state untouched.
    pub async fn load_spec(&self, config: LoadConfig) -> Result<Arc<ParsedApiSpec>, LoadError> {
        let source = config.source()?;
        *self
            .last_config
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(config.clone());

        self.state.send_replace(LoadState::Loading);
        let result = match source {
            Source::Inline(input) => input.normalize().map(Arc::new),
            Source::Url(url) => self.load_url(url, &config).await,
        };

        match &result {
            Ok(spec) => {
                self.state.send_replace(LoadState::Loaded(spec.clone()));
            }
            Err(err) => {
                self.state.send_replace(LoadState::Error(err.to_string()));
            }
        }
        result
    }

    /// Drop the cached copy of the last URL and load it again.
    pub async fn reload(&self) -> Result<Arc<ParsedApiSpec>, LoadError> {
        let config = self
            .last_config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(LoadError::NothingToReload)?;
        if let Some(url) = &config.url {
            self.cache.invalidate(url);
        }
        self.load_spec(config).await
    }

    async fn load_url(
        &self,
        url: &str,
        config: &LoadConfig,
    ) -> Result<Arc<ParsedApiSpec>, LoadError> {
        if let Some(spec) = self.cache.get(url) {
            return Ok(spec);
        }

        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(spec) => {
                    debug!("loaded {url} after {} attempt(s)", attempt + 1);
                    self.cache.insert(url, spec.clone());
                    return Ok(spec);
                }
                Err(err) if attempt < config.retries => {
                    let delay = backoff_delay(config.retry_delay, attempt);
                    warn!(
                        "loading {url} failed (attempt {}/{}): {err}; retrying in {delay:?}",
                        attempt + 1,
                        config.retries + 1
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Arc<ParsedApiSpec>, LoadError> {
        let text = self.fetcher.fetch(url).await?;
        Ok(Arc::new(apidoc_core::normalize_str(&text)?))
    }
}
