//! Executes requests against the operations of a normalized spec.

pub mod auth;
pub mod body;
pub mod response;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use apidoc_core::config::ExecutionConfig;
use apidoc_core::error::LookupError;
use apidoc_core::model::{HttpMethod, NormalizedEndpoint, ParsedApiSpec};
use apidoc_core::query;
use apidoc_core::request::{self, ParamMap};
use futures::future::{AbortHandle, Abortable};
use indexmap::IndexMap;
use log::{debug, warn};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use crate::error::ExecuteError;

pub use auth::SecurityConfig;
pub use body::RequestBody;
pub use response::{ExecutionResponse, ResponseData};

/// Rewrites a request right before it is sent.
pub type RequestInterceptor = Arc<dyn Fn(PreparedRequest) -> PreparedRequest + Send + Sync>;
/// Transforms a successful response before it is returned.
pub type ResponseInterceptor = Arc<dyn Fn(ExecutionResponse) -> ExecutionResponse + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    /// Overrides the spec's first server.
    pub base_url: Option<String>,
    /// Sent with every request; per-call headers win on conflict.
    pub headers: IndexMap<String, String>,
    pub timeout: Option<Duration>,
    pub security: Option<SecurityConfig>,
}

impl ExecutorConfig {
    pub fn from_settings(settings: &ExecutionConfig) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            headers: settings.headers.clone(),
            timeout: settings.timeout(),
            security: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = Some(security);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Per-call inputs.
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub path_params: ParamMap,
    pub query_params: ParamMap,
    pub headers: IndexMap<String, String>,
    pub body: Option<Value>,
    /// Defaults to the endpoint's preferred request media type, then JSON.
    pub content_type: Option<String>,
}

impl RequestParams {
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

/// A fully resolved request, as handed to the request interceptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Option<RequestBody>,
}

/// Outcome of the calls made so far.
#[derive(Debug, Clone, Default)]
pub struct ExecutorState {
    pub loading: bool,
    pub last_error: Option<String>,
    pub last_response: Option<ExecutionResponse>,
}

#[derive(Default)]
struct Tracking {
    in_flight: Vec<(u64, AbortHandle)>,
    state: ExecutorState,
}

pub struct RequestExecutor {
    client: reqwest::Client,
    config: ExecutorConfig,
    spec: Option<Arc<ParsedApiSpec>>,
    request_interceptor: Option<RequestInterceptor>,
    response_interceptor: Option<ResponseInterceptor>,
    next_call: AtomicU64,
    tracking: Mutex<Tracking>,
}

impl RequestExecutor {
    pub fn new(config: ExecutorConfig) -> Result<Self, ExecuteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config))
    }

    pub fn with_client(client: reqwest::Client, config: ExecutorConfig) -> Self {
        Self {
            client,
            config,
            spec: None,
            request_interceptor: None,
            response_interceptor: None,
            next_call: AtomicU64::new(0),
            tracking: Mutex::new(Tracking::default()),
        }
    }

    /// Use `spec`'s first server when no base URL is configured.
    pub fn with_spec(mut self, spec: Arc<ParsedApiSpec>) -> Self {
        self.spec = Some(spec);
        self
    }

    pub fn on_request<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(PreparedRequest) -> PreparedRequest + Send + Sync + 'static,
    {
        self.request_interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn on_response<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(ExecutionResponse) -> ExecutionResponse + Send + Sync + 'static,
    {
        self.response_interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn state(&self) -> ExecutorState {
        self.tracking().state.clone()
    }

    /// Number of calls currently running.
    pub fn in_flight(&self) -> usize {
        self.tracking().in_flight.len()
    }

    /// Abort the most recently started call that is still running. Returns
    /// whether there was one.
    pub fn cancel(&self) -> bool {
        match self.tracking().in_flight.pop() {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Look up `operation_id` in `spec` and execute it, falling back to that
    /// spec's servers for the base URL.
    pub async fn execute_operation(
        &self,
        spec: &ParsedApiSpec,
        operation_id: &str,
        params: RequestParams,
    ) -> Result<ExecutionResponse, ExecuteError> {
        let endpoint = query::find_endpoint_by_id(&spec.endpoints, operation_id)
            .ok_or_else(|| LookupError::UnknownOperation(operation_id.to_string()))?;
        self.run_tracked(spec.default_server_url(), endpoint, params)
            .await
    }

    pub async fn execute(
        &self,
        endpoint: &NormalizedEndpoint,
        params: RequestParams,
    ) -> Result<ExecutionResponse, ExecuteError> {
        let fallback = self.spec.as_deref().and_then(ParsedApiSpec::default_server_url);
        self.run_tracked(fallback, endpoint, params).await
    }

    /// Resolve URL, headers and body without sending anything.
    pub fn prepare(
        &self,
        endpoint: &NormalizedEndpoint,
        params: RequestParams,
    ) -> Result<PreparedRequest, ExecuteError> {
        let fallback = self.spec.as_deref().and_then(ParsedApiSpec::default_server_url);
        self.prepare_with(fallback, endpoint, params)
    }

    fn prepare_with(
        &self,
        fallback_base: Option<&str>,
        endpoint: &NormalizedEndpoint,
        params: RequestParams,
    ) -> Result<PreparedRequest, ExecuteError> {
        let base = self
            .config
            .base_url
            .as_deref()
            .or(fallback_base)
            .ok_or(ExecuteError::NoBaseUrl)?;

        let mut headers = self.config.headers.clone();
        for (name, value) in params.headers {
            auth::set_header(&mut headers, &name, value);
        }
        let mut query = params.query_params;
        if let Some(security) = &self.config.security {
            security.apply(&mut headers, &mut query);
        }

        let url = request::build_url(base, &endpoint.path, &params.path_params, &query);
        if let Err(source) = url::Url::parse(&url) {
            return Err(ExecuteError::InvalidUrl { url, source });
        }

        let body = match params.body {
            Some(value) => {
                let content_type = params
                    .content_type
                    .or_else(|| declared_content_type(endpoint))
                    .unwrap_or_else(|| body::JSON.to_string());
                let body = RequestBody::encode(&content_type, value)?;
                if body.sets_own_content_type() {
                    headers.retain(|k, _| !k.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
                } else {
                    auth::set_header(&mut headers, CONTENT_TYPE.as_str(), content_type);
                }
                Some(body)
            }
            None => None,
        };

        Ok(PreparedRequest {
            method: endpoint.method,
            url,
            headers,
            body,
        })
    }

    async fn run_tracked(
        &self,
        fallback_base: Option<&str>,
        endpoint: &NormalizedEndpoint,
        params: RequestParams,
    ) -> Result<ExecutionResponse, ExecuteError> {
        let call = self.next_call.fetch_add(1, Ordering::Relaxed);
        let (handle, registration) = AbortHandle::new_pair();
        let guard = InFlightGuard::register(&self.tracking, call, handle);

        let outcome = Abortable::new(self.run(fallback_base, endpoint, params), registration).await;
        drop(guard);

        let mut tracking = self.tracking();
        match outcome {
            Ok(Ok(response)) => {
                tracking.state.last_error = None;
                tracking.state.last_response = Some(response.clone());
                Ok(response)
            }
            Ok(Err(err)) => {
                warn!("{} failed: {err}", endpoint.label());
                tracking.state.last_error = Some(err.to_string());
                Err(err)
            }
            Err(_aborted) => {
                debug!("{} aborted", endpoint.label());
                Err(ExecuteError::Aborted)
            }
        }
    }

    async fn run(
        &self,
        fallback_base: Option<&str>,
        endpoint: &NormalizedEndpoint,
        params: RequestParams,
    ) -> Result<ExecutionResponse, ExecuteError> {
        let mut prepared = self.prepare_with(fallback_base, endpoint, params)?;
        if let Some(intercept) = &self.request_interceptor {
            prepared = intercept(prepared);
        }
        debug!("{} {}", prepared.method, prepared.url);

        let mut builder = self
            .client
            .request(to_reqwest_method(prepared.method), &prepared.url)
            .headers(header_map(&prepared.headers)?);
        if let Some(body) = prepared.body {
            builder = body.into_reqwest(builder)?;
        }

        let started = Instant::now();
        let raw = builder.send().await?;
        let response = ExecutionResponse::read(raw, started.elapsed()).await?;

        if !response.is_success() {
            return Err(ExecuteError::Http {
                status: response.status,
                message: response.error_message(),
                response: Box::new(response),
            });
        }

        Ok(match &self.response_interceptor {
            Some(intercept) => intercept(response),
            None => response,
        })
    }

    fn tracking(&self) -> MutexGuard<'_, Tracking> {
        self.tracking.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a call registered in `in_flight` for as long as its future is alive,
/// so a dropped `execute` future (timeout, `select!`) is unregistered too.
struct InFlightGuard<'a> {
    tracking: &'a Mutex<Tracking>,
    call: u64,
}

impl<'a> InFlightGuard<'a> {
    fn register(tracking: &'a Mutex<Tracking>, call: u64, handle: AbortHandle) -> Self {
        let mut state = tracking.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight.push((call, handle));
        state.state.loading = true;
        Self { tracking, call }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.tracking.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight.retain(|(id, _)| *id != self.call);
        state.state.loading = !state.in_flight.is_empty();
    }
}

fn declared_content_type(endpoint: &NormalizedEndpoint) -> Option<String> {
    endpoint
        .request_body
        .as_ref()?
        .preferred_content()
        .map(|mt| mt.media_type.clone())
}

fn header_map(headers: &IndexMap<String, String>) -> Result<HeaderMap, ExecuteError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ExecuteError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ExecuteError::InvalidHeader(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Trace => Method::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidoc_core::normalize_str;
    use serde_json::json;

    const SPEC: &str = r#"
openapi: 3.0.0
info: { title: Users, version: "1" }
servers:
  - url: https://api.example.com
paths:
  /users/{id}:
    get:
      operationId: getUser
      responses: { "200": { description: OK } }
  /users:
    post:
      operationId: createUser
      requestBody:
        content:
          application/x-www-form-urlencoded:
            schema: { type: object }
      responses: { "201": { description: Created } }
"#;

    fn spec() -> Arc<ParsedApiSpec> {
        Arc::new(normalize_str(SPEC).unwrap())
    }

    fn endpoint(id: &str) -> NormalizedEndpoint {
        query::find_endpoint_by_id(&spec().endpoints, id)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_prepare_uses_first_server() {
        let executor = RequestExecutor::new(ExecutorConfig::default())
            .unwrap()
            .with_spec(spec());
        let prepared = executor
            .prepare(&endpoint("getUser"), RequestParams::default().path_param("id", "123"))
            .unwrap();
        assert_eq!(prepared.url, "https://api.example.com/users/123");
        assert_eq!(prepared.method, HttpMethod::Get);
        assert!(prepared.body.is_none());
    }

    #[test]
    fn test_prepare_without_base_url() {
        let executor = RequestExecutor::new(ExecutorConfig::default()).unwrap();
        assert!(matches!(
            executor.prepare(&endpoint("getUser"), RequestParams::default()),
            Err(ExecuteError::NoBaseUrl)
        ));
    }

    #[test]
    fn test_prepare_header_precedence() {
        let config = ExecutorConfig::default()
            .with_base_url("https://override.example.com/v2")
            .with_header("X-Client", "default")
            .with_header("Authorization", "from-defaults")
            .with_security(SecurityConfig::Bearer {
                token: "t0k".to_string(),
            });
        let executor = RequestExecutor::new(config).unwrap().with_spec(spec());
        let params = RequestParams::default()
            .path_param("id", 7)
            .header("x-client", "per-call")
            .header("Authorization", "from-call");
        let prepared = executor.prepare(&endpoint("getUser"), params).unwrap();

        assert_eq!(prepared.url, "https://override.example.com/v2/users/7");
        assert_eq!(prepared.headers["x-client"], "per-call");
        assert_eq!(prepared.headers["authorization"], "Bearer t0k");
        assert_eq!(prepared.headers.len(), 2);
    }

    #[test]
    fn test_prepare_uses_declared_content_type() {
        let executor = RequestExecutor::new(ExecutorConfig::default())
            .unwrap()
            .with_spec(spec());
        let prepared = executor
            .prepare(
                &endpoint("createUser"),
                RequestParams::default().body(json!({"name": "Ada"})),
            )
            .unwrap();
        assert_eq!(
            prepared.headers["content-type"],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(
            prepared.body,
            Some(RequestBody::Form(vec![("name".to_string(), "Ada".to_string())]))
        );
    }

    #[test]
    fn test_cancel_without_calls() {
        let executor = RequestExecutor::new(ExecutorConfig::default()).unwrap();
        assert!(!executor.cancel());
        assert!(!executor.state().loading);
    }
}
