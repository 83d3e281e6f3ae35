use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::Value;

use apidoc_core::config::{self, ApidocConfig, CONFIG_FILE_NAME};
use apidoc_core::model::{HttpMethod, ParsedApiSpec};
use apidoc_core::parse::security::ApiKeyLocation;
use apidoc_core::query;
use apidoc_core::request::ParamMap;
use apidoc_core::search::{self, SearchField, SearchFilters, SearchOptions};
use apidoc_http::{
    ExecuteError, ExecutorConfig, LoadConfig, RequestExecutor, RequestParams, ResponseData,
    SecurityConfig, SpecCache, SpecInput, SpecLoader,
};
use apidoc_snippets::{SnippetAuth, SnippetOptions};

#[derive(Parser)]
#[command(name = "apidoc", about = "Inspect, search and call OpenAPI 3.x APIs", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of the normalized spec
    Inspect {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Check that a spec parses and normalizes
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Search endpoints
    Search {
        #[command(flatten)]
        source: SourceArgs,

        /// Text to match against summaries, ids, paths, descriptions, tags,
        /// parameters and responses
        #[arg(default_value = "")]
        query: String,

        /// Only these HTTP methods
        #[arg(short, long = "method")]
        methods: Vec<HttpMethod>,

        /// Only endpoints carrying one of these tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Only endpoints declaring one of these response codes
        #[arg(long = "status")]
        response_codes: Vec<String>,

        /// Only deprecated (true) or non-deprecated (false) endpoints
        #[arg(long)]
        deprecated: Option<bool>,

        /// Restrict matching to these fields
        #[arg(long = "field")]
        fields: Vec<SearchField>,

        /// Substring matching only
        #[arg(long)]
        exact: bool,

        #[arg(long)]
        case_sensitive: bool,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print an example request for an operation
    Snippet {
        #[command(flatten)]
        source: SourceArgs,

        /// Operation id
        operation: String,

        /// Target language (curl, javascript, typescript, python, node, php, java, go)
        #[arg(short, long)]
        language: Option<String>,

        /// Print every language
        #[arg(long, conflicts_with = "language")]
        all: bool,

        /// Authentication shown in the snippet, with placeholder credentials
        #[arg(long)]
        auth: Option<SnippetAuthKind>,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Send a request for an operation and print the response
    Call {
        #[command(flatten)]
        source: SourceArgs,

        /// Operation id
        operation: String,

        /// Bearer token
        #[arg(long, conflicts_with_all = ["basic", "api_key"])]
        bearer: Option<String>,

        /// Basic credentials as user:password
        #[arg(long, conflicts_with = "api_key")]
        basic: Option<String>,

        /// API key as name=value
        #[arg(long, value_parser = parse_key_value)]
        api_key: Option<(String, String)>,

        /// Where the API key goes
        #[arg(long, default_value = "header")]
        api_key_in: KeyLocation,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Initialize a new apidoc configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Where to read the spec from. Falls back to the `source` section of the config.
#[derive(Args)]
struct SourceArgs {
    /// Path to the OpenAPI spec file (YAML or JSON)
    #[arg(short, long, conflicts_with = "url")]
    input: Option<PathBuf>,

    /// URL of the OpenAPI spec
    #[arg(long)]
    url: Option<String>,
}

#[derive(Args)]
struct RequestArgs {
    /// Path parameter as name=value
    #[arg(short = 'p', long = "path", value_parser = parse_key_value)]
    path_params: Vec<(String, String)>,

    /// Query parameter as name=value; repeat a name to send an array
    #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
    query_params: Vec<(String, String)>,

    /// Header as name:value
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// JSON request body
    #[arg(short, long)]
    body: Option<String>,

    /// Request content type
    #[arg(long)]
    content_type: Option<String>,

    /// Base URL overriding the spec's first server
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

#[derive(Clone, ValueEnum)]
enum SnippetAuthKind {
    Bearer,
    Oauth2,
    ApiKey,
    ApiKeyQuery,
    Basic,
}

#[derive(Clone, ValueEnum)]
enum KeyLocation {
    Header,
    Query,
    Cookie,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { source, format } => cmd_inspect(source, format).await,

        Commands::Validate { source } => cmd_validate(source).await,

        Commands::Search {
            source,
            query,
            methods,
            tags,
            response_codes,
            deprecated,
            fields,
            exact,
            case_sensitive,
            limit,
        } => {
            let filters = SearchFilters {
                methods,
                tags,
                response_codes,
                deprecated,
                ..SearchFilters::default()
            };
            let mut options = SearchOptions::with_query(query);
            if !fields.is_empty() {
                options.fields = fields;
            }
            options.case_sensitive = case_sensitive;
            options.limit = limit;
            cmd_search(source, filters, options, exact).await
        }

        Commands::Snippet {
            source,
            operation,
            language,
            all,
            auth,
            request,
        } => cmd_snippet(source, operation, language, all, auth, request).await,

        Commands::Call {
            source,
            operation,
            bearer,
            basic,
            api_key,
            api_key_in,
            request,
        } => {
            let security = security_config(bearer, basic, api_key, api_key_in)?;
            cmd_call(source, operation, security, request).await
        }

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "apidoc", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ApidocConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

/// Load and normalize the spec named on the command line or in the config.
async fn load_spec(source: &SourceArgs, cfg: &ApidocConfig) -> Result<Arc<ParsedApiSpec>> {
    let input = match (&source.input, &source.url) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(_)) => None,
        (None, None) => cfg.source.file.as_ref().map(PathBuf::from),
    };
    let url = source.url.clone().or_else(|| cfg.source.url.clone());

    let load = match (input, url) {
        (Some(path), _) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            LoadConfig::inline(SpecInput::Text(content))
        }
        (None, Some(url)) => LoadConfig::url(url).with_settings(&cfg.loader),
        (None, None) => anyhow::bail!(
            "no spec given. Pass --input or --url, or set `source` in {CONFIG_FILE_NAME}."
        ),
    };

    let loader = SpecLoader::new().with_cache(Arc::new(SpecCache::new(cfg.loader.cache_ttl())));
    loader.load_spec(load).await.context("failed to load spec")
}

async fn cmd_inspect(source: SourceArgs, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let spec = load_spec(&source, &cfg).await?;

    let summary = build_inspect_summary(&spec);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(spec: &ParsedApiSpec) -> Value {
    let groups: serde_json::Map<String, Value> = query::group_by_tag(&spec.endpoints)
        .into_iter()
        .map(|(tag, endpoints)| {
            let endpoints: Vec<Value> = endpoints
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "id": e.id,
                        "method": e.method.as_str(),
                        "path": e.path,
                        "summary": e.summary,
                        "deprecated": e.deprecated,
                    })
                })
                .collect();
            (tag, Value::Array(endpoints))
        })
        .collect();

    let methods: serde_json::Map<String, Value> = query::count_by_method(&spec.endpoints)
        .into_iter()
        .map(|(method, count)| (method.as_str().to_string(), Value::from(count)))
        .collect();

    serde_json::json!({
        "info": {
            "title": spec.info.title,
            "version": spec.info.version,
            "openapi": spec.openapi,
        },
        "servers": spec.servers.iter().map(|s| &s.url).collect::<Vec<_>>(),
        "tags": query::collect_tags(spec),
        "methods": methods,
        "endpoints": groups,
        "schemas": spec.schemas.keys().collect::<Vec<_>>(),
        "security_schemes": spec.security_schemes.keys().collect::<Vec<_>>(),
    })
}

async fn cmd_validate(source: SourceArgs) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let spec = load_spec(&source, &cfg).await?;

    eprintln!("Valid OpenAPI {} spec: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Endpoints: {}", spec.endpoints.len());
    eprintln!("  Schemas: {}", spec.schemas.len());
    eprintln!("  Tags: {}", query::collect_tags(&spec).len());

    let circular: Vec<&String> = spec
        .schemas
        .iter()
        .filter(|(_, s)| s.is_circular())
        .map(|(name, _)| name)
        .collect();
    if !circular.is_empty() {
        eprintln!("  Circular schemas: {}", circular.len());
    }

    eprintln!("Validation successful.");
    Ok(())
}

async fn cmd_search(
    source: SourceArgs,
    filters: SearchFilters,
    mut options: SearchOptions,
    exact: bool,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let spec = load_spec(&source, &cfg).await?;

    options.fuzzy = cfg.search.fuzzy && !exact;
    options.min_query_length = cfg.search.min_query_length;

    let results = search::search(&spec.endpoints, &filters, &options);
    if results.is_empty() {
        eprintln!("No matching endpoints.");
        return Ok(());
    }

    for result in &results {
        let e = result.endpoint;
        println!(
            "{:.2}  {:<7} {}  {}{}",
            result.score,
            e.method.as_str(),
            e.path,
            e.id,
            e.summary
                .as_deref()
                .map(|s| format!("  {s}"))
                .unwrap_or_default()
        );
    }
    eprintln!("{} result(s)", results.len());
    Ok(())
}

async fn cmd_snippet(
    source: SourceArgs,
    operation: String,
    language: Option<String>,
    all: bool,
    auth: Option<SnippetAuthKind>,
    request: RequestArgs,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let spec = load_spec(&source, &cfg).await?;

    let mut options = SnippetOptions::from_settings(&cfg.snippets);
    if let Some(language) = language {
        options.language = language;
    }
    if let Some(base_url) = request.base_url.clone() {
        options.base_url = Some(base_url);
    }
    options.auth = auth.map(|kind| match kind {
        SnippetAuthKind::Bearer => SnippetAuth::bearer(),
        SnippetAuthKind::Oauth2 => SnippetAuth::OAuth2 { token: None },
        SnippetAuthKind::ApiKey => SnippetAuth::api_key(ApiKeyLocation::Header),
        SnippetAuthKind::ApiKeyQuery => SnippetAuth::api_key(ApiKeyLocation::Query),
        SnippetAuthKind::Basic => SnippetAuth::basic(),
    });
    options.path_params = param_map(&request.path_params);
    options.query_params = param_map(&request.query_params);
    options.headers = request.headers.iter().cloned().collect();
    options.body = request.body.as_deref().map(parse_body).transpose()?;
    options.content_type = request.content_type.clone();

    if all {
        let endpoint = query::find_endpoint_by_id(&spec.endpoints, &operation)
            .with_context(|| format!("no endpoint with operation id '{operation}'"))?;
        if options.base_url.is_none() {
            options.base_url = spec.default_server_url().map(str::to_string);
        }
        for snippet in apidoc_snippets::generate_all(endpoint, &options) {
            println!("# {}\n", snippet.description);
            println!("{}", snippet.code);
        }
        return Ok(());
    }

    let snippet = apidoc_snippets::generate_for_operation(&spec, &operation, &options)?;
    print!("{}", snippet.code);
    Ok(())
}

async fn cmd_call(
    source: SourceArgs,
    operation: String,
    security: Option<SecurityConfig>,
    request: RequestArgs,
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let spec = load_spec(&source, &cfg).await?;

    let mut config = ExecutorConfig::from_settings(&cfg.execution);
    if let Some(base_url) = request.base_url.clone() {
        config.base_url = Some(base_url);
    }
    config.security = security;
    let executor = RequestExecutor::new(config)?.with_spec(Arc::clone(&spec));

    let params = RequestParams {
        path_params: param_map(&request.path_params),
        query_params: param_map(&request.query_params),
        headers: request.headers.iter().cloned().collect(),
        body: request.body.as_deref().map(parse_body).transpose()?,
        content_type: request.content_type.clone(),
    };

    let response = match executor.execute_operation(&spec, &operation, params).await {
        Ok(response) => response,
        Err(ExecuteError::Http {
            message, response, ..
        }) => {
            print_body(&response.data)?;
            anyhow::bail!(message);
        }
        Err(err) => return Err(err.into()),
    };

    eprintln!(
        "{} {} ({} ms)",
        response.status,
        response.status_text,
        response.duration.as_millis()
    );
    print_body(&response.data)
}

fn print_body(data: &ResponseData) -> Result<()> {
    match data {
        ResponseData::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
        ResponseData::Text(text) => println!("{text}"),
        ResponseData::Binary(bytes) => eprintln!("<{} bytes of binary data>", bytes.len()),
    }
    Ok(())
}

fn security_config(
    bearer: Option<String>,
    basic: Option<String>,
    api_key: Option<(String, String)>,
    location: KeyLocation,
) -> Result<Option<SecurityConfig>> {
    if let Some(token) = bearer {
        return Ok(Some(SecurityConfig::Bearer { token }));
    }
    if let Some(credentials) = basic {
        let (username, password) = credentials
            .split_once(':')
            .context("--basic expects user:password")?;
        return Ok(Some(SecurityConfig::Basic {
            username: username.to_string(),
            password: password.to_string(),
        }));
    }
    Ok(api_key.map(|(name, value)| SecurityConfig::ApiKey {
        name,
        location: match location {
            KeyLocation::Header => ApiKeyLocation::Header,
            KeyLocation::Query => ApiKeyLocation::Query,
            KeyLocation::Cookie => ApiKeyLocation::Cookie,
        },
        value,
    }))
}

fn parse_body(body: &str) -> Result<Value> {
    serde_json::from_str(body).context("--body must be valid JSON")
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{s}'"))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected name:value, got '{s}'"))
}

/// Collect `name=value` pairs; a repeated name becomes an array.
fn param_map(pairs: &[(String, String)]) -> ParamMap {
    let mut map = ParamMap::new();
    for (name, value) in pairs {
        let value = Value::String(value.clone());
        match map.get_mut(name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => *existing = Value::Array(vec![existing.take(), value]),
            None => {
                map.insert(name.clone(), value);
            }
        }
    }
    map
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
