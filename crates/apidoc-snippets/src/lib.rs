//! Example requests for API endpoints, rendered as code in eight languages.

pub mod emitters;
pub mod error;
pub mod generator;
pub mod language;
pub mod options;
pub mod request;

use apidoc_core::error::LookupError;
use apidoc_core::model::{NormalizedEndpoint, ParsedApiSpec};
use apidoc_core::query::find_endpoint_by_id;
use log::debug;
use serde::Serialize;

pub use error::SnippetError;
pub use generator::{SnippetGenerator, generator_for};
pub use language::SnippetLanguage;
pub use options::{DEFAULT_BASE_URL, SnippetAuth, SnippetOptions};
pub use request::{SnippetBody, SnippetRequest};

/// A rendered snippet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeSnippet {
    pub code: String,
    pub language: SnippetLanguage,
    pub description: String,
}

/// Render `endpoint` in the language named by `options.language`.
pub fn generate(
    endpoint: &NormalizedEndpoint,
    options: &SnippetOptions,
) -> Result<CodeSnippet, SnippetError> {
    let language = options.language.parse()?;
    let base_url = options.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    Ok(render(endpoint, options, language, base_url))
}

/// Like [`generate`], looking the endpoint up by id. Without an explicit base
/// URL the spec's first server is used.
pub fn generate_for_operation(
    spec: &ParsedApiSpec,
    id: &str,
    options: &SnippetOptions,
) -> Result<CodeSnippet, SnippetError> {
    let language = options.language.parse()?;
    let endpoint = find_endpoint_by_id(&spec.endpoints, id)
        .ok_or_else(|| LookupError::UnknownOperation(id.to_string()))?;
    let base_url = options
        .base_url
        .as_deref()
        .or(spec.default_server_url())
        .unwrap_or(DEFAULT_BASE_URL);
    Ok(render(endpoint, options, language, base_url))
}

/// One snippet per supported language, in [`SnippetLanguage::ALL`] order.
/// `options.language` is ignored.
pub fn generate_all(endpoint: &NormalizedEndpoint, options: &SnippetOptions) -> Vec<CodeSnippet> {
    let base_url = options.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    SnippetLanguage::ALL
        .into_iter()
        .map(|language| render(endpoint, options, language, base_url))
        .collect()
}

fn render(
    endpoint: &NormalizedEndpoint,
    options: &SnippetOptions,
    language: SnippetLanguage,
    base_url: &str,
) -> CodeSnippet {
    debug!("rendering {language} snippet for {}", endpoint.label());
    let request = SnippetRequest::build(endpoint, options, base_url);
    CodeSnippet {
        code: generator_for(language).render(&request),
        language,
        description: format!("{} request for {}", language.display_name(), endpoint.label()),
    }
}
