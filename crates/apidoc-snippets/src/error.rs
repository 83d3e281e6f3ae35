use apidoc_core::error::LookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
