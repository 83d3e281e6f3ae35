use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{LookupError, UsageError};
use crate::model::{NormalizedEndpoint, ParsedApiSpec};
use crate::query;

/// Shared holder of the currently loaded spec.
///
/// Cloning is cheap; clones observe the same spec.
#[derive(Debug, Clone, Default)]
pub struct SpecContext {
    inner: Arc<RwLock<Option<Arc<ParsedApiSpec>>>>,
}

impl SpecContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(spec: Arc<ParsedApiSpec>) -> Self {
        let context = Self::new();
        context.set(spec);
        context
    }

    pub fn set(&self, spec: Arc<ParsedApiSpec>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(spec);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The loaded spec. Fails fast when nothing has been provided yet.
    pub fn spec(&self) -> Result<Arc<ParsedApiSpec>, UsageError> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(UsageError::NoSpecLoaded)
    }

    pub fn endpoints(&self) -> Result<Vec<NormalizedEndpoint>, UsageError> {
        Ok(self.spec()?.endpoints.clone())
    }

    pub fn endpoint(&self, id: &str) -> Result<NormalizedEndpoint, ContextError> {
        let spec = self.spec()?;
        query::find_endpoint_by_id(&spec.endpoints, id)
            .cloned()
            .ok_or_else(|| LookupError::UnknownOperation(id.to_string()).into())
    }
}

/// Failure of a context accessor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
