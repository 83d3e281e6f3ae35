use std::sync::Arc;

use super::{Ranked, SearchFilters, SearchOptions, SearchResult, rank};
use crate::model::{HttpMethod, ParsedApiSpec};
use crate::query;

/// Search state bound to one spec. Results are recomputed whenever the spec,
/// the filters or the options are replaced.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    spec: Option<Arc<ParsedApiSpec>>,
    filters: SearchFilters,
    options: SearchOptions,
    ranked: Vec<Ranked>,
}

impl SearchIndex {
    pub fn new(spec: Arc<ParsedApiSpec>) -> Self {
        let mut index = Self::default();
        index.set_spec(Some(spec));
        index
    }

    pub fn spec(&self) -> Option<&Arc<ParsedApiSpec>> {
        self.spec.as_ref()
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn set_spec(&mut self, spec: Option<Arc<ParsedApiSpec>>) {
        self.spec = spec;
        self.recompute();
    }

    pub fn set_filters(&mut self, filters: SearchFilters) {
        self.filters = filters;
        self.recompute();
    }

    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
        self.recompute();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.options.query = query.into();
        self.recompute();
    }

    /// Reset filters and query, keeping the other options.
    pub fn clear(&mut self) {
        self.filters = SearchFilters::default();
        self.options.query.clear();
        self.recompute();
    }

    pub fn results(&self) -> Vec<SearchResult<'_>> {
        let Some(spec) = &self.spec else {
            return Vec::new();
        };
        self.ranked
            .iter()
            .map(|r| SearchResult {
                endpoint: &spec.endpoints[r.index],
                score: r.score,
                matched_fields: r.matched_fields.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Tags of the spec whose name contains `prefix`, case-insensitively.
    pub fn suggest_tags(&self, prefix: &str) -> Vec<String> {
        let Some(spec) = &self.spec else {
            return Vec::new();
        };
        let needle = prefix.to_lowercase();
        query::collect_tags(spec)
            .into_iter()
            .filter(|t| t.to_lowercase().contains(&needle))
            .collect()
    }

    /// Methods used by at least one endpoint, in the fixed method order.
    pub fn available_methods(&self) -> Vec<HttpMethod> {
        match &self.spec {
            Some(spec) => query::count_by_method(&spec.endpoints)
                .into_keys()
                .collect(),
            None => Vec::new(),
        }
    }

    fn recompute(&mut self) {
        self.ranked = match &self.spec {
            Some(spec) => rank(&spec.endpoints, &self.filters, &self.options),
            None => Vec::new(),
        };
        log::debug!("search index holds {} results", self.ranked.len());
    }
}
