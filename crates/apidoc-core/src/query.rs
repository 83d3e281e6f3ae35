//! Lookups and groupings over the normalized endpoint list.

use indexmap::IndexMap;

use crate::model::{HttpMethod, NormalizedEndpoint, NormalizedSchema, ParsedApiSpec};

/// Bucket name for endpoints that declare no tags.
pub const UNTAGGED: &str = "Untagged";

/// The endpoint whose `id` is `id`.
pub fn find_endpoint_by_id<'a>(
    endpoints: &'a [NormalizedEndpoint],
    id: &str,
) -> Option<&'a NormalizedEndpoint> {
    endpoints.iter().find(|e| e.id == id)
}

/// The endpoint registered for `method` on the exact path template `path`.
pub fn find_endpoint<'a>(
    endpoints: &'a [NormalizedEndpoint],
    method: HttpMethod,
    path: &str,
) -> Option<&'a NormalizedEndpoint> {
    endpoints
        .iter()
        .find(|e| e.method == method && e.path == path)
}

/// Endpoints carrying `tag`, in their original order.
pub fn filter_by_tag<'a>(
    endpoints: &'a [NormalizedEndpoint],
    tag: &str,
) -> Vec<&'a NormalizedEndpoint> {
    endpoints
        .iter()
        .filter(|e| e.tags.iter().any(|t| t == tag))
        .collect()
}

/// Group endpoints by tag, buckets ordered by first appearance.
///
/// An endpoint with N tags lands in N buckets; one with none lands in
/// [`UNTAGGED`].
pub fn group_by_tag(endpoints: &[NormalizedEndpoint]) -> IndexMap<String, Vec<&NormalizedEndpoint>> {
    let mut groups: IndexMap<String, Vec<&NormalizedEndpoint>> = IndexMap::new();

    for endpoint in endpoints {
        if endpoint.tags.is_empty() {
            groups.entry(UNTAGGED.to_string()).or_default().push(endpoint);
        } else {
            for tag in &endpoint.tags {
                groups.entry(tag.clone()).or_default().push(endpoint);
            }
        }
    }

    groups
}

/// Group endpoints by the first literal path segment, e.g. `/pets/{id}` → `pets`.
pub fn group_by_path_prefix(
    endpoints: &[NormalizedEndpoint],
) -> IndexMap<String, Vec<&NormalizedEndpoint>> {
    let mut groups: IndexMap<String, Vec<&NormalizedEndpoint>> = IndexMap::new();
    for endpoint in endpoints {
        groups
            .entry(extract_path_prefix(&endpoint.path))
            .or_default()
            .push(endpoint);
    }
    groups
}

/// Every tag name: declared tags in declaration order, then undeclared tags in
/// the order endpoints first use them.
pub fn collect_tags(spec: &ParsedApiSpec) -> Vec<String> {
    let mut tags: Vec<String> = spec.tags.iter().map(|t| t.name.clone()).collect();
    for endpoint in &spec.endpoints {
        for tag in &endpoint.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

/// A component schema by name.
pub fn find_schema<'a>(spec: &'a ParsedApiSpec, name: &str) -> Option<&'a NormalizedSchema> {
    spec.schemas.get(name)
}

/// Number of endpoints per method, in the fixed method order. Methods with no
/// endpoints are omitted.
pub fn count_by_method(endpoints: &[NormalizedEndpoint]) -> IndexMap<HttpMethod, usize> {
    let mut counts = IndexMap::new();
    for method in HttpMethod::ALL {
        let n = endpoints.iter().filter(|e| e.method == method).count();
        if n > 0 {
            counts.insert(method, n);
        }
    }
    counts
}

/// Extract the first meaningful path segment as a group name.
/// e.g. "/pets/{petId}" → "pets", "/store/inventory" → "store"
fn extract_path_prefix(path: &str) -> String {
    path.split('/')
        .find(|s| !s.is_empty() && !s.starts_with('{'))
        .unwrap_or("default")
        .to_string()
}
