//! Filtering and scored text search over normalized endpoints.

pub mod filter;
pub mod index;
pub mod scoring;

use serde::{Deserialize, Serialize};

use crate::model::NormalizedEndpoint;

pub use filter::SearchFilters;
pub use index::SearchIndex;
pub use scoring::SearchField;

/// How the text query is matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub query: String,
    pub fields: Vec<SearchField>,
    pub fuzzy: bool,
    pub min_query_length: usize,
    pub case_sensitive: bool,
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: String::new(),
            fields: SearchField::ALL.to_vec(),
            fuzzy: true,
            min_query_length: 1,
            case_sensitive: false,
            limit: None,
        }
    }
}

impl SearchOptions {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// The trimmed query when long enough to trigger text matching.
    fn active_query(&self) -> Option<String> {
        let trimmed = self.query.trim();
        if trimmed.is_empty() || trimmed.chars().count() < self.min_query_length {
            return None;
        }
        Some(if self.case_sensitive {
            trimmed.to_string()
        } else {
            trimmed.to_lowercase()
        })
    }
}

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<'a> {
    pub endpoint: &'a NormalizedEndpoint,
    pub score: f64,
    pub matched_fields: Vec<SearchField>,
}

/// Apply `filters`, then rank the survivors against the query in `options`.
///
/// Without an active query every surviving endpoint is returned with score 1.0
/// in its original order.
pub fn search<'a>(
    endpoints: &'a [NormalizedEndpoint],
    filters: &SearchFilters,
    options: &SearchOptions,
) -> Vec<SearchResult<'a>> {
    rank(endpoints, filters, options)
        .into_iter()
        .map(|r| SearchResult {
            endpoint: &endpoints[r.index],
            score: r.score,
            matched_fields: r.matched_fields,
        })
        .collect()
}

/// A hit addressed by its position in the endpoint slice.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Ranked {
    pub index: usize,
    pub score: f64,
    pub matched_fields: Vec<SearchField>,
}

pub(crate) fn rank(
    endpoints: &[NormalizedEndpoint],
    filters: &SearchFilters,
    options: &SearchOptions,
) -> Vec<Ranked> {
    let candidates = endpoints
        .iter()
        .enumerate()
        .filter(|(_, e)| filters.matches(e));

    let mut ranked: Vec<Ranked> = match options.active_query() {
        None => candidates
            .map(|(index, _)| Ranked {
                index,
                score: 1.0,
                matched_fields: Vec::new(),
            })
            .collect(),
        Some(query) => {
            let mut scored: Vec<Ranked> = candidates
                .filter_map(|(index, endpoint)| score_endpoint(index, endpoint, &query, options))
                .collect();
            // sort_by is stable, equal scores keep endpoint order
            scored.sort_by(|a, b| b.score.total_cmp(&a.score));
            scored
        }
    };

    if let Some(limit) = options.limit {
        ranked.truncate(limit);
    }
    ranked
}

fn score_endpoint(
    index: usize,
    endpoint: &NormalizedEndpoint,
    query: &str,
    options: &SearchOptions,
) -> Option<Ranked> {
    let mut matches = Vec::new();
    for field in &options.fields {
        let text = field.text(endpoint);
        let text = if options.case_sensitive {
            text
        } else {
            text.to_lowercase()
        };
        let score = scoring::field_score(&text, query, options.fuzzy);
        if score > 0.0 {
            matches.push((*field, score));
        }
    }
    if matches.is_empty() {
        return None;
    }
    Some(Ranked {
        index,
        score: scoring::aggregate_score(&matches),
        matched_fields: matches.into_iter().map(|(f, _)| f).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, NormalizedParameter, NormalizedResponse};
    use crate::parse::parameter::ParameterLocation;

    fn endpoint(id: &str, method: HttpMethod, path: &str, summary: &str) -> NormalizedEndpoint {
        NormalizedEndpoint {
            id: id.to_string(),
            operation_id: Some(id.to_string()),
            method,
            path: path.to_string(),
            summary: Some(summary.to_string()),
            description: None,
            tags: Vec::new(),
            deprecated: false,
            parameters: Vec::new(),
            request_body: None,
            responses: vec![NormalizedResponse {
                status_code: "200".to_string(),
                description: "OK".to_string(),
                content: Vec::new(),
                headers: Vec::new(),
            }],
            security: Vec::new(),
        }
    }

    fn sample() -> Vec<NormalizedEndpoint> {
        let mut list = endpoint("listUsers", HttpMethod::Get, "/users", "List users");
        list.tags = vec!["users".to_string()];
        list.parameters.push(NormalizedParameter {
            name: "limit".to_string(),
            location: ParameterLocation::Query,
            description: Some("Page size".to_string()),
            required: false,
            deprecated: false,
            schema: None,
            example: None,
            style: None,
            explode: None,
        });

        let mut create = endpoint("createUser", HttpMethod::Post, "/users", "Create a user");
        create.tags = vec!["users".to_string(), "admin".to_string()];

        let mut legacy = endpoint("getPet", HttpMethod::Get, "/pets/{id}", "Fetch a pet");
        legacy.deprecated = true;
        legacy.responses.push(NormalizedResponse {
            status_code: "404".to_string(),
            description: "Not found".to_string(),
            content: Vec::new(),
            headers: Vec::new(),
        });

        vec![list, create, legacy]
    }

    fn ids<'a>(results: &'a [SearchResult<'_>]) -> Vec<&'a str> {
        results.iter().map(|r| r.endpoint.id.as_str()).collect()
    }

    #[test]
    fn test_no_query_returns_filtered_in_order() {
        let endpoints = sample();
        let results = search(&endpoints, &SearchFilters::default(), &SearchOptions::default());
        assert_eq!(ids(&results), ["listUsers", "createUser", "getPet"]);
        assert!(results.iter().all(|r| r.score == 1.0 && r.matched_fields.is_empty()));
    }

    #[test]
    fn test_whitespace_query_is_inactive() {
        let endpoints = sample();
        let results = search(
            &endpoints,
            &SearchFilters::default(),
            &SearchOptions::with_query("   "),
        );
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_min_query_length() {
        let endpoints = sample();
        let options = SearchOptions {
            min_query_length: 3,
            ..SearchOptions::with_query("pe")
        };
        let results = search(&endpoints, &SearchFilters::default(), &options);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.matched_fields.is_empty()));
    }

    #[test]
    fn test_filters_combine() {
        let endpoints = sample();
        let filters = SearchFilters {
            methods: vec![HttpMethod::Get],
            tags: vec!["users".to_string()],
            ..SearchFilters::default()
        };
        let results = search(&endpoints, &filters, &SearchOptions::default());
        assert_eq!(ids(&results), ["listUsers"]);

        let filters = SearchFilters {
            deprecated: Some(true),
            ..SearchFilters::default()
        };
        assert_eq!(
            ids(&search(&endpoints, &filters, &SearchOptions::default())),
            ["getPet"]
        );

        let filters = SearchFilters {
            has_parameters: Some(true),
            ..SearchFilters::default()
        };
        assert_eq!(
            ids(&search(&endpoints, &filters, &SearchOptions::default())),
            ["listUsers"]
        );

        let filters = SearchFilters {
            response_codes: vec!["404".to_string()],
            ..SearchFilters::default()
        };
        assert_eq!(
            ids(&search(&endpoints, &filters, &SearchOptions::default())),
            ["getPet"]
        );
    }

    #[test]
    fn test_scores_descending() {
        let endpoints = sample();
        let results = search(
            &endpoints,
            &SearchFilters::default(),
            &SearchOptions::with_query("user"),
        );
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.score)));
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let endpoints = sample();
        let results = search(
            &endpoints,
            &SearchFilters::default(),
            &SearchOptions::with_query("LIST"),
        );
        assert_eq!(results[0].endpoint.id, "listUsers");
        assert!(results[0].matched_fields.contains(&SearchField::Summary));
    }

    #[test]
    fn test_case_sensitive_exact() {
        let endpoints = sample();
        let options = SearchOptions {
            case_sensitive: true,
            fuzzy: false,
            ..SearchOptions::with_query("LIST")
        };
        assert!(search(&endpoints, &SearchFilters::default(), &options).is_empty());
    }

    #[test]
    fn test_restricted_fields() {
        let endpoints = sample();
        let options = SearchOptions {
            fields: vec![SearchField::Parameters],
            fuzzy: false,
            ..SearchOptions::with_query("page size")
        };
        let results = search(&endpoints, &SearchFilters::default(), &options);
        assert_eq!(ids(&results), ["listUsers"]);
        assert_eq!(results[0].matched_fields, [SearchField::Parameters]);
    }

    #[test]
    fn test_limit() {
        let endpoints = sample();
        let options = SearchOptions {
            limit: Some(2),
            ..SearchOptions::default()
        };
        assert_eq!(search(&endpoints, &SearchFilters::default(), &options).len(), 2);
    }

    #[test]
    fn test_unmatched_excluded() {
        let endpoints = sample();
        let options = SearchOptions {
            fuzzy: false,
            ..SearchOptions::with_query("zebra")
        };
        assert!(search(&endpoints, &SearchFilters::default(), &options).is_empty());
    }
}
