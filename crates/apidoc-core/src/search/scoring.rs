use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::NormalizedEndpoint;

/// Score given to a field that only matches as a subsequence, per matched ratio.
pub const FUZZY_FACTOR: f64 = 0.7;

/// An endpoint attribute the text query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchField {
    Summary,
    Description,
    OperationId,
    Path,
    Tags,
    Parameters,
    Responses,
}

impl SearchField {
    pub const ALL: [SearchField; 7] = [
        SearchField::Summary,
        SearchField::Description,
        SearchField::OperationId,
        SearchField::Path,
        SearchField::Tags,
        SearchField::Parameters,
        SearchField::Responses,
    ];

    pub fn weight(&self) -> f64 {
        match self {
            SearchField::Summary => 2.0,
            SearchField::OperationId => 1.8,
            SearchField::Path => 1.7,
            SearchField::Description => 1.5,
            SearchField::Tags => 1.3,
            SearchField::Parameters => 1.2,
            SearchField::Responses => 1.1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Summary => "summary",
            SearchField::Description => "description",
            SearchField::OperationId => "operationId",
            SearchField::Path => "path",
            SearchField::Tags => "tags",
            SearchField::Parameters => "parameters",
            SearchField::Responses => "responses",
        }
    }

    /// The searchable text of `endpoint` for this field. Multi-valued fields are
    /// joined with spaces.
    pub fn text(&self, endpoint: &NormalizedEndpoint) -> String {
        match self {
            SearchField::Summary => endpoint.summary.clone().unwrap_or_default(),
            SearchField::Description => endpoint.description.clone().unwrap_or_default(),
            SearchField::OperationId => endpoint.id.clone(),
            SearchField::Path => endpoint.path.clone(),
            SearchField::Tags => endpoint.tags.join(" "),
            SearchField::Parameters => endpoint
                .parameters
                .iter()
                .flat_map(|p| std::iter::once(p.name.as_str()).chain(p.description.as_deref()))
                .collect::<Vec<_>>()
                .join(" "),
            SearchField::Responses => endpoint
                .responses
                .iter()
                .flat_map(|r| [r.status_code.as_str(), r.description.as_str()])
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchField::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown search field '{s}'"))
    }
}

/// Score one field: 1.0 for a substring match, otherwise (if `fuzzy`) the
/// in-order matched share of the query scaled by [`FUZZY_FACTOR`], otherwise 0.
///
/// Both inputs are expected to be case-folded already when matching is
/// case-insensitive.
pub fn field_score(text: &str, query: &str, fuzzy: bool) -> f64 {
    if query.is_empty() || text.is_empty() {
        return 0.0;
    }
    if text.contains(query) {
        return 1.0;
    }
    if !fuzzy {
        return 0.0;
    }
    let query_len = query.chars().count();
    let matched = subsequence_matches(text, query);
    (matched as f64 / query_len as f64) * FUZZY_FACTOR
}

/// Number of leading query characters found in order within `text`.
pub fn subsequence_matches(text: &str, query: &str) -> usize {
    let mut wanted = query.chars().peekable();
    let mut matched = 0;
    for c in text.chars() {
        match wanted.peek() {
            Some(&q) if q == c => {
                matched += 1;
                wanted.next();
            }
            Some(_) => {}
            None => break,
        }
    }
    matched
}

/// Weighted mean over the matched fields, clamped to [0, 1].
pub fn aggregate_score(matches: &[(SearchField, f64)]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }
    let total: f64 = matches.iter().map(|(field, s)| field.weight() * s).sum();
    (total / matches.len() as f64).clamp(0.0, 1.0)
}
