//! URL construction shared by request execution and snippet generation.

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::Value;

/// Characters escaped in a substituted path segment (RFC 3986 `pchar` complement).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Parameter values keyed by name, in caller order.
pub type ParamMap = IndexMap<String, Value>;

/// Replace `{name}` placeholders with percent-encoded values from `params`.
/// Placeholders without a matching key are left as they are.
pub fn substitute_path(template: &str, params: &ParamMap) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        out.push_str(&rest[..start]);
        match params.get(name).and_then(scalar_to_string) {
            Some(value) => out.extend(utf8_percent_encode(&value, PATH_SEGMENT)),
            None => out.push_str(&rest[start..=start + len]),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Flatten query parameters into ordered pairs. Arrays become repeated keys;
/// `null` values are dropped.
pub fn query_pairs(params: &ParamMap) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                pairs.extend(
                    items
                        .iter()
                        .filter_map(scalar_to_string)
                        .map(|v| (key.clone(), v)),
                );
            }
            other => {
                if let Some(v) = scalar_to_string(other) {
                    pairs.push((key.clone(), v));
                }
            }
        }
    }
    pairs
}

/// `application/x-www-form-urlencoded` form of `pairs`.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Join a base URL and a path template, then substitute path parameters and
/// append the query string.
pub fn build_url(base: &str, path: &str, path_params: &ParamMap, query: &ParamMap) -> String {
    let mut url = join_url(base, &substitute_path(path, path_params));
    let pairs = query_pairs(query);
    if !pairs.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&encode_query(&pairs));
    }
    url
}

/// Concatenate without doubling or dropping the slash between the two parts.
pub fn join_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) if !path.is_empty() => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// String form of a scalar parameter. Strings are used without quotes;
/// objects are serialized as JSON.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
