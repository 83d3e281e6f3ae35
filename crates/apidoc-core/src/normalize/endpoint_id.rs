use crate::model::HttpMethod;

/// Stable id for an operation: its `operationId` when declared, otherwise
/// `METHOD_path` with every non-alphanumeric path character replaced by `_`.
///
/// Examples:
/// - `GET /users` → `GET__users`
/// - `DELETE /users/{id}` → `DELETE__users__id_`
pub fn endpoint_id(operation_id: Option<&str>, method: HttpMethod, path: &str) -> String {
    match operation_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => derive_endpoint_id(method, path),
    }
}

pub fn derive_endpoint_id(method: HttpMethod, path: &str) -> String {
    let slug: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", method.as_str(), slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_operation_id_wins() {
        assert_eq!(
            endpoint_id(Some("listUsers"), HttpMethod::Get, "/users"),
            "listUsers"
        );
    }

    #[test]
    fn test_derived_id_simple() {
        assert_eq!(endpoint_id(None, HttpMethod::Get, "/users"), "GET__users");
    }

    #[test]
    fn test_derived_id_with_params() {
        assert_eq!(
            endpoint_id(None, HttpMethod::Delete, "/users/{id}"),
            "DELETE__users__id_"
        );
    }

    #[test]
    fn test_empty_operation_id_is_derived() {
        assert_eq!(
            endpoint_id(Some(""), HttpMethod::Post, "/pets"),
            "POST__pets"
        );
    }

    #[test]
    fn test_derived_id_dashes_and_dots() {
        assert_eq!(
            derive_endpoint_id(HttpMethod::Put, "/v1.2/user-groups"),
            "PUT__v1_2_user_groups"
        );
    }
}
