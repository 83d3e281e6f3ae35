use apidoc_core::error::ParseError;
use apidoc_core::parse;
use apidoc_core::parse::parameter::ParameterOrRef;
use apidoc_core::parse::request_body::RequestBodyOrRef;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const USERS: &str = include_str!("fixtures/users.json");

#[test]
fn test_parse_petstore_yaml() {
    let spec = parse::from_yaml(PETSTORE).expect("should parse petstore");
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.info.title, "Petstore");
    assert_eq!(spec.paths.len(), 4);
    assert_eq!(spec.operation_count(), 6);

    let components = spec.components.as_ref().expect("should have components");
    assert_eq!(components.schemas.len(), 4);
    assert_eq!(components.security_schemes.len(), 2);
}

#[test]
fn test_parse_keeps_ref_nodes() {
    let spec = parse::from_yaml(PETSTORE).unwrap();
    let get = spec.paths["/pets"].get.as_ref().unwrap();
    assert!(matches!(
        &get.parameters[0],
        ParameterOrRef::Ref { ref_path } if ref_path == "#/components/parameters/Limit"
    ));

    let post = spec.paths["/pets"].post.as_ref().unwrap();
    assert!(matches!(
        post.request_body,
        Some(RequestBodyOrRef::Ref { .. })
    ));
}

#[test]
fn test_parse_document_detects_format() {
    let json = parse::parse_document(USERS).expect("json decodes");
    assert_eq!(json["info"]["title"], "Users API");

    let yaml = parse::parse_document(PETSTORE).expect("yaml decodes");
    assert_eq!(yaml["info"]["title"], "Petstore");

    // object key order survives decoding
    let paths: Vec<&String> = yaml["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, ["/pets", "/pets/{petId}", "/store/inventory", "/health"]);
}

#[test]
fn test_parse_from_value_matches_from_json() {
    let value = parse::parse_document(USERS).unwrap();
    let from_value = parse::from_value(&value).unwrap();
    let from_json = parse::from_json(USERS).unwrap();
    assert_eq!(from_value.paths.len(), from_json.paths.len());
    assert_eq!(from_value.info.version, "2.0.0");
}

#[test]
fn test_parse_invalid_version() {
    let yaml = r#"
openapi: "2.0.0"
info:
  title: Test
  version: "1.0"
paths: {}
"#;
    let value = parse::parse_document(yaml).unwrap();
    let err = parse::from_value(&value).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(v) if v == "2.0.0"));
}

#[test]
fn test_parse_garbage_reports_both_decoders() {
    let err = parse::parse_document("{ not: [valid").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("JSON"), "{message}");
    assert!(message.contains("YAML"), "{message}");
}

#[test]
fn test_parse_wrong_shape() {
    let value = serde_json::json!({ "openapi": "3.0.0", "info": "nope", "paths": {} });
    assert!(matches!(
        parse::from_value(&value),
        Err(ParseError::Shape(_))
    ));
}
