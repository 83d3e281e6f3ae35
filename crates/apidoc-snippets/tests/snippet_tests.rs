use apidoc_core::parse::security::ApiKeyLocation;
use apidoc_core::{NormalizedEndpoint, ParsedApiSpec, normalize_str};
use apidoc_snippets::{
    SnippetAuth, SnippetError, SnippetLanguage, SnippetOptions, generate, generate_all,
    generate_for_operation,
};
use insta::assert_snapshot;
use serde_json::json;

fn spec() -> ParsedApiSpec {
    normalize_str(include_str!("fixtures/todo.yaml")).unwrap()
}

fn endpoint(spec: &ParsedApiSpec, id: &str) -> NormalizedEndpoint {
    spec.endpoints.iter().find(|e| e.id == id).unwrap().clone()
}

#[test]
fn test_curl_bearer_uses_token_placeholder() {
    let spec = spec();
    let options = SnippetOptions::new("curl").with_auth(SnippetAuth::bearer());
    let snippet = generate(&endpoint(&spec, "listTodos"), &options).unwrap();

    assert!(
        snippet
            .code
            .contains(r#"-H "Authorization: Bearer <token>""#)
    );
    assert_eq!(snippet.language, SnippetLanguage::Curl);
    assert_eq!(snippet.description, "cURL request for GET /todos");
    assert_snapshot!(snippet.code, @r#"
curl -X GET "https://api.example.com/todos" \
  -H "Authorization: Bearer <token>"
"#);
}

#[test]
fn test_curl_sample_body_and_spec_server() {
    let spec = spec();
    let snippet =
        generate_for_operation(&spec, "createTodo", &SnippetOptions::new("shell")).unwrap();
    assert_snapshot!(snippet.code, @r#"
curl -X POST "https://todo.example.com/v1/todos" \
  -H "Content-Type: application/json" \
  -d '{
  "title": "Buy milk",
  "done": false
}'
"#);
}

#[test]
fn test_explicit_base_url_wins_over_spec_server() {
    let spec = spec();
    let options = SnippetOptions::new("curl").with_base_url("http://localhost:8080");
    let snippet = generate_for_operation(&spec, "listTodos", &options).unwrap();
    assert!(snippet.code.contains("\"http://localhost:8080/todos\""));
}

#[test]
fn test_python_basic_auth() {
    let spec = spec();
    let options = SnippetOptions::new("py").with_auth(SnippetAuth::basic());
    let snippet = generate(&endpoint(&spec, "createTodo"), &options).unwrap();
    assert_snapshot!(snippet.code, @r#"
import requests

url = "https://api.example.com/todos"
headers = {
    "Content-Type": "application/json",
}
payload = {
    "title": "Buy milk",
    "done": False
}

response = requests.post(url, headers=headers, json=payload, auth=("<username>", "<password>"))
print(response.status_code)
print(response.json())
"#);
}

#[test]
fn test_javascript_query_and_headers() {
    let spec = spec();
    let options = SnippetOptions::new("js")
        .query_param("done", true)
        .header("X-Request-Id", "abc");
    let snippet = generate(&endpoint(&spec, "listTodos"), &options).unwrap();
    assert_snapshot!(snippet.code, @r#"
const response = await fetch("https://api.example.com/todos?done=true", {
  method: "GET",
  headers: {
    "X-Request-Id": "abc"
  }
});

const data = await response.json();
console.log(response.status, data);
"#);
}

#[test]
fn test_typescript_function_named_after_operation() {
    let spec = spec();
    let options = SnippetOptions::new("typescript").with_auth(SnippetAuth::Bearer {
        token: Some("t0k".to_string()),
    });
    let snippet = generate(&endpoint(&spec, "createTodo"), &options).unwrap();
    assert_snapshot!(snippet.code, @r#"
async function createTodo(): Promise<unknown> {
  const response: Response = await fetch("https://api.example.com/todos", {
    method: "POST",
    headers: {
      "Content-Type": "application/json",
      "Authorization": "Bearer t0k"
    },
    body: JSON.stringify({
      "title": "Buy milk",
      "done": false
    })
  });
  if (!response.ok) {
    throw new Error(`Request failed with status ${response.status}`);
  }
  return response.json();
}

createTodo().then(console.log);
"#);
}

#[test]
fn test_node_api_key_header() {
    let spec = spec();
    let options = SnippetOptions::new("node").with_auth(SnippetAuth::api_key(ApiKeyLocation::Header));
    let snippet = generate(&endpoint(&spec, "listTodos"), &options).unwrap();
    assert_snapshot!(snippet.code, @r#"
const axios = require("axios");

async function listTodos() {
  const response = await axios({
    method: "get",
    url: "https://api.example.com/todos",
    headers: {
      "X-API-Key": "<api-key>"
    }
  });
  return response.data;
}

listTodos().then(console.log).catch(console.error);
"#);
}

#[test]
fn test_php_multipart_fields() {
    let spec = spec();
    let options = SnippetOptions::new("php").path_param("todoId", 3);
    let snippet = generate(&endpoint(&spec, "attachFile"), &options).unwrap();
    assert_snapshot!(snippet.code, @r#"
<?php

$curl = curl_init();

curl_setopt_array($curl, [
    CURLOPT_URL => 'https://api.example.com/todos/3/attachments',
    CURLOPT_RETURNTRANSFER => true,
    CURLOPT_CUSTOMREQUEST => 'POST',
    CURLOPT_POSTFIELDS => [
        'note' => 'receipt',
    ],
]);

$response = curl_exec($curl);
$status = curl_getinfo($curl, CURLINFO_HTTP_CODE);
curl_close($curl);

echo "Status: $status\n";
echo $response;
"#);
}

#[test]
fn test_java_basic_auth_without_body() {
    let spec = spec();
    let options = SnippetOptions::new("java")
        .path_param("todoId", 7)
        .with_auth(SnippetAuth::basic());
    let snippet = generate(&endpoint(&spec, "deleteTodo"), &options).unwrap();
    assert_snapshot!(snippet.code, @r#"
import java.net.URI;
import java.net.http.HttpClient;
import java.net.http.HttpRequest;
import java.net.http.HttpResponse;
import java.util.Base64;

public class DeleteTodoExample {
    public static void main(String[] args) throws Exception {
        HttpClient client = HttpClient.newHttpClient();

        HttpRequest request = HttpRequest.newBuilder()
            .uri(URI.create("https://api.example.com/todos/7"))
            .header("Authorization", "Basic " + Base64.getEncoder().encodeToString("<username>:<password>".getBytes()))
            .method("DELETE", HttpRequest.BodyPublishers.noBody())
            .build();

        HttpResponse<String> response = client.send(request, HttpResponse.BodyHandlers.ofString());
        System.out.println(response.statusCode());
        System.out.println(response.body());
    }
}
"#);
}

#[test]
fn test_go_body_and_imports() {
    let spec = spec();
    let options = SnippetOptions::new("golang").body(json!({"title": "Call mom"}));
    let snippet = generate(&endpoint(&spec, "createTodo"), &options).unwrap();
    let code = snippet.code;

    assert!(code.starts_with("package main\n\nimport (\n\t\"fmt\"\n\t\"io\"\n\t\"net/http\"\n\t\"strings\"\n)\n"));
    assert!(code.contains("\tpayload := strings.NewReader(`{\n  \"title\": \"Call mom\"\n}`)\n"));
    assert!(code.contains(
        "\treq, err := http.NewRequest(\"POST\", \"https://api.example.com/todos\", payload)\n"
    ));
    assert!(code.contains("\treq.Header.Set(\"Content-Type\", \"application/json\")\n"));
}

#[test]
fn test_go_multipart_uses_writer() {
    let spec = spec();
    let options = SnippetOptions::new("go").path_param("todoId", 3);
    let code = generate(&endpoint(&spec, "attachFile"), &options).unwrap().code;

    assert!(code.contains("\t\"mime/multipart\"\n"));
    assert!(!code.contains("\"strings\""));
    assert!(code.contains("\twriter.WriteField(\"note\", \"receipt\")\n"));
    assert!(code.contains("\treq.Header.Set(\"Content-Type\", writer.FormDataContentType())\n"));
}

#[test]
fn test_api_key_in_query_is_appended_to_url() {
    let spec = spec();
    let options = SnippetOptions::new("curl")
        .query_param("done", false)
        .with_auth(SnippetAuth::ApiKey {
            name: Some("api_key".to_string()),
            location: ApiKeyLocation::Query,
            value: Some("k1".to_string()),
        });
    let snippet = generate(&endpoint(&spec, "listTodos"), &options).unwrap();
    assert!(
        snippet
            .code
            .contains("\"https://api.example.com/todos?done=false&api_key=k1\"")
    );
}

#[test]
fn test_generate_all_covers_every_language() {
    let spec = spec();
    let options = SnippetOptions::new("not-a-language").path_param("todoId", 1);
    let snippets = generate_all(&endpoint(&spec, "deleteTodo"), &options);

    let languages: Vec<_> = snippets.iter().map(|s| s.language).collect();
    assert_eq!(languages, SnippetLanguage::ALL);
    for snippet in &snippets {
        assert!(
            snippet.code.contains("https://api.example.com/todos/1"),
            "{} snippet is missing the URL:\n{}",
            snippet.language,
            snippet.code
        );
        assert!(snippet.description.ends_with("DELETE /todos/{todoId}"));
    }
}

#[test]
fn test_unsupported_language_is_rejected() {
    let spec = spec();
    let err = generate(&endpoint(&spec, "listTodos"), &SnippetOptions::new("ruby")).unwrap_err();
    assert!(matches!(err, SnippetError::UnsupportedLanguage(ref name) if name == "ruby"));
    assert_eq!(err.to_string(), "unsupported language 'ruby'");
}

#[test]
fn test_unknown_operation_is_a_lookup_error() {
    let spec = spec();
    let err = generate_for_operation(&spec, "archiveTodo", &SnippetOptions::default()).unwrap_err();
    assert!(matches!(err, SnippetError::Lookup(_)));
    assert!(err.to_string().contains("archiveTodo"));
}

#[test]
fn test_media_examples_use_example_value() {
    let yaml = r#"
openapi: 3.0.3
info: { title: Todo API, version: "1" }
paths:
  /todos:
    post:
      operationId: createTodo
      requestBody:
        content:
          application/json:
            examples:
              basic:
                summary: A simple todo
                value:
                  title: Buy milk
      responses:
        "201": { description: Created }
"#;
    let spec = normalize_str(yaml).unwrap();
    let snippet = generate(&endpoint(&spec, "createTodo"), &SnippetOptions::new("curl")).unwrap();
    assert!(!snippet.code.contains("summary"));
    assert_snapshot!(snippet.code, @r#"
curl -X POST "https://api.example.com/todos" \
  -H "Content-Type: application/json" \
  -d '{
  "title": "Buy milk"
}'
"#);
}

#[test]
fn test_curl_escapes_header_names() {
    let spec = spec();
    let options = SnippetOptions::new("curl").header("X-\"Odd\"", "a\"b");
    let snippet = generate(&endpoint(&spec, "listTodos"), &options).unwrap();
    assert!(snippet.code.contains(r#"-H "X-\"Odd\": a\"b""#));
}
