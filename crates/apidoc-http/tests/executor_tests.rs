use std::sync::Arc;
use std::time::Duration;

use apidoc_core::model::NormalizedEndpoint;
use apidoc_core::parse::security::ApiKeyLocation;
use apidoc_core::{ParsedApiSpec, normalize_str, query};
use apidoc_http::{
    ExecuteError, ExecutorConfig, RequestExecutor, RequestParams, ResponseData, SecurityConfig,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USERS: &str = include_str!("fixtures/users.yaml");

fn spec() -> ParsedApiSpec {
    normalize_str(USERS).unwrap()
}

fn endpoint(id: &str) -> NormalizedEndpoint {
    query::find_endpoint_by_id(&spec().endpoints, id)
        .unwrap()
        .clone()
}

fn executor(server: &MockServer, config: ExecutorConfig) -> RequestExecutor {
    RequestExecutor::new(config.with_base_url(server.uri())).unwrap()
}

#[tokio::test]
async fn test_execute_substitutes_path_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/123"))
        .and(query_param("expand", "posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "123"})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let params = RequestParams::default()
        .path_param("id", "123")
        .query_param("expand", "posts");
    let response = executor.execute(&endpoint("getUser"), params).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data, ResponseData::Json(json!({"id": "123"})));
    let state = executor.state();
    assert!(!state.loading);
    assert!(state.last_error.is_none());
    assert_eq!(state.last_response.unwrap().status, 200);
}

#[tokio::test]
async fn test_execute_repeats_array_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("role", "admin"))
        .and(query_param("role", "owner"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let params = RequestParams::default().query_param("role", json!(["admin", "owner"]));
    let response = executor.execute(&endpoint("listUsers"), params).await.unwrap();
    assert_eq!(response.data.as_text(), Some("ok"));
}

#[tokio::test]
async fn test_execute_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer secret"))
        .and(header("x-client", "apidoc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = ExecutorConfig::default()
        .with_header("X-Client", "apidoc")
        .with_security(SecurityConfig::Bearer {
            token: "secret".to_string(),
        });
    let executor = executor(&server, config);
    executor
        .execute(&endpoint("listUsers"), RequestParams::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_execute_sends_basic_and_api_key_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("api_key", "k-1"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let basic = executor(
        &server,
        ExecutorConfig::default().with_security(SecurityConfig::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        }),
    );
    let response = basic
        .execute(&endpoint("listUsers"), RequestParams::default())
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let keyed = executor(
        &server,
        ExecutorConfig::default().with_security(SecurityConfig::ApiKey {
            name: "api_key".to_string(),
            location: ApiKeyLocation::Query,
            value: "k-1".to_string(),
        }),
    );
    let response = keyed
        .execute(&endpoint("listUsers"), RequestParams::default())
        .await
        .unwrap();
    assert_eq!(response.status, 202);
}

#[tokio::test]
async fn test_execute_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Ada"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "u1"})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let response = executor
        .execute(
            &endpoint("createUser"),
            RequestParams::default().body(json!({"name": "Ada"})),
        )
        .await
        .unwrap();
    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn test_execute_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("name=Ada+Lovelace&role=admin"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let params = RequestParams::default()
        .content_type("application/x-www-form-urlencoded")
        .body(json!({"name": "Ada Lovelace", "role": "admin"}));
    executor
        .execute(&endpoint("createUser"), params)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_execute_multipart_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/avatars/9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let params = RequestParams::default()
        .path_param("id", 9)
        .body(json!({"caption": "me"}));
    executor
        .execute(&endpoint("uploadAvatar"), params)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"caption\""));
    assert!(body.contains("me"));
}

#[tokio::test]
async fn test_execute_error_uses_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "User not found"})))
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let err = executor
        .execute(&endpoint("getUser"), RequestParams::default().path_param("id", "404"))
        .await
        .unwrap_err();

    match &err {
        ExecuteError::Http {
            status, message, ..
        } => {
            assert_eq!(*status, 404);
            assert_eq!(message, "User not found");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(err.status(), Some(404));
    assert_eq!(executor.state().last_error.as_deref(), Some("User not found"));
}

#[tokio::test]
async fn test_execute_error_falls_back_to_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let err = executor
        .execute(&endpoint("listUsers"), RequestParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
}

#[tokio::test]
async fn test_execute_operation_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let spec = spec();
    let response = executor
        .execute_operation(&spec, "listUsers", RequestParams::default())
        .await
        .unwrap();
    assert_eq!(response.data, ResponseData::Json(json!([])));

    let err = executor
        .execute_operation(&spec, "deleteEverything", RequestParams::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("deleteEverything"));
}

#[tokio::test]
async fn test_execute_runs_interceptors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-intercepted", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default())
        .on_request(|mut request| {
            request
                .headers
                .insert("x-intercepted".to_string(), "yes".to_string());
            request
        })
        .on_response(|mut response| {
            response.data = ResponseData::Json(json!({"wrapped": true}));
            response
        });
    let response = executor
        .execute(&endpoint("listUsers"), RequestParams::default())
        .await
        .unwrap();
    assert_eq!(response.data, ResponseData::Json(json!({"wrapped": true})));
}

async fn wait_for_in_flight(executor: &RequestExecutor, count: usize) {
    for _ in 0..200 {
        if executor.in_flight() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("calls never started");
}

#[tokio::test]
async fn test_cancel_aborts_latest_call_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let executor = Arc::new(executor(&server, ExecutorConfig::default()));
    let first = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move {
            executor
                .execute(&endpoint("listUsers"), RequestParams::default())
                .await
        })
    };
    wait_for_in_flight(&executor, 1).await;

    let second = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move {
            executor
                .execute(&endpoint("listUsers"), RequestParams::default())
                .await
        })
    };
    wait_for_in_flight(&executor, 2).await;

    assert!(executor.cancel());
    assert!(matches!(second.await.unwrap(), Err(ExecuteError::Aborted)));
    assert_eq!(first.await.unwrap().unwrap().status, 200);

    let state = executor.state();
    assert!(!state.loading);
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn test_dropped_call_is_no_longer_tracked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let executor = executor(&server, ExecutorConfig::default());
    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        executor.execute(&endpoint("listUsers"), RequestParams::default()),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(executor.in_flight(), 0);
    assert!(!executor.state().loading);
    assert!(!executor.cancel());
}

#[tokio::test]
async fn test_execute_without_base_url_fails() {
    let executor = RequestExecutor::new(ExecutorConfig::default()).unwrap();
    let err = executor
        .execute(&endpoint("listUsers"), RequestParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExecuteError::NoBaseUrl));
    assert!(executor.state().last_error.is_some());
}

#[tokio::test]
async fn test_execute_falls_back_to_spec_server() {
    let executor = RequestExecutor::new(ExecutorConfig::default())
        .unwrap()
        .with_spec(Arc::new(spec()));
    let prepared = executor
        .prepare(&endpoint("getUser"), RequestParams::default().path_param("id", "123"))
        .unwrap();
    assert_eq!(prepared.url, "https://api.example.com/users/123");
}
