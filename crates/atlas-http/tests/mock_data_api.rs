//! Mock Data API tests for atlas-http.
//!
//! These tests use wiremock to simulate the API Gateway fronting the Data
//! API and the Bedrock runtime, so no network access or real credentials
//! are needed.

use std::sync::Arc;

use atlas_core::error::{Error, InvalidInputError};
use atlas_core::{
    ApiUrl, Credentials, DataApi, Embedder, HttpMethod, ModelId, Namespace, Operation,
    StaticCredentials, Unsigned,
};
use atlas_http::sigv4::{BEDROCK, EXECUTE_API};
use atlas_http::{BedrockEmbedder, HttpDataApi, RemoteCallClient, SigV4Signer};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_client(service: &str) -> RemoteCallClient {
    let creds = StaticCredentials::new(Credentials::new("AKIDEXAMPLE", "secret"));
    let signer = SigV4Signer::new(Arc::new(creds), "us-east-1", service);
    RemoteCallClient::new(Arc::new(signer)).unwrap()
}

fn data_api(server: &MockServer) -> HttpDataApi {
    let base = ApiUrl::new(format!("http://127.0.0.1:{}/prod/", server.address().port())).unwrap();
    HttpDataApi::new(base, signed_client(EXECUTE_API))
}

fn items() -> Namespace {
    Namespace::new("todos", "items").unwrap()
}

// ============================================================================
// Data API
// ============================================================================

#[tokio::test]
async fn test_insert_one_is_signed_and_returned_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod/insertOne"))
        .and(header("content-type", "application/json"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .and(body_json(json!({
            "database": "todos",
            "collection": "items",
            "document": {"title": "Complete workshop"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "insertedId": "65a1f0c2e4b0a1b2c3d4e5f6",
            "acknowledged": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = data_api(&server)
        .execute(&Operation::InsertOne {
            target: items(),
            document: json!({"title": "Complete workshop"}),
        })
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({"insertedId": "65a1f0c2e4b0a1b2c3d4e5f6", "acknowledged": true})
    );
}

#[tokio::test]
async fn test_authorization_header_names_execute_api_scope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod/find"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents": []})))
        .mount(&server)
        .await;

    data_api(&server)
        .execute(&Operation::Find {
            target: items(),
            filter: json!({}),
        })
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
    assert!(auth.contains("/us-east-1/execute-api/aws4_request"));
    assert!(auth.contains("SignedHeaders=content-type;host;x-amz-date"));
}

#[tokio::test]
async fn test_non_2xx_is_remote_call_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod/updateOne"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "The security token included in the request is invalid."
        })))
        .mount(&server)
        .await;

    let err = data_api(&server)
        .execute(&Operation::UpdateOne {
            target: items(),
            filter: json!({"_id": "1"}),
            update: json!({"$set": {"completed": true}}),
        })
        .await
        .unwrap_err();

    match err {
        Error::Remote(remote) => {
            assert_eq!(remote.status, 403);
            assert!(remote.body.contains("security token"));
            assert!(remote.is_auth_error());
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod/findOne"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = data_api(&server)
        .execute(&Operation::FindOne {
            target: items(),
            filter: json!({"_id": "1"}),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod/insertOne"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let result = data_api(&server)
        .execute(&Operation::InsertOne {
            target: items(),
            document: json!({"title": "once"}),
        })
        .await;

    assert!(matches!(result, Err(Error::Remote(_))));
    // `expect(1)` is verified when the server drops.
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Grab a free port, then close it so nothing is listening.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base = ApiUrl::new(format!("http://127.0.0.1:{port}/prod")).unwrap();
    let api = HttpDataApi::new(base, signed_client(EXECUTE_API));

    let err = api
        .execute(&Operation::Find {
            target: items(),
            filter: json!({}),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_model_invocation_is_rejected_by_data_api() {
    let server = MockServer::start().await;

    let err = data_api(&server)
        .execute(&Operation::InvokeEmbeddingModel {
            model: ModelId::default(),
            input_text: "hello".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidInput(InvalidInputError::UnsupportedOperation { .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_raw_send_reports_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prod/todos/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Todo not found"})),
        )
        .mount(&server)
        .await;

    let client = RemoteCallClient::new(Arc::new(Unsigned)).unwrap();
    let url = format!("http://127.0.0.1:{}/prod/todos/missing", server.address().port());
    let raw = client
        .send::<Value>(HttpMethod::Get, &url, None)
        .await
        .unwrap();

    assert_eq!(raw.status, 404);
    assert!(raw.body.contains("Todo not found"));
}

// ============================================================================
// Embeddings
// ============================================================================

fn embedder(server: &MockServer) -> BedrockEmbedder {
    let runtime = ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    BedrockEmbedder::new(signed_client(BEDROCK), runtime, ModelId::default())
}

#[tokio::test]
async fn test_embed_returns_model_vector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/model/amazon.titan-embed-text-v1/invoke"))
        .and(body_json(json!({"inputText": "beach vacation"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embedding": [0.25, -0.5, 1.0],
            "inputTextTokenCount": 2
        })))
        .mount(&server)
        .await;

    let vector = embedder(&server).embed("beach vacation").await.unwrap();
    assert_eq!(vector, vec![0.25, -0.5, 1.0]);

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(auth.contains("/us-east-1/bedrock/aws4_request"));
}

#[tokio::test]
async fn test_embed_keeps_double_precision() {
    let server = MockServer::start().await;
    let precise = [0.123456789012345_f64, -0.987654321098765];

    Mock::given(method("POST"))
        .and(path("/model/amazon.titan-embed-text-v1/invoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": precise})))
        .mount(&server)
        .await;

    let vector = embedder(&server).embed("precise").await.unwrap();
    assert_eq!(vector.len(), 2);
    for (got, want) in vector.iter().zip(precise) {
        assert!((got - want).abs() < 1e-12, "{} != {}", got, want);
    }
}

#[tokio::test]
async fn test_embed_failure_propagates_without_placeholder() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/model/amazon.titan-embed-text-v1/invoke"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Malformed input request"
        })))
        .mount(&server)
        .await;

    let result = embedder(&server).embed("mountain hiking").await;
    assert!(matches!(result, Err(Error::Remote(ref e)) if e.status == 400));
}

#[tokio::test]
async fn test_embed_rejects_missing_embedding_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/model/amazon.titan-embed-text-v1/invoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vector": [1.0]})))
        .mount(&server)
        .await;

    let result = embedder(&server).embed("temples and culture").await;
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
async fn test_embed_checks_dimensions_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/model/amazon.titan-embed-text-v1/invoke"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [1.0, 2.0]})))
        .mount(&server)
        .await;

    let result = embedder(&server).with_dims(1536).embed("short").await;
    assert!(matches!(result, Err(Error::Decode(_))));
}
