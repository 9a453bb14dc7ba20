//! Integration tests for mpr-web JSON endpoints
//!
//! Tests cover:
//! - Listing, detail and totals proxied from a mocked registry
//! - Error mapping (gateway statuses, validation, not found)
//! - Tip submission via multipart
//! - Health endpoints and security headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Local;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mpr_common::{ApiService, ClientConfig};
use mpr_web::{build_router, AppState};

const PEOPLE: &str = "/v1/pessoas/aberto/filtro";
const TIP: &str = "/v1/ocorrencias/informacoes-desaparecido";
const BOUNDARY: &str = "mpr-test-boundary";

// ============================================================================
// Helpers
// ============================================================================

fn setup_app(server: &MockServer) -> axum::Router {
    let api = ApiService::new(ClientConfig::default().with_url(server.uri())).unwrap();
    build_router(AppState::new(api))
}

fn person(id: i64) -> Value {
    json!({
        "id": id,
        "nome": format!("PESSOA {}", id),
        "idade": 25,
        "sexo": "FEMININO",
        "vivo": true,
        "urlFoto": null,
        "ultimaOcorrencia": {
            "dtDesaparecimento": "2025-03-01T08:00:00",
            "dataLocalizacao": null,
            "encontradoVivo": false,
            "localDesaparecimentoConcat": "Centro - Cuiabá/MT",
            "ocorrenciaEntrevDesapDTO": null,
            "listaCartaz": null,
            "ocoId": id + 1000
        }
    })
}

fn page(content: Vec<Value>, total: i64) -> Value {
    json!({
        "totalElements": total,
        "totalPages": (total + 9) / 10,
        "numberOfElements": content.len(),
        "size": 10,
        "content": content
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, headers, json)
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

// ============================================================================
// Listing / detail / totals
// ============================================================================

#[tokio::test]
async fn test_list_people_proxies_registry_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PEOPLE))
        .and(query_param("pagina", "1"))
        .and(query_param("porPagina", "20"))
        .and(query_param("sexo", "FEMININO"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![person(1)], 21)))
        .mount(&server)
        .await;

    let (status, _, body) = get(setup_app(&server), "/api/pessoas?page=1&size=20&sexo=FEMININO").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalElements"], 21);
    assert_eq!(body["content"][0]["ultimaOcorrencia"]["ocoId"], 1001);
}

#[tokio::test]
async fn test_list_people_accepts_registry_parameter_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PEOPLE))
        .and(query_param("pagina", "3"))
        .and(query_param("porPagina", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0)))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _, _) = get(setup_app(&server), "/api/pessoas?pagina=3&porPagina=5").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_people_rejects_malformed_dates() {
    let server = MockServer::start().await;

    let (status, _, body) = get(setup_app(&server), "/api/pessoas?dataDe=01-02-2025").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["fields"][0]["field"], "dataDe");
}

#[tokio::test]
async fn test_registry_failure_maps_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PEOPLE))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (status, _, body) = get(setup_app(&server), "/api/pessoas").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert_eq!(
        body["error"]["message"],
        "Erro interno do servidor. Tente novamente mais tarde."
    );
}

#[tokio::test]
async fn test_get_person_found_and_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/pessoas/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(person(5)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pessoas/6"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PEOPLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![person(5)], 1)))
        .mount(&server)
        .await;

    let (status, _, body) = get(setup_app(&server), "/api/pessoas/5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nome"], "PESSOA 5");

    let (status, _, body) = get(setup_app(&server), "/api/pessoas/6").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_totals_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PEOPLE))
        .and(query_param("status", "LOCALIZADO"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0)))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PEOPLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 42)))
        .mount(&server)
        .await;

    let (status, _, body) = get(setup_app(&server), "/api/totais").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "desaparecidas": 42, "localizadas": 0 }));
}

// ============================================================================
// Tip submission
// ============================================================================

#[tokio::test]
async fn test_submit_tip_forwards_to_registry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TIP))
        .and(query_param("ocoId", "1524"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let png: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    let body = multipart_body(
        &[
            ("informacao", "Vi a pessoa na praça central hoje cedo"),
            ("data", &today()),
            ("telefone", "65999999999"),
        ],
        &[("foto.png", png)],
    );

    let response = setup_app(&server)
        .oneshot(multipart_request("/api/ocorrencias/1524/informacoes", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, json!({ "ocoId": 1524, "fotos": 1 }));
}

#[tokio::test]
async fn test_submit_tip_validation_errors_never_reach_registry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let body = multipart_body(&[("informacao", "curto"), ("telefone", "12")], &[]);
    let response = setup_app(&server)
        .oneshot(multipart_request("/api/ocorrencias/1524/informacoes", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    let fields: Vec<&str> = json["error"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["informacao", "telefone"]);
}

#[tokio::test]
async fn test_list_people_huge_page_with_mock_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let api = ApiService::new(ClientConfig::default().with_url(server.uri()).with_mock(true)).unwrap();
    let app = build_router(AppState::new(api));
    let (status, _, body) = get(app, "/api/pessoas?page=9223372036854775807&size=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"].as_array().unwrap().len(), 0);
    assert_eq!(body["totalElements"], 6);
}

#[tokio::test]
async fn test_non_numeric_person_id_answers_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, _, body) = get(setup_app(&server), "/api/pessoas/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn test_submit_tip_without_multipart_answers_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/ocorrencias/12/informacoes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"informacao":"texto"}"#))
        .unwrap();
    let response = setup_app(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_submit_tip_non_numeric_occurrence() {
    let server = MockServer::start().await;
    let body = multipart_body(&[("informacao", "Vi a pessoa na praça central hoje cedo")], &[]);

    let response = setup_app(&server)
        .oneshot(multipart_request("/api/ocorrencias/xyz/informacoes", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

// ============================================================================
// Health, build info, headers
// ============================================================================

#[tokio::test]
async fn test_liveness_never_calls_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (status, _, body) = get(setup_app(&server), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mpr-web");
}

#[tokio::test]
async fn test_api_health_reflects_registry_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PEOPLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PEOPLE))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (status, headers, body) = get(setup_app(&server), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["api"]["online"], true);
    assert!(body["uptimeSeconds"].is_u64());
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");

    let (status, _, body) = get(setup_app(&server), "/api/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["api"]["online"], false);
    assert_eq!(body["api"]["error"], "HTTP 503");
}

#[tokio::test]
async fn test_build_info() {
    let server = MockServer::start().await;
    let (status, _, body) = get(setup_app(&server), "/api/buildinfo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let server = MockServer::start().await;

    for uri in ["/health", "/nao-existe"] {
        let (_, headers, _) = get(setup_app(&server), uri).await;
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    }
}
