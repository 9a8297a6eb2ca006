use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use biblioteca::infrastructure::auth::{hash_password, AdminGate};
use biblioteca::infrastructure::{AppState, CsvCatalogStore, InMemoryLedgerStore};
use biblioteca::models::LoanEvent;
use biblioteca::infrastructure::server;
use biblioteca::services::LibraryService;
use biblioteca::utils::CodeNormalizer;
use chrono::Duration;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test app; the catalog file may not exist
fn setup_app(catalog_path: PathBuf, ledger: Vec<LoanEvent>) -> Router {
    let normalizer = CodeNormalizer::default();
    let library = LibraryService::new(
        Arc::new(CsvCatalogStore::new(catalog_path, normalizer)),
        Arc::new(InMemoryLedgerStore::with_events(ledger)),
        normalizer,
    );
    let gate = AdminGate::new(
        "admin",
        hash_password("admin_password").unwrap(),
        "test-secret",
        Duration::minutes(30),
    );
    server::build_router(AppState::new(library, gate), &[])
}

fn catalog_dir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("catalogo.csv");
    std::fs::write(&path, "codigo,titulo,autor,quantidade\nb1,Livro,Autor,1\n")
        .expect("Failed to write catalog");
    (dir, path)
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn login(app: &Router) -> String {
    let req = Request::builder()
        .uri("/api/auth/login")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "username": "admin", "password": "admin_password" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn post_json(app: &Router, uri: &str, token: &str, payload: Value) -> Response {
    let req = Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(payload.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

#[tokio::test]
async fn test_loan_validation_errors() {
    let (_dir, path) = catalog_dir();
    let app = setup_app(path, vec![]);
    let token = login(&app).await;

    let unknown = post_json(&app, "/api/loans", &token, json!({ "code": "zz", "borrower": "Ana" })).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let no_borrower = post_json(&app, "/api/loans", &token, json!({ "code": "b1", "borrower": "  " })).await;
    assert_eq!(no_borrower.status(), StatusCode::BAD_REQUEST);

    let bad_date = post_json(
        &app,
        "/api/loans",
        &token,
        json!({ "code": "b1", "borrower": "Ana", "loan_date": "01/05/2024" }),
    )
    .await;
    assert_eq!(bad_date.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_return_errors() {
    let (_dir, path) = catalog_dir();
    let app = setup_app(
        path,
        vec![
            LoanEvent::open("b1", "Ana", "2024-01-01"),
            LoanEvent::open("b1", "Bia", "2024-01-02"),
        ],
    );
    let token = login(&app).await;

    let none = post_json(&app, "/api/returns", &token, json!({ "code": "b2", "row": 2 })).await;
    assert_eq!(none.status(), StatusCode::NOT_FOUND);

    let wrong_row = post_json(
        &app,
        "/api/returns",
        &token,
        json!({ "code": "b1", "borrower": "Bia", "row": 2 }),
    )
    .await;
    assert_eq!(wrong_row.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(wrong_row).await["candidates"], json!([3]));
}

#[tokio::test]
async fn test_missing_catalog_degrades_to_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(dir.path().join("missing.csv"), vec![]);

    let req = Request::builder()
        .uri("/api/books?q=livro")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total"], 0);

    let req = Request::builder()
        .uri("/api/availability")
        .body(Body::empty())
        .unwrap();
    let json = body_json(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(json["degraded"][0]["source"], "catalog");

    let token = login(&app).await;
    let loan = post_json(&app, "/api/loans", &token, json!({ "code": "b1", "borrower": "Ana" })).await;
    assert_eq!(loan.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_invalid_catalog_upload_is_rejected() {
    let (_dir, path) = catalog_dir();
    let app = setup_app(path.clone(), vec![]);
    let token = login(&app).await;

    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"bad.csv\"\r\n\r\nnome,coisa\nx,y\r\n--{b}--\r\n",
        b = boundary
    );
    let req = Request::builder()
        .uri("/api/catalog")
        .method("PUT")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Original catalog left in place
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("b1,Livro"));
}
