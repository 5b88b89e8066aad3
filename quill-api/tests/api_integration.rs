//! End-to-end tests against the full router.
//!
//! Each test drives the app through `tower::ServiceExt::oneshot` with an
//! in-memory store, exactly as a real client would over HTTP.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use quill_api::auth::AuthConfig;
use quill_api::config::ApiConfig;
use quill_api::routes::create_api_router;
use quill_api::state::AppState;
use quill_store::InMemoryStore;
use quill_xml::SchemaRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(SchemaRegistry::builtin().unwrap()),
        Arc::new(AuthConfig::default()),
    );
    create_api_router(state, &ApiConfig::default())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, method, uri, token, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Tester", "email": email, "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn create_notebook(app: &Router, token: &str, title: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/notebooks",
        Some(token),
        Some(json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_note(app: &Router, token: &str, notebook: &str, title: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/notes",
        Some(token),
        Some(json!({ "title": title, "content": "body", "notebook": notebook })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_then_duplicate_email_conflicts() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "A", "email": "a@example.com", "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().unwrap().len() > 20);
    assert_eq!(body["user"]["email"], "a@example.com");
    assert!(body["user"].get("passwordHash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "B", "email": "A@Example.COM", "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = app();
    register(&app, "a@example.com").await;

    let (wrong_pw_status, wrong_pw) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@example.com", "password": "wrong" })),
    )
    .await;
    let (no_user_status, no_user) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "wrong" })),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw["message"], no_user["message"]);
}

#[tokio::test]
async fn test_login_returns_usable_token() {
    let app = app();
    register(&app, "a@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "a@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, me) = send(&app, Method::GET, "/api/users/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@example.com");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/notes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, Method::GET, "/api/users/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_schema_endpoint_is_public_xml() {
    let app = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/notes/schema")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("xs:schema"));
    assert!(text.contains("\"note\""));
}

#[tokio::test]
async fn test_note_lifecycle_shadow_tracks_writes() {
    let app = app();
    let token = register(&app, "a@example.com").await;
    let notebook = create_notebook(&app, &token, "Work").await;
    let note = create_note(&app, &token, &notebook, "First note").await;

    let (status, bytes) = send_raw(
        &app,
        Method::GET,
        &format!("/api/notes/{note}/xml"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let xml = String::from_utf8(bytes).unwrap();
    assert!(xml.starts_with("<note>"));
    assert!(xml.contains("<title>First note</title>"));
    assert!(xml.contains("<createdAt>"));
    assert!(!xml.contains("<updatedAt>"));

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{note}"),
        Some(&token),
        Some(json!({ "content": "revised" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["content"], "revised");
    assert_eq!(updated["notebook"]["title"], "Work");

    let (_, bytes) = send_raw(
        &app,
        Method::GET,
        &format!("/api/notes/{note}/xml"),
        Some(&token),
        None,
    )
    .await;
    let xml = String::from_utf8(bytes).unwrap();
    assert!(xml.contains("<updatedAt>"));
    assert!(!xml.contains("<createdAt>"));
}

#[tokio::test]
async fn test_foreign_note_reads_like_missing_note() {
    let app = app();
    let token_a = register(&app, "a@example.com").await;
    let token_b = register(&app, "b@example.com").await;
    let notebook = create_notebook(&app, &token_a, "Private").await;
    let note = create_note(&app, &token_a, &notebook, "Secret").await;

    let (foreign_status, foreign) = send(
        &app,
        Method::GET,
        &format!("/api/notes/{note}"),
        Some(&token_b),
        None,
    )
    .await;
    let (missing_status, missing) = send(
        &app,
        Method::GET,
        "/api/notes/0123456789abcdef01234567",
        Some(&token_b),
        None,
    )
    .await;

    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign, missing);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request_not_lookup_miss() {
    let app = app();
    let token = register(&app, "a@example.com").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/notes/not-a-valid-id",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");
}

#[tokio::test]
async fn test_invalid_note_rejected_and_nothing_stored() {
    let app = app();
    let token = register(&app, "a@example.com").await;
    let notebook = create_notebook(&app, &token, "Work").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(&token),
        Some(json!({ "title": "", "content": "x", "notebook": notebook })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");

    let (_, notes) = send(&app, Method::GET, "/api/notes", Some(&token), None).await;
    assert_eq!(notes.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_import_xml_validates_before_anything_else() {
    let app = app();
    let token = register(&app, "a@example.com").await;
    let notebook = create_notebook(&app, &token, "Inbox").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notes/import-xml",
        Some(&token),
        Some(json!({
            "xml": "<note><content>no title</content><createdAt>2026-01-01T00:00:00.000Z</createdAt><tags/></note>",
            "notebook": notebook,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SCHEMA_VALIDATION_FAILED");
    let issues = body["errors"].as_array().unwrap();
    assert!(!issues.is_empty());
    assert!(issues[0]["line"].as_u64().unwrap() >= 1);

    let (status, note) = send(
        &app,
        Method::POST,
        "/api/notes/import-xml",
        Some(&token),
        Some(json!({
            "xml": "<note><title>From XML</title><content>ok</content><createdAt>2026-01-01T00:00:00.000Z</createdAt><tags><tag>imported</tag></tags></note>",
            "notebook": notebook,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["title"], "From XML");
    assert_eq!(note["tags"][0], "imported");
}

#[tokio::test]
async fn test_note_filters() {
    let app = app();
    let token = register(&app, "a@example.com").await;
    let notebook = create_notebook(&app, &token, "Work").await;
    let fav = create_note(&app, &token, &notebook, "Starred").await;
    create_note(&app, &token, &notebook, "Plain").await;

    let (_, _) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{fav}"),
        Some(&token),
        Some(json!({ "isFavorite": true })),
    )
    .await;

    let (status, notes) = send(
        &app,
        Method::GET,
        "/api/notes?favorite=true",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let notes = notes.as_array().unwrap().clone();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Starred");

    let (_, notes) = send(
        &app,
        Method::GET,
        "/api/notes?search=plain",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_notebook_cascade_delete_removes_notes() {
    let app = app();
    let token = register(&app, "a@example.com").await;
    let keep = create_notebook(&app, &token, "Keep").await;
    let doomed = create_notebook(&app, &token, "Doomed").await;
    create_note(&app, &token, &keep, "Survivor").await;
    create_note(&app, &token, &doomed, "Gone 1").await;
    create_note(&app, &token, &doomed, "Gone 2").await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/notebooks/{doomed}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedNotes"], 2);

    let (_, notes) = send(&app, Method::GET, "/api/notes", Some(&token), None).await;
    let notes = notes.as_array().unwrap().clone();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["title"], "Survivor");
}

#[tokio::test]
async fn test_notebook_note_count() {
    let app = app();
    let token = register(&app, "a@example.com").await;
    let notebook = create_notebook(&app, &token, "Work").await;
    create_note(&app, &token, &notebook, "One").await;
    create_note(&app, &token, &notebook, "Two").await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/notebooks/{notebook}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["noteCount"], 2);
}

#[tokio::test]
async fn test_optional_fields_absent_when_unset() {
    let app = app();
    let token = register(&app, "a@example.com").await;

    let (status, bare) = send(
        &app,
        Method::POST,
        "/api/notebooks",
        Some(&token),
        Some(json!({ "title": "Bare" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(bare.get("description").is_none());

    let (status, described) = send(
        &app,
        Method::POST,
        "/api/notebooks",
        Some(&token),
        Some(json!({ "title": "Described", "description": "long form" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(described["description"], "long form");

    let notebook = bare["id"].as_str().unwrap();
    let note = create_note(&app, &token, notebook, "Plain").await;
    let (_, fetched) = send(
        &app,
        Method::GET,
        &format!("/api/notes/{note}"),
        Some(&token),
        None,
    )
    .await;
    assert!(fetched.get("coverImage").is_none());

    let (_, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{note}"),
        Some(&token),
        Some(json!({ "coverImage": "https://example.com/a.png" })),
    )
    .await;
    assert_eq!(updated["coverImage"], "https://example.com/a.png");
}

#[tokio::test]
async fn test_health_probes() {
    let app = app();
    let (status, bytes) = send_raw(&app, Method::GET, "/health/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"pong");

    let (status, body) = send(&app, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
