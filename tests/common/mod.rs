#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

use series_catalog::accounts::UserRepository;
use series_catalog::catalog::{SeriesManager, SeriesRepository};
use series_catalog::config::Config;
use series_catalog::migration::Migrator;
use series_catalog::web::{self, AppState};

pub const PASSWORD: &str = "secreto123";

/// Build the full application over a seeded catalog and a fresh in-memory
/// database holding one account per role:
///
/// | username | role       |
/// |----------|------------|
/// | admin    | admin      |
/// | boss     | superadmin |
/// | teacher1 | teacher    |
/// | student  | (none)     |
///
/// Every account uses [`PASSWORD`].
pub async fn build_test_app() -> Router {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let conn = Database::connect(opt).await.unwrap();
    Migrator::up(&conn, None).await.unwrap();

    let users = UserRepository::new(conn).with_hash_cost(4);
    for (username, role) in [
        ("admin", Some("admin")),
        ("boss", Some("superadmin")),
        ("teacher1", Some("teacher")),
        ("student", None),
    ] {
        users
            .insert_user(username, PASSWORD, None, role)
            .await
            .unwrap();
    }

    let config = Config::default();
    let state = AppState::new(
        SeriesManager::new(SeriesRepository::seeded()),
        users,
        config.bounds,
    );
    web::app(state, &config)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

/// The `name=value` pair of the session cookie set by a response.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Log in through the form and return the session cookie.
pub async fn login(app: &Router, username: &str) -> String {
    let form = format!("username={username}&password={PASSWORD}");
    let response = send(app, post_form("/auth/login", &form, None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    session_cookie(&response).expect("login must set the session cookie")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
