//! The axum application.
//!
//! [`app`] wires every route, the guard pipelines and the session layer.
//! The catalog is shared behind a [`RwLock`] because handlers run
//! concurrently while [`SeriesManager`] itself does no locking.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use time::Duration;
use tokio::sync::RwLock;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::accounts::UserRepository;
use crate::catalog::{SeriesManager, ValidationBounds};
use crate::config::Config;
use crate::guard::{enforce, GuardPipeline, RoleGuard};

mod admin;
mod auth;
mod game;
pub mod pages;
mod series;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<SeriesManager>>,
    pub users: UserRepository,
    pub bounds: ValidationBounds,
}

impl AppState {
    pub fn new(catalog: SeriesManager, users: UserRepository, bounds: ValidationBounds) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            users,
            bounds,
        }
    }
}

/// Cookie-backed session layer over an in-process store.
pub fn session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            config.session_inactivity_hours,
        )))
}

/// All routes, without the session layer.
pub fn router(state: AppState) -> Router {
    let series = Router::new()
        .route("/", get(series::list).post(series::create))
        .route("/search", get(series::search))
        .route("/stats", get(series::stats))
        .route("/{id}", get(series::show).post(series::update))
        .route_layer(middleware::from_fn_with_state(
            GuardPipeline::authenticated(),
            enforce,
        ))
        .merge(
            Router::new()
                .route("/{id}/delete", post(series::delete))
                .route_layer(middleware::from_fn_with_state(
                    GuardPipeline::admin(),
                    enforce,
                )),
        );

    let admin = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route_layer(middleware::from_fn_with_state(
            GuardPipeline::authenticated(),
            enforce,
        ))
        .merge(
            Router::new()
                .route("/users", get(admin::users))
                .route("/stats", get(admin::stats))
                .route_layer(middleware::from_fn_with_state(
                    GuardPipeline::admin(),
                    enforce,
                )),
        );

    let probes = Router::new()
        .route(
            "/admin",
            get(admin::probe).route_layer(middleware::from_fn_with_state(
                GuardPipeline::admin(),
                enforce,
            )),
        )
        .route(
            "/superadmin",
            get(admin::probe).route_layer(middleware::from_fn_with_state(
                GuardPipeline::superadmin(),
                enforce,
            )),
        )
        .route(
            "/teacher",
            get(admin::probe).route_layer(middleware::from_fn_with_state(
                GuardPipeline::authenticated().then(RoleGuard::exact("teacher")),
                enforce,
            )),
        )
        .route(
            "/staff",
            get(admin::probe).route_layer(middleware::from_fn_with_state(
                GuardPipeline::authenticated()
                    .then(RoleGuard::any_of(["teacher", "admin", "coordinator"])),
                enforce,
            )),
        );

    let auth = Router::new()
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/registro", get(auth::register_form).post(auth::register))
        .route("/logout", get(auth::logout));

    Router::new()
        .route("/", get(auth::home))
        .route("/juego", get(game::show).post(game::guess))
        .nest("/auth", auth)
        .nest("/series", series)
        .nest("/admin", admin)
        .nest("/test", probes)
        .with_state(state)
}

/// The complete application: routes plus session handling.
pub fn app(state: AppState, config: &Config) -> Router {
    router(state).layer(session_layer(config))
}
