//! # Series Catalog
//!
//! An in-memory TV series catalog served by a small [axum](https://crates.io/crates/axum)
//! application with cookie-backed sessions from
//! [`tower-sessions`](https://crates.io/crates/tower-sessions), user accounts stored through
//! [Sea-ORM](https://crates.io/crates/sea-orm) and role-based authorization guards.
//!
//! ## Features
//!
//! - Series repository with repository-assigned ids, substring search and statistics
//! - Validation of client input against a configurable year/rating window
//! - bcrypt-hashed user accounts with optional roles
//! - Typed session state, including device-bound sessions
//! - Composable guard pipelines (`require_auth`, `require_role`, `require_admin`, ...)
//!
//! ## Catalog
//!
//! ```
//! use series_catalog::catalog::{SeriesManager, SeriesRepository, SeriesUpdate};
//!
//! let mut catalog = SeriesManager::new(SeriesRepository::seeded());
//!
//! // The seeded id counter restarts at 6.
//! let created = catalog.create("Dark", "Ciencia Ficción", 3, 2017, 8.7);
//! assert_eq!(created.id, 6);
//!
//! // Partial update: only the rating changes.
//! let update = SeriesUpdate { rating: Some(9.0), ..Default::default() };
//! assert!(catalog.update(1, update));
//!
//! let stats = catalog.statistics();
//! assert_eq!(stats.total_count, 11);
//! ```
//!
//! ## Guards
//!
//! ```
//! use series_catalog::guard::{require_role, Rejection};
//! use series_catalog::session::Principal;
//!
//! let user = Principal { user_id: 1, username: "ana".into(), role: None };
//! match require_role(Some(user), "admin") {
//!     Err(Rejection::Forbidden(denial)) => assert_eq!(denial.current_role, "sin rol"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Running the web application
//!
//! ```no_run
//! use sea_orm::Database;
//! use sea_orm_migration::MigratorTrait;
//! use series_catalog::{
//!     accounts::UserRepository, catalog::{SeriesManager, SeriesRepository},
//!     config::Config, migration::Migrator, web,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let conn = Database::connect(config.database_url.as_str()).await?;
//! Migrator::up(&conn, None).await?;
//!
//! let state = web::AppState::new(
//!     SeriesManager::new(SeriesRepository::seeded()),
//!     UserRepository::new(conn),
//!     config.bounds,
//! );
//! let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//! axum::serve(listener, web::app(state, &config)).await?;
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod catalog;
pub mod config;
pub mod entity;
pub mod error;
pub mod guard;
pub mod migration;
pub mod session;
pub mod web;

pub use error::{Error, Result};
pub use session::AuthSession;
