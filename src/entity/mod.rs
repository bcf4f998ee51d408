//! Database entity models.
//!
//! Only user accounts are persisted; the series catalog lives in memory and
//! session state lives in the `tower-sessions` store.

/// User account entity backing [`UserRepository`](crate::accounts::UserRepository).
pub mod user;
