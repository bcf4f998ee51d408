use axum::{extract::State, response::Html, Json};
use serde::Serialize;
use serde_json::{json, Value};

use super::{pages, AppState};
use crate::error::Result;
use crate::session::Principal;

/// An account as listed to administrators; the password hash stays behind.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    id: i32,
    username: String,
    email: Option<String>,
    role: Option<String>,
}

pub async fn dashboard(principal: Principal) -> Html<String> {
    Html(pages::dashboard(&principal))
}

pub async fn users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>> {
    let users = state
        .users
        .get_all()
        .await?
        .into_iter()
        .map(|user| UserSummary {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        })
        .collect();
    Ok(Json(users))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<Value>> {
    let total_users = state.users.get_all().await?.len();
    let total_series = state.catalog.read().await.repository().count();
    Ok(Json(json!({
        "total_users": total_users,
        "total_series": total_series,
    })))
}

/// Landing page for the role-gated probe routes.
pub async fn probe(principal: Principal) -> Html<String> {
    Html(pages::access_granted("Acceso concedido", &principal))
}
