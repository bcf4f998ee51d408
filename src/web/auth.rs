use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

use super::{pages, AppState};
use crate::accounts::{self, RegistrationForm};
use crate::error::Result;
use crate::guard::{optional_auth, LOGIN_PATH};
use crate::session::AuthSession;

const BAD_CREDENTIALS: &str = "Usuario o contraseña incorrectos";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

pub async fn home(session: AuthSession) -> Result<Html<String>> {
    let principal = optional_auth(session.current().await?);
    Ok(Html(pages::home(principal.as_ref())))
}

pub async fn login_form(session: AuthSession) -> Result<Response> {
    if session.current().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(pages::login(None, "")).into_response())
}

pub async fn login(
    State(state): State<AppState>,
    session: AuthSession,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let Some(user) = state.users.authenticate(&form.username, &form.password).await? else {
        return Ok(Html(pages::login(Some(BAD_CREDENTIALS), &form.username)).into_response());
    };

    session
        .create(user.id, &user.username, user.role.as_deref())
        .await?;
    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Redirect::to("/").into_response())
}

pub async fn register_form(session: AuthSession) -> Result<Response> {
    if session.current().await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(pages::register(None, "", "")).into_response())
}

pub async fn register(
    State(state): State<AppState>,
    session: AuthSession,
    Form(form): Form<RegistrationForm>,
) -> Result<Response> {
    match accounts::register(&state.users, &form).await? {
        Ok(user) => {
            session
                .create(user.id, &user.username, user.role.as_deref())
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(reason) => {
            let message = reason.to_string();
            Ok(Html(pages::register(
                Some(&message),
                &form.username,
                form.email().unwrap_or_default(),
            ))
            .into_response())
        }
    }
}

pub async fn logout(session: AuthSession) -> Result<Redirect> {
    session.destroy().await?;
    Ok(Redirect::to(LOGIN_PATH))
}
