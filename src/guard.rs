//! Authorization guards.
//!
//! A request either has no authenticated session, which ends in
//! [`Rejection::Unauthenticated`] (a 303 redirect to the login page), or it
//! has a [`Principal`] that is then handed through an ordered
//! [`GuardPipeline`]. Each stage returns the principal unchanged or stops the
//! request with [`Rejection::Forbidden`] (a 403 page). Nothing is remembered
//! between requests.
//!
//! ```
//! use series_catalog::guard::{GuardPipeline, RoleGuard};
//! use series_catalog::session::Principal;
//!
//! let staff = GuardPipeline::authenticated()
//!     .then(RoleGuard::any_of(["teacher", "admin"]));
//!
//! let teacher = Principal { user_id: 1, username: "ana".into(), role: Some("teacher".into()) };
//! assert!(staff.run(Some(teacher)).is_ok());
//! assert!(staff.run(None).is_err());
//! ```

use std::{fmt, sync::Arc};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tracing::debug;

use crate::session::{AuthSession, Principal};
use crate::web::pages;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Shown as the current role of a principal that has none.
pub const NO_ROLE_LABEL: &str = "sin rol";

pub const ADMIN_ROLE: &str = "admin";
pub const SUPERADMIN_ROLE: &str = "superadmin";

const INSUFFICIENT_PERMISSIONS: &str = "No tienes permisos suficientes para acceder a esta página.";

/// What a forbidden visitor is told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub message: String,
    pub required_role: String,
    /// The principal's role, or [`NO_ROLE_LABEL`].
    pub current_role: String,
    pub icon: String,
}

/// Terminal outcome of a guard for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Unauthenticated,
    Forbidden(Denial),
}

pub type GuardResult = Result<Principal, Rejection>;

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::Unauthenticated => Redirect::to(LOGIN_PATH).into_response(),
            Rejection::Forbidden(denial) => {
                (StatusCode::FORBIDDEN, Html(pages::forbidden(&denial))).into_response()
            }
        }
    }
}

pub fn require_auth(current: Option<Principal>) -> GuardResult {
    current.ok_or(Rejection::Unauthenticated)
}

/// Never rejects; handlers use it to personalise public pages.
pub fn optional_auth(current: Option<Principal>) -> Option<Principal> {
    current
}

pub fn require_role(current: Option<Principal>, role: &str) -> GuardResult {
    require_auth(current).and_then(|p| RoleGuard::exact(role).check(p))
}

pub fn require_any_role<I, R>(current: Option<Principal>, roles: I) -> GuardResult
where
    I: IntoIterator<Item = R>,
    R: Into<String>,
{
    require_auth(current).and_then(|p| RoleGuard::any_of(roles).check(p))
}

pub fn require_admin(current: Option<Principal>) -> GuardResult {
    require_auth(current).and_then(|p| RoleGuard::admin().check(p))
}

pub fn require_superadmin(current: Option<Principal>) -> GuardResult {
    require_auth(current).and_then(|p| RoleGuard::superadmin().check(p))
}

/// One stage of a [`GuardPipeline`].
pub trait Guard: Send + Sync {
    fn check(&self, principal: Principal) -> GuardResult;
}

impl<F> Guard for F
where
    F: Fn(Principal) -> GuardResult + Send + Sync,
{
    fn check(&self, principal: Principal) -> GuardResult {
        self(principal)
    }
}

/// Admits principals whose role is one of a fixed set.
///
/// A principal without a role never matches, not even a guard built for the
/// empty role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    allowed: Vec<String>,
    message: String,
    required_role: String,
    icon: &'static str,
}

impl RoleGuard {
    pub fn exact(role: impl Into<String>) -> Self {
        let role = role.into();
        Self {
            required_role: format!("Se requiere rol: {role}"),
            allowed: vec![role],
            message: INSUFFICIENT_PERMISSIONS.to_string(),
            icon: "🚫",
        }
    }

    pub fn any_of<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let allowed: Vec<String> = roles.into_iter().map(Into::into).collect();
        Self {
            required_role: format!("Roles permitidos: {}", allowed.join(", ")),
            allowed,
            message: INSUFFICIENT_PERMISSIONS.to_string(),
            icon: "⚠️",
        }
    }

    pub fn admin() -> Self {
        Self {
            allowed: vec![ADMIN_ROLE.to_string(), SUPERADMIN_ROLE.to_string()],
            message: "Esta página requiere permisos de Administrador.".to_string(),
            required_role: "Roles permitidos: admin, superadmin".to_string(),
            icon: "🔒",
        }
    }

    pub fn superadmin() -> Self {
        Self {
            allowed: vec![SUPERADMIN_ROLE.to_string()],
            message: "Esta página requiere permisos de Super Administrador.".to_string(),
            required_role: "Solo el super administrador tiene acceso".to_string(),
            icon: "👑",
        }
    }

    pub fn permits(&self, role: Option<&str>) -> bool {
        role.is_some_and(|role| self.allowed.iter().any(|allowed| allowed == role))
    }

    fn deny(&self, principal: &Principal) -> Denial {
        Denial {
            message: self.message.clone(),
            required_role: self.required_role.clone(),
            current_role: principal
                .role
                .clone()
                .unwrap_or_else(|| NO_ROLE_LABEL.to_string()),
            icon: self.icon.to_string(),
        }
    }
}

impl Guard for RoleGuard {
    fn check(&self, principal: Principal) -> GuardResult {
        if self.permits(principal.role.as_deref()) {
            Ok(principal)
        } else {
            debug!(
                user_id = principal.user_id,
                role = ?principal.role,
                allowed = ?self.allowed,
                "role check failed"
            );
            Err(Rejection::Forbidden(self.deny(&principal)))
        }
    }
}

/// Ordered guard stages behind a mandatory authentication check.
#[derive(Clone, Default)]
pub struct GuardPipeline {
    stages: Vec<Arc<dyn Guard>>,
}

impl fmt::Debug for GuardPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardPipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl GuardPipeline {
    /// A pipeline that only requires an authenticated session.
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn then(mut self, guard: impl Guard + 'static) -> Self {
        self.stages.push(Arc::new(guard));
        self
    }

    pub fn admin() -> Self {
        Self::authenticated().then(RoleGuard::admin())
    }

    pub fn superadmin() -> Self {
        Self::authenticated().then(RoleGuard::superadmin())
    }

    /// Runs authentication and then every stage in order, stopping at the
    /// first rejection.
    pub fn run(&self, current: Option<Principal>) -> GuardResult {
        self.stages
            .iter()
            .try_fold(require_auth(current)?, |principal, stage| {
                stage.check(principal)
            })
    }
}

/// Middleware running `pipeline` against the session of every request.
///
/// The admitted [`Principal`] is stored in the request extensions, where
/// handlers pick it up by extracting `Principal`.
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use series_catalog::guard::{enforce, GuardPipeline};
///
/// let admin_only: Router = Router::new()
///     .route("/panel", get(|| async { "ok" }))
///     .route_layer(middleware::from_fn_with_state(GuardPipeline::admin(), enforce));
/// ```
pub async fn enforce(
    State(pipeline): State<GuardPipeline>,
    session: AuthSession,
    mut request: Request,
    next: Next,
) -> Response {
    let current = match session.current().await {
        Ok(current) => current,
        Err(e) => return e.into_response(),
    };
    match pipeline.run(current) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(rejection) => {
            debug!(path = %request.uri().path(), ?rejection, "request rejected by guard");
            rejection.into_response()
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(Rejection::Unauthenticated)
    }
}
