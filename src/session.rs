//! Typed session state on top of [`tower_sessions::Session`].
//!
//! Everything the application keeps per visitor lives in one [`SessionData`]
//! value stored under [`SESSION_KEY`], so a misspelt key cannot silently read
//! back as "missing". [`AuthSession`] is the handle handlers use; it can be
//! extracted directly in axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::error::Result;

/// Key under which [`SessionData`] is stored.
pub const SESSION_KEY: &str = "catalog.session";

/// Everything stored for a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<i32>,
    pub username: Option<String>,
    #[serde(default)]
    pub authenticated: bool,
    pub role: Option<String>,
    /// Set only for device-bound sessions.
    pub device_fingerprint: Option<String>,
    pub ip: Option<String>,
    pub attempt_count: Option<u32>,
    pub target_number: Option<u32>,
}

impl SessionData {
    /// The identity stored in the session, if it is authenticated.
    pub fn principal(&self) -> Option<Principal> {
        if !self.authenticated {
            return None;
        }
        Some(Principal {
            user_id: self.user_id?,
            username: self.username.clone()?,
            role: self.role.clone(),
        })
    }

    pub fn game(&self) -> Option<GameState> {
        Some(GameState {
            attempt_count: self.attempt_count?,
            target_number: self.target_number?,
        })
    }
}

/// An authenticated user as seen by the authorization guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
    /// `None` means the account has no role, which is different from `Some("")`.
    pub role: Option<String>,
}

/// Progress of the number guessing game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub attempt_count: u32,
    pub target_number: u32,
}

/// Fingerprint tying a session to a client: the first 16 hex digits of
/// SHA-256 over the client IP followed by its user agent.
pub fn device_fingerprint(ip: &str, user_agent: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(user_agent.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Session handle with typed accessors.
#[derive(Debug, Clone)]
pub struct AuthSession {
    session: Session,
}

impl AuthSession {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn data(&self) -> Result<SessionData> {
        Ok(self
            .session
            .get::<SessionData>(SESSION_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn store(&self, data: &SessionData) -> Result<()> {
        self.session.insert(SESSION_KEY, data).await?;
        Ok(())
    }

    /// Marks the session as authenticated for the given user.
    ///
    /// The session id is cycled so an id issued before login cannot be
    /// reused afterwards. Game progress survives the login.
    pub async fn create(&self, user_id: i32, username: &str, role: Option<&str>) -> Result<()> {
        self.login(user_id, username, role, None, None).await
    }

    /// Like [`create`](Self::create) but binds the session to a device
    /// fingerprint and remembers the client IP.
    pub async fn create_bound(
        &self,
        user_id: i32,
        username: &str,
        role: Option<&str>,
        fingerprint: &str,
        ip: &str,
    ) -> Result<()> {
        self.login(
            user_id,
            username,
            role,
            Some(fingerprint.to_string()),
            Some(ip.to_string()),
        )
        .await
    }

    async fn login(
        &self,
        user_id: i32,
        username: &str,
        role: Option<&str>,
        device_fingerprint: Option<String>,
        ip: Option<String>,
    ) -> Result<()> {
        let mut data = self.data().await?;
        self.session.cycle_id().await?;

        data.user_id = Some(user_id);
        data.username = Some(username.to_string());
        data.authenticated = true;
        data.role = role.map(str::to_string);
        data.device_fingerprint = device_fingerprint;
        data.ip = ip;
        self.store(&data).await?;
        debug!(user_id, %username, "session created");
        Ok(())
    }

    /// The authenticated user, or `None` when there is no authenticated session.
    pub async fn current(&self) -> Result<Option<Principal>> {
        Ok(self.data().await?.principal())
    }

    /// Like [`current`](Self::current) but also requires the stored device
    /// fingerprint to match. A mismatch destroys the session.
    pub async fn current_bound(&self, fingerprint: &str) -> Result<Option<Principal>> {
        let data = self.data().await?;
        let Some(principal) = data.principal() else {
            return Ok(None);
        };
        if data.device_fingerprint.as_deref() != Some(fingerprint) {
            warn!(
                user_id = principal.user_id,
                "session fingerprint mismatch, destroying session"
            );
            self.destroy().await?;
            return Ok(None);
        }
        Ok(Some(principal))
    }

    /// Whether the client IP differs from the one recorded at login.
    pub async fn ip_changed(&self, ip: &str) -> Result<bool> {
        Ok(self.data().await?.ip.as_deref() != Some(ip))
    }

    /// Clears every field and removes the session from the store.
    pub async fn destroy(&self) -> Result<()> {
        self.session.flush().await?;
        Ok(())
    }

    pub async fn game_state(&self) -> Result<Option<GameState>> {
        Ok(self.data().await?.game())
    }

    /// Starts a new game with no attempts made.
    pub async fn reset_game(&self, target_number: u32) -> Result<GameState> {
        let mut data = self.data().await?;
        data.attempt_count = Some(0);
        data.target_number = Some(target_number);
        self.store(&data).await?;
        Ok(GameState {
            attempt_count: 0,
            target_number,
        })
    }

    /// Counts one more attempt. Returns `None` when no game is running.
    pub async fn record_attempt(&self) -> Result<Option<GameState>> {
        let mut data = self.data().await?;
        let Some(mut game) = data.game() else {
            return Ok(None);
        };
        game.attempt_count += 1;
        data.attempt_count = Some(game.attempt_count);
        self.store(&data).await?;
        Ok(Some(game))
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state)
            .await
            .map(Self::new)
    }
}
