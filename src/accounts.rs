//! User accounts backed by Sea-ORM.

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::entity::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::error::{Error, Result};

/// Username of the account created by [`ensure_admin`].
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";
const BOOTSTRAP_ADMIN_PASSWORD: &str = "admin123";
const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@example.com";
const BOOTSTRAP_ADMIN_ROLE: &str = "admin";

/// Repository for user accounts.
///
/// Passwords are hashed with bcrypt before they reach the database and are
/// only ever compared through [`verify_password`](Self::verify_password).
#[derive(Debug, Clone)]
pub struct UserRepository {
    conn: DatabaseConnection,
    hash_cost: u32,
}

impl UserRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Overrides the bcrypt work factor (minimum 4). Tests use the minimum to
    /// stay fast.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Case-sensitive lookup by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.conn)
            .await?)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<user::Model>> {
        Ok(UserEntity::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_all(&self) -> Result<Vec<user::Model>> {
        Ok(UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Inserts a new account, hashing `password` first.
    pub async fn insert_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
        role: Option<&str>,
    ) -> Result<user::Model> {
        let password_hash = bcrypt::hash(password, self.hash_cost)?;
        let model = UserActiveModel {
            id: NotSet,
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            email: Set(email.map(str::to_string)),
            role: Set(role.map(str::to_string)),
        };
        let created = model.insert(&self.conn).await?;
        info!(user_id = created.id, username = %created.username, "user created");
        Ok(created)
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        Ok(bcrypt::verify(password, password_hash)?)
    }

    /// Returns the account when `username` exists and `password` matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<user::Model>> {
        let Some(user) = self.get_by_username(username).await? else {
            debug!(%username, "login for unknown user");
            return Ok(None);
        };
        if self.verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            debug!(%username, "login with wrong password");
            Ok(None)
        }
    }

    /// Replaces the stored hash. Returns `false` when the account is missing.
    pub async fn update_password(&self, id: i32, new_password: &str) -> Result<bool> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(false);
        };
        let password_hash = bcrypt::hash(new_password, self.hash_cost)?;
        let mut active_model = existing.into_active_model();
        active_model.password_hash = Set(password_hash);
        active_model.update(&self.conn).await?;
        info!(user_id = id, "password updated");
        Ok(true)
    }

    /// Sets or clears the role. Returns `false` when the account is missing.
    pub async fn set_role(&self, id: i32, role: Option<&str>) -> Result<bool> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(false);
        };
        let mut active_model = existing.into_active_model();
        active_model.role = Set(role.map(str::to_string));
        active_model.update(&self.conn).await?;
        info!(user_id = id, role = ?role, "role updated");
        Ok(true)
    }
}

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

/// Why a registration was refused. The messages are shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("El nombre de usuario debe tener al menos 3 caracteres")]
    UsernameTooShort,
    #[error("La contraseña debe tener al menos 6 caracteres")]
    PasswordTooShort,
    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,
    #[error("El nombre de usuario ya existe")]
    UsernameTaken,
}

/// Fields posted by the registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl RegistrationForm {
    /// Checks the form on its own; uniqueness is checked by [`register`].
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.username.chars().count() < MIN_USERNAME_CHARS {
            return Err(RegistrationError::UsernameTooShort);
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(RegistrationError::PasswordTooShort);
        }
        if self.password != self.password_confirm {
            return Err(RegistrationError::PasswordMismatch);
        }
        Ok(())
    }

    /// The email, with a blank field treated as absent.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// Validates the form and creates a role-less account.
///
/// The outer `Result` carries infrastructure failures, the inner one the
/// reason shown back to the visitor.
pub async fn register(
    users: &UserRepository,
    form: &RegistrationForm,
) -> Result<Result<user::Model, RegistrationError>> {
    if let Err(e) = form.validate() {
        return Ok(Err(e));
    }
    if users.get_by_username(&form.username).await?.is_some() {
        return Ok(Err(RegistrationError::UsernameTaken));
    }
    insert_registered(users, form).await
}

/// Inserts the account, reporting a lost race on the unique username index
/// as [`RegistrationError::UsernameTaken`].
async fn insert_registered(
    users: &UserRepository,
    form: &RegistrationForm,
) -> Result<Result<user::Model, RegistrationError>> {
    match users
        .insert_user(&form.username, &form.password, form.email(), None)
        .await
    {
        Ok(created) => Ok(Ok(created)),
        Err(Error::Database(e))
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
        {
            debug!(username = %form.username, "username taken at insert");
            Ok(Err(RegistrationError::UsernameTaken))
        }
        Err(e) => Err(e),
    }
}

/// Creates the bootstrap `admin` account when it does not exist yet.
///
/// Returns whether an account was created.
pub async fn ensure_admin(users: &UserRepository) -> Result<bool> {
    if users.get_by_username(BOOTSTRAP_ADMIN_USERNAME).await?.is_some() {
        debug!("bootstrap admin already present");
        return Ok(false);
    }
    users
        .insert_user(
            BOOTSTRAP_ADMIN_USERNAME,
            BOOTSTRAP_ADMIN_PASSWORD,
            Some(BOOTSTRAP_ADMIN_EMAIL),
            Some(BOOTSTRAP_ADMIN_ROLE),
        )
        .await?;
    warn!(
        username = BOOTSTRAP_ADMIN_USERNAME,
        "created bootstrap admin with the default password; change it after the first login"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::migration::Migrator;

    async fn repository() -> UserRepository {
        // one connection, otherwise every pooled connection gets its own memory db
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);
        let conn = Database::connect(opt).await.unwrap();
        Migrator::up(&conn, None).await.unwrap();
        UserRepository::new(conn).with_hash_cost(4)
    }

    #[tokio::test]
    async fn inserted_users_store_a_hash() {
        let users = repository().await;
        let created = users
            .insert_user("ana", "secreto1", Some("ana@example.com"), None)
            .await
            .unwrap();

        assert_ne!(created.password_hash, "secreto1");
        assert!(users.verify_password("secreto1", &created.password_hash).unwrap());
        assert!(!users.verify_password("otra", &created.password_hash).unwrap());
        assert_eq!(created.role, None);
    }

    #[tokio::test]
    async fn username_lookup_is_case_sensitive() {
        let users = repository().await;
        users.insert_user("Ana", "secreto1", None, None).await.unwrap();

        assert!(users.get_by_username("Ana").await.unwrap().is_some());
        assert!(users.get_by_username("ana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let users = repository().await;
        users.insert_user("luis", "clave123", None, None).await.unwrap();

        assert!(users.authenticate("luis", "clave123").await.unwrap().is_some());
        assert!(users.authenticate("luis", "nope").await.unwrap().is_none());
        assert!(users.authenticate("nadie", "clave123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn password_and_role_updates() {
        let users = repository().await;
        let created = users.insert_user("eva", "antigua1", None, None).await.unwrap();

        assert!(users.update_password(created.id, "nueva123").await.unwrap());
        assert!(users.authenticate("eva", "nueva123").await.unwrap().is_some());

        assert!(users.set_role(created.id, Some("teacher")).await.unwrap());
        let stored = users.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.role.as_deref(), Some("teacher"));

        assert!(users.set_role(created.id, Some("")).await.unwrap());
        let stored = users.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.role.as_deref(), Some(""));

        assert!(!users.set_role(999, None).await.unwrap());
        assert!(!users.update_password(999, "x").await.unwrap());
    }

    fn registration(username: &str, password: &str, confirm: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.into(),
            password: password.into(),
            password_confirm: confirm.into(),
            email: Some("  ".into()),
        }
    }

    #[test]
    fn registration_rules() {
        assert_eq!(
            registration("ab", "secreto1", "secreto1").validate(),
            Err(RegistrationError::UsernameTooShort)
        );
        assert_eq!(
            registration("ana", "corto", "corto").validate(),
            Err(RegistrationError::PasswordTooShort)
        );
        assert_eq!(
            registration("ana", "secreto1", "secreto2").validate(),
            Err(RegistrationError::PasswordMismatch)
        );
        assert_eq!(registration("ana", "secreto1", "secreto1").validate(), Ok(()));
        assert_eq!(registration("ana", "x", "x").email(), None);
    }

    #[tokio::test]
    async fn register_refuses_taken_usernames() {
        let users = repository().await;
        let form = registration("marta", "secreto1", "secreto1");

        let created = register(&users, &form).await.unwrap().unwrap();
        assert_eq!(created.email, None);
        assert_eq!(created.role, None);

        assert_eq!(
            register(&users, &form).await.unwrap(),
            Err(RegistrationError::UsernameTaken)
        );
    }

    #[tokio::test]
    async fn concurrent_registration_maps_unique_violation() {
        let users = repository().await;
        let form = registration("marta", "secreto1", "secreto1");
        register(&users, &form).await.unwrap().unwrap();

        // a second request that passed the lookup before the first insert landed
        assert_eq!(
            insert_registered(&users, &form).await.unwrap(),
            Err(RegistrationError::UsernameTaken)
        );
        assert_eq!(users.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ensure_admin_runs_once() {
        let users = repository().await;
        assert!(ensure_admin(&users).await.unwrap());
        assert!(!ensure_admin(&users).await.unwrap());

        let all = users.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].role.as_deref(), Some("admin"));
    }
}
