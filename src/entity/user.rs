//! User account entity.
//!
//! Maps to the `users` table created by
//! [`Migrator`](crate::migration::Migrator).

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model for a user account.
///
/// # Database Schema
///
/// | Column        | Type                 | Description                          |
/// |---------------|----------------------|--------------------------------------|
/// | id            | INTEGER (Primary Key)| Auto-incremented account id          |
/// | username      | TEXT UNIQUE          | Login name, compared case-sensitively|
/// | password_hash | TEXT                 | bcrypt hash, never the plaintext     |
/// | email         | TEXT NULL            | Optional contact address             |
/// | role          | TEXT NULL            | Optional role; NULL means "no role"  |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, column_type = "Text")]
    pub username: String,

    #[sea_orm(column_type = "Text")]
    pub password_hash: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub email: Option<String>,

    /// `None` is kept distinct from every role string, including `""`.
    #[sea_orm(column_type = "Text", nullable)]
    pub role: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
