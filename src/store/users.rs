use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{map_insert_error, non_empty, required, StoreError};
use crate::auth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "teacher" => Ok(Role::Teacher),
            "parent" => Ok(Role::Parent),
            other => Err(StoreError::invalid(
                "role",
                format!("{other:?} is not one of teacher, parent"),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Role,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

/// The credential view of an account used by login.
#[derive(Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            role: row.get(3)?,
        })
    }

    fn into_user(self) -> Result<User, StoreError> {
        Ok(User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            role: self.role.parse()?,
        })
    }
}

pub fn create_user(conn: &Connection, user: &NewUser) -> Result<i64, StoreError> {
    let username = required("username", &user.username)?;
    let password_hash = auth::hash_password(&user.password)?;

    conn.execute(
        "INSERT INTO users(username, password_hash, email, role, full_name, phone_number)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &username,
            &password_hash,
            non_empty(user.email.as_deref()),
            user.role.as_str(),
            non_empty(user.full_name.as_deref()),
            non_empty(user.phone_number.as_deref()),
        ),
    )
    .map_err(|e| map_insert_error(e, "user", &username))?;

    let id = conn.last_insert_rowid();
    tracing::info!(user_id = id, username = %username, role = %user.role, "user created");
    Ok(id)
}

pub fn find_user(conn: &Connection, username: &str) -> Result<Option<User>, StoreError> {
    conn.query_row(
        "SELECT id, username, password_hash, role
         FROM users
         WHERE username = ?",
        [username.trim()],
        UserRow::from_row,
    )
    .optional()?
    .map(UserRow::into_user)
    .transpose()
}
