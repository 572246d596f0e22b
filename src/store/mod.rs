//! Data access over users, students, subjects and results.
//!
//! Every function takes the connection explicitly and binds all caller
//! supplied values as statement parameters.

mod results;
mod students;
mod subjects;
mod users;

pub use results::{fetch_results, rank_students, upsert_result, ResultLine, UpsertOutcome};
pub use students::{create_student, list_student_numbers, NewStudent};
pub use subjects::{create_subject, list_subjects, NewSubject};
pub use users::{create_user, find_user, NewUser, Role};

use rusqlite::ffi;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unable to open database {target}: {message}")]
    Connection { target: String, message: String },
    #[error("{entity} {key:?} already exists")]
    DuplicateKey { entity: &'static str, key: String },
    #[error("{entity} {key:?} not found")]
    NotFound { entity: &'static str, key: String },
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Connection { .. } => "db_open_failed",
            StoreError::DuplicateKey { .. } => "duplicate_key",
            StoreError::NotFound { .. } => "not_found",
            StoreError::Invalid { .. } => "bad_params",
            StoreError::Hash(_) => "hash_failed",
            StoreError::Sqlite(_) => "db_query_failed",
        }
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Invalid {
            field,
            message: message.into(),
        }
    }

    /// Only a failure to reach the database ends the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Connection { .. })
    }
}

/// Maps a UNIQUE violation on insert to `DuplicateKey`; anything else passes through.
pub(crate) fn map_insert_error(
    err: rusqlite::Error,
    entity: &'static str,
    key: &str,
) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref e, _) = err {
        if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
            || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        {
            return StoreError::DuplicateKey {
                entity,
                key: key.to_string(),
            };
        }
    }
    StoreError::Sqlite(err)
}

/// Empty or whitespace-only optional text is stored as NULL.
pub(crate) fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub(crate) fn required(field: &'static str, v: &str) -> Result<String, StoreError> {
    let t = v.trim();
    if t.is_empty() {
        return Err(StoreError::invalid(field, "must not be empty"));
    }
    Ok(t.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use rusqlite::Connection;

    pub fn teacher(conn: &Connection, username: &str) -> i64 {
        create_user(
            conn,
            &NewUser {
                username: username.into(),
                password: "correct horse".into(),
                email: None,
                role: Role::Teacher,
                full_name: None,
                phone_number: None,
            },
        )
        .expect("create teacher")
    }

    pub fn student(conn: &Connection, id_number: &str) -> i64 {
        create_student(
            conn,
            &NewStudent {
                id_number: id_number.into(),
                first_name: "Erik".into(),
                last_name: "Johansson".into(),
                date_of_birth: None,
                email: None,
                phone_number: None,
                address: None,
            },
        )
        .expect("create student")
    }

    pub fn subject(conn: &Connection, name: &str, teacher: &str, total_points: i64) -> i64 {
        create_subject(
            conn,
            &NewSubject {
                name: name.into(),
                teacher_username: teacher.into(),
                start_date: None,
                end_date: None,
                total_points,
            },
        )
        .expect("create subject")
    }
}
