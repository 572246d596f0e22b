use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

use crate::store::StoreError;

pub fn open_db(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Connection {
            target: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;
    }
    let conn = Connection::open(path).map_err(|e| StoreError::Connection {
        target: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })?;
    prepare(&conn).map_err(|e| StoreError::Connection {
        target: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "database opened");
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    prepare(&conn).expect("prepare in-memory db");
    conn
}

/// Closes the handle, surfacing any error SQLite reports while finalizing.
pub fn close(conn: Connection) -> Result<(), StoreError> {
    conn.close().map_err(|(_, e)| StoreError::from(e))
}

fn prepare(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    ensure_schema(conn)
}

/// Creates tables, indexes and the percent triggers. Safe to run on every open.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email TEXT,
            role TEXT NOT NULL CHECK (role IN ('teacher', 'parent')),
            full_name TEXT,
            phone_number TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            id_number TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            date_of_birth TEXT,
            email TEXT,
            phone_number TEXT,
            address TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            teacher_id INTEGER NOT NULL,
            start_date TEXT,
            end_date TEXT,
            total_points INTEGER NOT NULL CHECK (total_points > 0),
            FOREIGN KEY(teacher_id) REFERENCES users(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subjects_teacher ON subjects(teacher_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS results(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            subject_id INTEGER NOT NULL,
            points INTEGER NOT NULL CHECK (points >= 0),
            percent REAL,
            FOREIGN KEY(student_id) REFERENCES students(id),
            FOREIGN KEY(subject_id) REFERENCES subjects(id),
            UNIQUE(student_id, subject_id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_results_subject ON results(subject_id)",
        [],
    )?;

    // SQLite cannot assign NEW in a BEFORE trigger, so the recompute runs as
    // an AFTER trigger inside the same statement.
    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS results_percent_on_insert
         AFTER INSERT ON results
         BEGIN
            UPDATE results
               SET percent = CAST(NEW.points AS REAL)
                   / (SELECT total_points FROM subjects WHERE id = NEW.subject_id)
             WHERE id = NEW.id;
         END",
        [],
    )?;
    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS results_percent_on_update
         AFTER UPDATE OF points, subject_id ON results
         BEGIN
            UPDATE results
               SET percent = CAST(NEW.points AS REAL)
                   / (SELECT total_points FROM subjects WHERE id = NEW.subject_id)
             WHERE id = NEW.id;
         END",
        [],
    )?;
    conn.execute(
        "CREATE TRIGGER IF NOT EXISTS subjects_total_points_on_update
         AFTER UPDATE OF total_points ON subjects
         BEGIN
            UPDATE results
               SET percent = CAST(points AS REAL) / NEW.total_points
             WHERE subject_id = NEW.id;
         END",
        [],
    )?;

    Ok(())
}

pub fn table_row_count(conn: &Connection, table: &str) -> Result<i64, StoreError> {
    // Table names cannot be bound; only the fixed schema names are accepted.
    let sql = match table {
        "users" => "SELECT COUNT(*) FROM users",
        "students" => "SELECT COUNT(*) FROM students",
        "subjects" => "SELECT COUNT(*) FROM subjects",
        "results" => "SELECT COUNT(*) FROM results",
        other => {
            return Err(StoreError::Invalid {
                field: "table",
                message: format!("unknown table {other}"),
            })
        }
    };
    Ok(conn.query_row(sql, [], |r| r.get(0))?)
}
