use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{find_user, map_insert_error, required, Role, StoreError};

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
    pub name: String,
    /// Subjects are linked to their teacher by username.
    pub teacher_username: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_points: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub teacher_username: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_points: i64,
}

pub fn create_subject(conn: &Connection, subject: &NewSubject) -> Result<i64, StoreError> {
    let name = required("subject name", &subject.name)?;
    if subject.total_points <= 0 {
        return Err(StoreError::invalid(
            "total_points",
            format!("must be greater than zero, got {}", subject.total_points),
        ));
    }
    if let (Some(start), Some(end)) = (subject.start_date, subject.end_date) {
        if end < start {
            return Err(StoreError::invalid(
                "end_date",
                format!("{end} is before start date {start}"),
            ));
        }
    }

    let teacher = match find_user(conn, &subject.teacher_username)? {
        Some(u) if u.role == Role::Teacher => u,
        _ => return Err(StoreError::not_found("teacher", subject.teacher_username.trim())),
    };

    conn.execute(
        "INSERT INTO subjects(name, teacher_id, start_date, end_date, total_points)
         VALUES(?, ?, ?, ?, ?)",
        (
            &name,
            teacher.id,
            subject.start_date,
            subject.end_date,
            subject.total_points,
        ),
    )
    .map_err(|e| map_insert_error(e, "subject", &name))?;

    let id = conn.last_insert_rowid();
    tracing::info!(subject_id = id, name = %name, teacher = %teacher.username, "subject created");
    Ok(id)
}

pub fn list_subjects(conn: &Connection) -> Result<Vec<Subject>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, u.username, s.start_date, s.end_date, s.total_points
         FROM subjects s
         JOIN users u ON u.id = s.teacher_id
         ORDER BY s.name",
    )?;
    let subjects = stmt
        .query_map([], |row| {
            Ok(Subject {
                id: row.get(0)?,
                name: row.get(1)?,
                teacher_username: row.get(2)?,
                start_date: row.get(3)?,
                end_date: row.get(4)?,
                total_points: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(subjects)
}

/// `(id, total_points)` of the named subject.
pub(crate) fn subject_key(
    conn: &Connection,
    name: &str,
) -> Result<Option<(i64, i64)>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id, total_points FROM subjects WHERE name = ?",
            [name.trim()],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::teacher;
    use crate::store::{create_user, NewUser};
    use crate::db;

    fn art(teacher: &str) -> NewSubject {
        NewSubject {
            name: "Art".into(),
            teacher_username: teacher.into(),
            start_date: NaiveDate::from_ymd_opt(2024, 9, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 15),
            total_points: 50,
        }
    }

    #[test]
    fn create_links_teacher_by_username() {
        let conn = db::open_in_memory();
        teacher(&conn, "linda_white");
        create_subject(&conn, &art("linda_white")).expect("create");

        let subjects = list_subjects(&conn).expect("list");
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].teacher_username, "linda_white");
        assert_eq!(subjects[0].total_points, 50);
        assert_eq!(subjects[0].end_date, NaiveDate::from_ymd_opt(2024, 12, 15));
        assert_eq!(subject_key(&conn, "Art").expect("key").map(|k| k.1), Some(50));
    }

    #[test]
    fn unknown_or_non_teacher_owner_is_not_found() {
        let conn = db::open_in_memory();
        create_user(
            &conn,
            &NewUser {
                username: "bob_smith".into(),
                password: "bobpass123".into(),
                email: None,
                role: Role::Parent,
                full_name: None,
                phone_number: None,
            },
        )
        .expect("parent");

        for owner in ["nobody", "bob_smith"] {
            let err = create_subject(&conn, &art(owner)).unwrap_err();
            assert_eq!(err.code(), "not_found", "owner {owner}");
        }
        assert_eq!(db::table_row_count(&conn, "subjects").expect("count"), 0);
    }

    #[test]
    fn non_positive_total_points_is_invalid() {
        let conn = db::open_in_memory();
        teacher(&conn, "linda_white");
        let mut s = art("linda_white");
        s.total_points = 0;
        assert_eq!(create_subject(&conn, &s).unwrap_err().code(), "bad_params");
    }

    #[test]
    fn end_before_start_is_invalid() {
        let conn = db::open_in_memory();
        teacher(&conn, "linda_white");
        let mut s = art("linda_white");
        s.end_date = NaiveDate::from_ymd_opt(2024, 8, 1);
        assert_eq!(create_subject(&conn, &s).unwrap_err().code(), "bad_params");
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let conn = db::open_in_memory();
        teacher(&conn, "linda_white");
        create_subject(&conn, &art("linda_white")).expect("create");
        let err = create_subject(&conn, &art("linda_white")).unwrap_err();
        assert_eq!(err.code(), "duplicate_key");
        assert_eq!(db::table_row_count(&conn, "subjects").expect("count"), 1);
    }
}
