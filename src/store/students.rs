use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;

use super::{map_insert_error, non_empty, required, StoreError};

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub id_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

pub fn create_student(conn: &Connection, student: &NewStudent) -> Result<i64, StoreError> {
    let id_number = required("id_number", &student.id_number)?;
    let first_name = required("first_name", &student.first_name)?;
    let last_name = required("last_name", &student.last_name)?;

    conn.execute(
        "INSERT INTO students(
           id_number,
           first_name,
           last_name,
           date_of_birth,
           email,
           phone_number,
           address
         ) VALUES(?, ?, ?, ?, ?, ?, ?)",
        (
            &id_number,
            &first_name,
            &last_name,
            student.date_of_birth,
            non_empty(student.email.as_deref()),
            non_empty(student.phone_number.as_deref()),
            non_empty(student.address.as_deref()),
        ),
    )
    .map_err(|e| map_insert_error(e, "student", &id_number))?;

    let id = conn.last_insert_rowid();
    tracing::info!(student_id = id, id_number = %id_number, "student created");
    Ok(id)
}

/// External id-numbers of every student, in id-number order.
pub fn list_student_numbers(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare("SELECT id_number FROM students ORDER BY id_number")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

pub(crate) fn student_key(conn: &Connection, id_number: &str) -> Result<Option<i64>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id FROM students WHERE id_number = ?",
            [id_number.trim()],
            |r| r.get(0),
        )
        .optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn erik() -> NewStudent {
        NewStudent {
            id_number: "AB12345678".into(),
            first_name: "Erik".into(),
            last_name: "Johansson".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2005, 5, 15),
            email: Some("erik.johansson@student.school.com".into()),
            phone_number: Some("0701234567".into()),
            address: Some("Storgatan 1, 111 29 Stockholm".into()),
        }
    }

    #[test]
    fn create_stores_birth_date_as_iso_text() {
        let conn = db::open_in_memory();
        let id = create_student(&conn, &erik()).expect("create");

        let dob: String = conn
            .query_row("SELECT date_of_birth FROM students WHERE id = ?", [id], |r| {
                r.get(0)
            })
            .expect("dob");
        assert_eq!(dob, "2005-05-15");
        assert_eq!(student_key(&conn, " AB12345678 ").expect("key"), Some(id));
    }

    #[test]
    fn duplicate_id_number_is_rejected() {
        let conn = db::open_in_memory();
        create_student(&conn, &erik()).expect("create");

        let mut again = erik();
        again.first_name = "Someone".into();
        let err = create_student(&conn, &again).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateKey { entity: "student", ref key } if key == "AB12345678"
        ));
        assert_eq!(db::table_row_count(&conn, "students").expect("count"), 1);
    }

    #[test]
    fn list_is_sorted_by_id_number() {
        let conn = db::open_in_memory();
        for id in ["ST01234567", "AB12345678", "KL67890123"] {
            let mut s = erik();
            s.id_number = id.into();
            create_student(&conn, &s).expect("create");
        }
        assert_eq!(
            list_student_numbers(&conn).expect("list"),
            vec!["AB12345678", "KL67890123", "ST01234567"]
        );
    }
}
