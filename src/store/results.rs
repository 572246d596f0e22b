use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;

use super::students::{list_student_numbers, student_key};
use super::subjects::subject_key;
use super::StoreError;
use crate::calc::{self, StudentStanding};

/// One recorded score, joined with its subject. `percent` is a 0-1 fraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultLine {
    pub subject_name: String,
    pub points: i64,
    pub total_points: i64,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Results of one student, optionally narrowed to a single subject.
///
/// `None` means the student does not exist; an existing student with nothing
/// recorded yields an empty list.
pub fn fetch_results(
    conn: &Connection,
    id_number: &str,
    subject_name: Option<&str>,
) -> Result<Option<Vec<ResultLine>>, StoreError> {
    let Some(student_id) = student_key(conn, id_number)? else {
        return Ok(None);
    };
    let subject_name = subject_name.map(str::trim).filter(|s| !s.is_empty());

    let mut stmt = conn.prepare(
        "SELECT s.name, r.points, s.total_points, r.percent
         FROM results r
         JOIN subjects s ON s.id = r.subject_id
         WHERE r.student_id = ?1
           AND (?2 IS NULL OR s.name = ?2)
         ORDER BY s.name",
    )?;
    let lines = stmt
        .query_map((student_id, subject_name), |row| {
            Ok(ResultLine {
                subject_name: row.get(0)?,
                points: row.get(1)?,
                total_points: row.get(2)?,
                percent: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(lines))
}

/// Registers `points` for a student in a subject, replacing any earlier score.
///
/// Lookup and write share one immediate transaction, and the write itself is
/// a single conflict-aware insert, so concurrent registrations of the same
/// pair cannot produce two rows.
pub fn upsert_result(
    conn: &mut Connection,
    id_number: &str,
    subject_name: &str,
    points: i64,
) -> Result<UpsertOutcome, StoreError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let student_id = student_key(&tx, id_number)?
        .ok_or_else(|| StoreError::not_found("student", id_number.trim()))?;
    let (subject_id, total_points) = subject_key(&tx, subject_name)?
        .ok_or_else(|| StoreError::not_found("subject", subject_name.trim()))?;

    if points < 0 || points > total_points {
        return Err(StoreError::invalid(
            "points",
            format!("{points} is outside 0..={total_points}"),
        ));
    }

    let existed = tx
        .query_row(
            "SELECT 1 FROM results WHERE student_id = ? AND subject_id = ?",
            (student_id, subject_id),
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    tx.execute(
        "INSERT INTO results(student_id, subject_id, points)
         VALUES(?, ?, ?)
         ON CONFLICT(student_id, subject_id) DO UPDATE SET points = excluded.points",
        (student_id, subject_id, points),
    )?;
    tx.commit()?;

    let outcome = if existed {
        UpsertOutcome::Updated
    } else {
        UpsertOutcome::Inserted
    };
    tracing::info!(
        id_number = %id_number.trim(),
        subject = %subject_name.trim(),
        points,
        ?outcome,
        "result registered"
    );
    Ok(outcome)
}

/// Overall average of one student; `None` if the student does not exist.
pub fn student_average(
    conn: &Connection,
    id_number: &str,
) -> Result<Option<StudentStanding>, StoreError> {
    let Some(student_id) = student_key(conn, id_number)? else {
        return Ok(None);
    };
    let (average, subject_count): (Option<f64>, i64) = conn.query_row(
        "SELECT AVG(percent), COUNT(*) FROM results WHERE student_id = ?",
        [student_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(Some(StudentStanding {
        id_number: id_number.trim().to_string(),
        average,
        subject_count,
    }))
}

/// Every student's standing, best average first; students without results last.
pub fn rank_students(conn: &Connection) -> Result<Vec<StudentStanding>, StoreError> {
    let mut standings = Vec::new();
    for id_number in list_student_numbers(conn)? {
        if let Some(s) = student_average(conn, &id_number)? {
            standings.push(s);
        }
    }
    calc::rank_standings(&mut standings);
    Ok(standings)
}
