//! Demo dataset and random result population.

use anyhow::Context;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use serde::Deserialize;

use crate::store::{self, NewStudent, NewSubject, NewUser, StoreError};

const DEMO_DATASET: &str = include_str!("../fixtures/seed.json");

#[derive(Debug, Deserialize)]
pub struct Dataset {
    pub users: Vec<NewUser>,
    pub students: Vec<NewStudent>,
    pub subjects: Vec<NewSubject>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

pub fn demo_dataset() -> anyhow::Result<Dataset> {
    serde_json::from_str(DEMO_DATASET).context("failed to parse embedded demo dataset")
}

/// Loads `dataset`, users first so subjects can resolve their teachers.
///
/// Rows that already exist, and subjects whose teacher is missing, are
/// reported and skipped; any other failure aborts.
pub fn load(conn: &Connection, dataset: &Dataset) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for u in &dataset.users {
        tally(&mut summary, store::create_user(conn, u), "user", &u.username)?;
    }
    for s in &dataset.students {
        tally(&mut summary, store::create_student(conn, s), "student", &s.id_number)?;
    }
    for s in &dataset.subjects {
        tally(&mut summary, store::create_subject(conn, s), "subject", &s.name)?;
    }

    tracing::info!(created = summary.created, skipped = summary.skipped, "dataset loaded");
    Ok(summary)
}

fn tally(
    summary: &mut SeedSummary,
    res: Result<i64, StoreError>,
    what: &str,
    key: &str,
) -> anyhow::Result<()> {
    match res {
        Ok(_) => summary.created += 1,
        Err(e @ (StoreError::DuplicateKey { .. } | StoreError::NotFound { .. })) => {
            tracing::warn!(error = %e, "skipping {what} {key}");
            summary.skipped += 1;
        }
        Err(e) => return Err(e).with_context(|| format!("failed to seed {what} {key}")),
    }
    Ok(())
}

/// Registers `count` results for random (student, subject) pairs with points
/// drawn from each subject's full range. Returns how many registrations ran.
pub fn populate_results<R: Rng>(
    conn: &mut Connection,
    count: usize,
    rng: &mut R,
) -> anyhow::Result<usize> {
    let students = store::list_student_numbers(conn)?;
    let subjects = store::list_subjects(conn)?;
    if students.is_empty() || subjects.is_empty() {
        tracing::warn!("no students or subjects to register results for");
        return Ok(0);
    }

    for _ in 0..count {
        let (Some(id_number), Some(subject)) = (students.choose(rng), subjects.choose(rng)) else {
            break;
        };
        let points = rng.gen_range(0..=subject.total_points);
        store::upsert_result(conn, id_number, &subject.name, points)
            .with_context(|| format!("failed to register {id_number} / {}", subject.name))?;
    }
    Ok(count)
}
