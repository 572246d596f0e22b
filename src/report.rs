use rusqlite::Connection;
use serde_json::json;
use std::io::Write;

use crate::config::ReportView;
use crate::shell::render;
use crate::store;

pub fn run<W: Write>(
    conn: &Connection,
    view: &ReportView,
    as_json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    match view {
        ReportView::Rank => {
            let ranked = store::rank_students(conn)?;
            if as_json {
                writeln!(out, "{}", serde_json::to_string_pretty(&json!({ "students": ranked }))?)?;
            } else {
                render::write_ranking(out, &ranked)?;
            }
        }
        ReportView::Results {
            id_number,
            subject,
        } => {
            let lines = store::fetch_results(conn, id_number, subject.as_deref())?;
            if as_json {
                let value = match &lines {
                    Some(lines) => json!({ "idNumber": id_number, "found": true, "results": lines }),
                    None => json!({ "idNumber": id_number, "found": false, "results": [] }),
                };
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
            } else {
                render::write_results(out, id_number, lines.as_deref())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::store::test_support::{student, subject, teacher};

    fn json_of(conn: &Connection, view: ReportView) -> serde_json::Value {
        let mut buf = Vec::new();
        run(conn, &view, true, &mut buf).expect("report");
        serde_json::from_slice(&buf).expect("json")
    }

    #[test]
    fn results_json_distinguishes_missing_student() {
        let mut conn = db::open_in_memory();
        teacher(&conn, "t1");
        student(&conn, "S001");
        subject(&conn, "Math", "t1", 100);
        store::upsert_result(&mut conn, "S001", "Math", 75).expect("upsert");

        let found = json_of(
            &conn,
            ReportView::Results {
                id_number: "S001".into(),
                subject: None,
            },
        );
        assert_eq!(found["found"], true);
        assert_eq!(found["results"][0]["subjectName"], "Math");
        assert_eq!(found["results"][0]["percent"], 0.75);

        let missing = json_of(
            &conn,
            ReportView::Results {
                id_number: "S404".into(),
                subject: None,
            },
        );
        assert_eq!(missing["found"], false);
    }

    #[test]
    fn rank_json_uses_null_for_no_data() {
        let conn = db::open_in_memory();
        student(&conn, "S001");
        let v = json_of(&conn, ReportView::Rank);
        assert_eq!(v["students"][0]["idNumber"], "S001");
        assert!(v["students"][0]["average"].is_null());
        assert_eq!(v["students"][0]["subjectCount"], 0);
    }
}
