use std::io::{self, Write};

use crate::calc::{self, StudentStanding};
use crate::store::ResultLine;

const NO_DATA: &str = "no data";

pub fn write_ranking<W: Write>(out: &mut W, ranked: &[StudentStanding]) -> io::Result<()> {
    if ranked.is_empty() {
        return writeln!(out, "no students in database.");
    }
    writeln!(
        out,
        "{:<6}{:<16}{:<16}{}",
        "Rank", "Student id", "Total average", "Number of subjects"
    )?;
    for (s, pos) in ranked.iter().zip(calc::rank_positions(ranked)) {
        let rank = pos.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
        let average = s
            .average
            .map(|a| format!("{a:.2}"))
            .unwrap_or_else(|| NO_DATA.into());
        writeln!(
            out,
            "{:<6}{:<16}{:<16}{}",
            rank, s.id_number, average, s.subject_count
        )?;
    }
    Ok(())
}

pub fn write_results<W: Write>(
    out: &mut W,
    id_number: &str,
    lines: Option<&[ResultLine]>,
) -> io::Result<()> {
    let Some(lines) = lines else {
        return writeln!(out, "student {} not found.", id_number.trim());
    };
    if lines.is_empty() {
        return writeln!(out, "no results recorded for {}.", id_number.trim());
    }
    writeln!(
        out,
        "{:<16}{:<8}{:<24}{}",
        "Subject", "Points", "Maximum possible points", "Percent"
    )?;
    for l in lines {
        writeln!(
            out,
            "{:<16}{:<8}{:<24}{:.2}",
            l.subject_name, l.points, l.total_points, l.percent
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn ranking_shows_no_data_rows() {
        let ranked = vec![
            StudentStanding {
                id_number: "S002".into(),
                average: Some(0.95),
                subject_count: 1,
            },
            StudentStanding {
                id_number: "S009".into(),
                average: None,
                subject_count: 0,
            },
        ];
        let text = render(|b| write_ranking(b, &ranked));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1     S002"));
        assert!(lines[1].contains("0.95"));
        assert!(lines[2].starts_with("-     S009"));
        assert!(lines[2].contains(NO_DATA));
    }

    #[test]
    fn missing_and_empty_results_read_differently() {
        let missing = render(|b| write_results(b, "S404", None));
        let empty = render(|b| write_results(b, "S001", Some(&[][..])));
        assert_eq!(missing, "student S404 not found.\n");
        assert_eq!(empty, "no results recorded for S001.\n");
    }

    #[test]
    fn result_percent_has_two_decimals() {
        let lines = [ResultLine {
            subject_name: "Math".into(),
            points: 75,
            total_points: 100,
            percent: 0.75,
        }];
        let text = render(|b| write_results(b, "S001", Some(&lines[..])));
        assert!(text.lines().nth(1).expect("row").ends_with("0.75"));
    }
}
