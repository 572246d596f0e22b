use serde::Serialize;
use std::cmp::Ordering;

/// A student's overall average (mean of result percents, 0-1) and how many
/// subjects it was taken over. `average` is `None` when nothing is recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStanding {
    pub id_number: String,
    pub average: Option<f64>,
    pub subject_count: i64,
}

/// Best average first. Students with no data sort after everyone with data;
/// equal averages fall back to id-number so output is deterministic.
pub fn compare_standings(a: &StudentStanding, b: &StudentStanding) -> Ordering {
    let by_average = match (a.average, b.average) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_average.then_with(|| a.id_number.cmp(&b.id_number))
}

pub fn rank_standings(standings: &mut [StudentStanding]) {
    standings.sort_by(compare_standings);
}

/// Dense 1-based rank positions; tied averages share a position and
/// no-data students get none.
pub fn rank_positions(ranked: &[StudentStanding]) -> Vec<Option<usize>> {
    let mut out = Vec::with_capacity(ranked.len());
    let mut position = 0usize;
    let mut previous: Option<f64> = None;
    for s in ranked {
        match s.average {
            None => out.push(None),
            Some(avg) => {
                if previous.map(|p| (p - avg).abs() > f64::EPSILON).unwrap_or(true) {
                    position += 1;
                }
                previous = Some(avg);
                out.push(Some(position));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(id: &str, average: Option<f64>) -> StudentStanding {
        StudentStanding {
            id_number: id.to_string(),
            average,
            subject_count: if average.is_some() { 1 } else { 0 },
        }
    }

    #[test]
    fn ranks_descending_with_no_data_last() {
        let mut v = vec![
            standing("A", None),
            standing("B", Some(0.5)),
            standing("C", Some(0.9)),
            standing("D", Some(0.7)),
        ];
        rank_standings(&mut v);
        let ids: Vec<&str> = v.iter().map(|s| s.id_number.as_str()).collect();
        assert_eq!(ids, vec!["C", "D", "B", "A"]);
    }

    #[test]
    fn ties_break_on_id_number() {
        let mut v = vec![
            standing("Z", Some(0.8)),
            standing("M", None),
            standing("A", Some(0.8)),
            standing("B", None),
        ];
        rank_standings(&mut v);
        let ids: Vec<&str> = v.iter().map(|s| s.id_number.as_str()).collect();
        assert_eq!(ids, vec!["A", "Z", "B", "M"]);
    }

    #[test]
    fn positions_share_ties_and_skip_no_data() {
        let ranked = vec![
            standing("A", Some(0.9)),
            standing("B", Some(0.9)),
            standing("C", Some(0.4)),
            standing("D", None),
        ];
        assert_eq!(
            rank_positions(&ranked),
            vec![Some(1), Some(1), Some(2), None]
        );
    }
}
