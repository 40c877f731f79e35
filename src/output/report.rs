use std::path::Path;

use crate::classifier::Outcome;
use crate::recorder::OutputRecord;
use crate::utils;

use super::OutputError;

const REPORT_HEADER: &str = "\n----- Post-Processing Report -----\n";
const SUCCESS_HEADER: &str = "\n----- Successful Requests -----\n";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SummaryReport {
    /// Per-outcome counts, in the order each outcome was first seen.
    pub counts: Vec<(Outcome, usize)>,
    pub successes: Vec<String>,
}

impl SummaryReport {
    pub fn generate(records: &[OutputRecord]) -> Self {
        let mut report = Self::default();
        for record in records {
            match report.counts.iter_mut().find(|(o, _)| *o == record.outcome) {
                Some((_, count)) => *count += 1,
                None => report.counts.push((record.outcome, 1)),
            }
            if record.outcome.is_success() {
                report.successes.push(record.raw_text.clone());
            }
        }
        report
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.counts
            .iter()
            .find(|(o, _)| *o == outcome)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::from(REPORT_HEADER);
        for (outcome, count) in &self.counts {
            out.push_str(&format!("{}: {}\n", utils::capitalize(outcome.label()), count));
        }
        if !self.successes.is_empty() {
            out.push_str(SUCCESS_HEADER);
            out.push_str(&self.successes.join("\n"));
        }
        out
    }
}

pub async fn write_report(path: &Path, report: &SummaryReport) -> Result<(), OutputError> {
    super::write_file("report", path, report.render_text().as_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(outcomes: &[(&str, Outcome)]) -> Vec<OutputRecord> {
        outcomes
            .iter()
            .map(|(line, outcome)| OutputRecord::new(line, *outcome))
            .collect()
    }

    #[test]
    fn counts_by_outcome_and_lists_successes() {
        let recs = records(&[
            ("HTTP/1.1 200 OK", Outcome::Ok),
            ("boom error", Outcome::Error),
            ("HTTP/1.1 200 OK again", Outcome::Ok),
            ("admin Found", Outcome::Success),
        ]);
        let report = SummaryReport::generate(&recs);
        assert_eq!(report.count(Outcome::Ok), 2);
        assert_eq!(report.count(Outcome::Error), 1);
        assert_eq!(report.count(Outcome::Success), 1);
        assert_eq!(report.count(Outcome::Unknown), 0);
        assert_eq!(report.successes, vec!["admin Found".to_string()]);
    }

    #[test]
    fn renders_capitalized_labels_in_first_seen_order() {
        let recs = records(&[
            ("HTTP/1.1 404 Not Found", Outcome::NotFound),
            ("x Found", Outcome::Success),
            ("noise", Outcome::Unknown),
            ("y Found", Outcome::Success),
        ]);
        let text = SummaryReport::generate(&recs).render_text();
        assert_eq!(
            text,
            "\n----- Post-Processing Report -----\n\
             Not found: 1\n\
             Success: 2\n\
             Unknown: 1\n\
             \n----- Successful Requests -----\n\
             x Found\n\
             y Found"
        );
    }

    #[test]
    fn omits_success_section_when_nothing_succeeded() {
        let recs = records(&[("HTTP/1.1 200 OK", Outcome::Ok)]);
        let text = SummaryReport::generate(&recs).render_text();
        assert_eq!(text, "\n----- Post-Processing Report -----\nOk: 1\n");
    }

    #[test]
    fn empty_run_renders_header_only() {
        let text = SummaryReport::generate(&[]).render_text();
        assert_eq!(text, REPORT_HEADER);
    }

    #[tokio::test]
    async fn write_report_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.txt");
        let err = write_report(&path, &SummaryReport::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OutputError::Open { kind: "report", .. }));
    }
}
