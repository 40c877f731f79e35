use crate::classifier::{classify, Outcome};
use crate::output::report::SummaryReport;
use crate::recorder::{record, OutputRecord, RunCounters};

fn feed(lines: &[&str]) -> (RunCounters, Vec<OutputRecord>) {
    let mut counters = RunCounters::default();
    let mut results = Vec::new();
    for line in lines {
        let outcome = record(line, classify(line), &mut results);
        counters.observe(outcome);
    }
    (counters, results)
}

#[test]
fn pipeline_classifies_records_and_summarizes() {
    let (counters, results) = feed(&[
        "HTTP/1.1 200 OK",
        "dial tcp: connection Error",
        "HTTP/1.1 200 OK cached",
        "backup.zip Found",
    ]);
    assert_eq!(counters.requests_made, 4);
    assert_eq!(counters.successful_responses, 1);
    assert_eq!(counters.error_count, 1);

    let report = SummaryReport::generate(&results);
    assert_eq!(
        report.counts,
        vec![(Outcome::Ok, 2), (Outcome::Error, 1), (Outcome::Success, 1)]
    );
    assert_eq!(report.successes, vec!["backup.zip Found".to_string()]);
}

#[test]
fn moved_status_is_not_counted_as_success() {
    let (counters, results) = feed(&["HTTP/1.1 302 Found"]);
    assert_eq!(results[0].outcome, Outcome::Found);
    assert_eq!(counters.successful_responses, 0);
    assert!(SummaryReport::generate(&results).successes.is_empty());
}

#[tokio::test]
async fn result_file_is_a_json_array_of_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ffuf_results.json");
    let (_, results) = feed(&["HTTP/1.1 404 Not Found", "admin Found"]);

    crate::output::write_results(&path, &results).await.unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {
                "output": "HTTP/1.1 404 Not Found",
                "status": "Not Found",
                "details": { "status_code": "404", "status_message": "Not Found" }
            },
            { "output": "admin Found", "status": "success", "details": {} }
        ])
    );
}

#[tokio::test]
async fn result_file_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ffuf_results.json");
    std::fs::write(&path, "x".repeat(4096)).unwrap();

    crate::output::write_results(&path, &[]).await.unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value, serde_json::json!([]));
}

#[cfg(unix)]
#[tokio::test]
async fn streamed_run_feeds_the_report() {
    use std::time::Duration;

    use crate::command::FuzzCommand;
    use crate::runner::{Options, Runner, Termination};

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("ffuf_summary_report.txt");
    let command = FuzzCommand {
        program: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            "echo 'HTTP/1.1 200 OK'; echo 'Error: rate limited'; echo 'admin Found'".to_string(),
        ],
    };
    let result = Runner::new(Options::new(command, Duration::from_secs(10)))
        .unwrap()
        .run(&indicatif::ProgressBar::hidden())
        .await
        .unwrap();
    assert_eq!(result.termination, Termination::Exited(Some(0)));

    let report = SummaryReport::generate(&result.records);
    crate::output::report::write_report(&report_path, &report)
        .await
        .unwrap();

    let text = std::fs::read_to_string(&report_path).unwrap();
    assert_eq!(
        text,
        "\n----- Post-Processing Report -----\nOk: 1\nError: 1\nSuccess: 1\n\n----- Successful Requests -----\nadmin Found"
    );
}
