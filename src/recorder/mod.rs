use serde::Serialize;

use crate::classifier::Outcome;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RecordDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// One non-empty line of tool output together with its classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    #[serde(rename = "output")]
    pub raw_text: String,
    #[serde(rename = "status")]
    pub outcome: Outcome,
    pub details: RecordDetails,
}

impl OutputRecord {
    pub fn new(line: &str, outcome: Outcome) -> Self {
        Self {
            raw_text: line.to_string(),
            outcome,
            details: parse_details(line),
        }
    }

    pub fn status_code(&self) -> Option<&str> {
        self.details.status_code.as_deref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.details.status_message.as_deref()
    }
}

fn parse_details(line: &str) -> RecordDetails {
    if !line.contains("HTTP") {
        return RecordDetails::default();
    }
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.get(1) {
        Some(code) if !code.is_empty() && code.chars().all(|c| c.is_ascii_digit()) => {
            RecordDetails {
                status_code: Some(code.to_string()),
                status_message: Some(parts[2..].join(" ")),
            }
        }
        _ => RecordDetails::default(),
    }
}

/// Appends a record for `line` and hands the outcome back for bookkeeping.
pub fn record(line: &str, outcome: Outcome, results: &mut Vec<OutputRecord>) -> Outcome {
    results.push(OutputRecord::new(line, outcome));
    outcome
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub requests_made: usize,
    pub successful_responses: usize,
    pub error_count: usize,
}

impl RunCounters {
    pub fn observe(&mut self, outcome: Outcome) {
        self.requests_made += 1;
        if outcome.is_success() {
            self.successful_responses += 1;
        } else if outcome.is_error() {
            self.error_count += 1;
        }
    }
}
