use std::path::Path;

use colored::Colorize;
use indicatif::ProgressBar;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const SUPPORTED_METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "HEAD"];

/// Upper-cases the first character and lower-cases the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

pub fn parse_http_method(value: &str) -> Result<reqwest::Method, String> {
    let canonical = value.trim().to_ascii_uppercase();
    if canonical.is_empty() {
        return Err("method is empty".to_string());
    }
    if !SUPPORTED_METHODS.contains(&canonical.as_str()) {
        return Err(format!(
            "unsupported method '{}', expected one of {}",
            value.trim(),
            SUPPORTED_METHODS.join(",")
        ));
    }
    reqwest::Method::from_bytes(canonical.as_bytes())
        .map_err(|_| format!("invalid method '{}'", value.trim()))
}

/// Splits a comma-separated list, dropping blank items. Repeated items are
/// kept since each one becomes its own header.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn count_wordlist_entries(path: &Path) -> std::io::Result<u64> {
    let handle = File::open(path).await?;
    let mut lines = BufReader::new(handle).lines();
    let mut count = 0u64;
    while let Some(_line) = lines.next_line().await? {
        count += 1;
    }
    Ok(count)
}

pub fn tag(label: &str) -> String {
    let colored_label = match label {
        "ERR" => label.bold().red(),
        "WRN" => label.bold().yellow(),
        "OK" => label.bold().green(),
        _ => label.bold().blue(),
    };
    format!("{}{}{}", "[".bold().white(), colored_label, "]".bold().white())
}

/// Prints above the progress bar, or straight to stdout when the bar is not
/// drawn (e.g. stderr is not a terminal).
pub fn pb_println(pb: &ProgressBar, message: String) {
    if pb.is_hidden() {
        println!("{message}");
    } else {
        pb.println(message);
    }
}

pub fn print_info(message: &str) {
    println!("{} {}", tag("INF"), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", tag("WRN"), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", tag("ERR"), message);
}
