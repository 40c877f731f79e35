use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};

static HTTP_STATUS_RE: OnceLock<Regex> = OnceLock::new();
static FOUND_RE: OnceLock<Regex> = OnceLock::new();
static ERROR_RE: OnceLock<Regex> = OnceLock::new();

/// Semantic label attached to one line of fuzzer output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    Created,
    NoContent,
    MovedPermanently,
    Found,
    Forbidden,
    NotFound,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
    Success,
    Error,
    Unknown,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::NoContent => "No Content",
            Self::MovedPermanently => "Moved Permanently",
            Self::Found => "Found",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
            Self::BadGateway => "Bad Gateway",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::Success => "success",
            Self::Error => "error",
            Self::Unknown => "unknown",
        }
    }

    /// Maps a numeric status through the fixed lookup table; anything
    /// outside it is `Unknown`.
    pub fn from_status_code(code: &str) -> Self {
        match code {
            "200" => Self::Ok,
            "201" => Self::Created,
            "204" => Self::NoContent,
            "301" => Self::MovedPermanently,
            "302" => Self::Found,
            "403" => Self::Forbidden,
            "404" => Self::NotFound,
            "500" => Self::InternalServerError,
            "502" => Self::BadGateway,
            "503" => Self::ServiceUnavailable,
            _ => Self::Unknown,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    pub fn is_error(self) -> bool {
        self == Self::Error
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

fn http_status_re() -> &'static Regex {
    HTTP_STATUS_RE.get_or_init(|| Regex::new(r"HTTP/[\d.]+\s+(\d+)").unwrap())
}

fn found_re() -> &'static Regex {
    FOUND_RE.get_or_init(|| Regex::new(r"\bFound\b").unwrap())
}

fn error_re() -> &'static Regex {
    ERROR_RE.get_or_init(|| Regex::new(r"(?i)\bError\b|\bfailure\b").unwrap())
}

/// Classifies a single line of output.
///
/// An explicit `HTTP/<version> <code>` status line wins over everything
/// else, then the bare word `Found`, then `error`/`failure` in any case.
pub fn classify(line: &str) -> Outcome {
    if let Some(caps) = http_status_re().captures(line) {
        let code = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        return Outcome::from_status_code(code);
    }
    if found_re().is_match(line) {
        return Outcome::Success;
    }
    if error_re().is_match(line) {
        return Outcome::Error;
    }
    Outcome::Unknown
}
