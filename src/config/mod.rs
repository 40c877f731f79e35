use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(alias = "url")]
    pub target_url: Option<String>,
    pub wordlist: Option<String>,
    #[serde(alias = "http_method")]
    pub method: Option<String>,
    pub headers: Option<HeaderList>,
    pub cookies: Option<String>,
    #[serde(alias = "additional_options")]
    pub extra_args: Option<Vec<String>>,
    pub timeout: Option<u64>,
    pub result_file: Option<String>,
    pub log_file: Option<String>,
    pub report_file: Option<String>,
    #[serde(alias = "ffuf_bin")]
    pub bin: Option<String>,
    pub no_color: Option<bool>,
    pub quiet: Option<bool>,
}

/// Headers may be written as a YAML list or as one comma-separated string.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum HeaderList {
    List(Vec<String>),
    Csv(String),
}

impl HeaderList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(items) => items
                .into_iter()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect(),
            Self::Csv(raw) => crate::utils::split_csv(&raw),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".fuzzpilot").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

fn default_config_yaml() -> String {
    r#"# fuzzpilot config
#
# Location (default):
#   ~/.fuzzpilot/config.yml

# Target (FUZZ is appended as the last path segment unless present)
# target_url: https://example.com
# wordlist: ./wordlists/common.txt

# Request
method: GET
# headers:
#   - "X-Forwarded-For: 127.0.0.1"
# cookies: "session=abc; theme=dark"

# Extra arguments passed to ffuf as-is
# extra_args: ["-mc", "200,301,302"]

# Stop the run after this many seconds
timeout: 10

# Output
result_file: ffuf_results.json
log_file: ffuf_output.log
report_file: ffuf_summary_report.txt

# bin: ffuf
no_color: false
quiet: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
