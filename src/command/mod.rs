use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_PROGRAM: &str = "ffuf";
pub const FUZZ_KEYWORD: &str = "FUZZ";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program} is not installed or not in PATH")]
    NotInstalled {
        program: String,
        #[source]
        source: which::Error,
    },
}

/// Everything needed to build one fuzzer invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandConfig {
    pub program: String,
    pub target_url: String,
    pub wordlist: PathBuf,
    pub method: reqwest::Method,
    pub headers: Vec<String>,
    pub cookies: Option<String>,
    pub extra_args: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuzzCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl FuzzCommand {
    pub fn build(config: &CommandConfig) -> Self {
        let mut args: Vec<String> = vec![
            "-u".to_string(),
            fuzz_url(&config.target_url),
            "-w".to_string(),
            config.wordlist.to_string_lossy().to_string(),
            "-X".to_string(),
            config.method.as_str().to_string(),
        ];
        args.extend(config.extra_args.iter().cloned());
        if let Some(cookies) = config.cookies.as_deref().map(str::trim) {
            if !cookies.is_empty() {
                args.push("-H".to_string());
                args.push(format!("Cookie: {cookies}"));
            }
        }
        for header in config.headers.iter().map(|h| h.trim()) {
            if header.is_empty() {
                continue;
            }
            args.push("-H".to_string());
            args.push(header.to_string());
        }
        Self {
            program: config.program.clone(),
            args,
        }
    }

    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Shell-quoted rendering, for display only.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(|a| a.as_str()))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Appends `/FUZZ` unless the URL already carries the keyword.
pub fn fuzz_url(target_url: &str) -> String {
    let trimmed = target_url.trim();
    if trimmed.contains(FUZZ_KEYWORD) {
        return trimmed.to_string();
    }
    format!("{}/{}", trimmed.trim_end_matches('/'), FUZZ_KEYWORD)
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@%+".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

pub fn check_dependency(program: &str) -> Result<PathBuf, CommandError> {
    which::which(program).map_err(|source| CommandError::NotInstalled {
        program: program.to_string(),
        source,
    })
}
