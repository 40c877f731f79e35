use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.url.as_deref() {
        validate_target_url(raw).map_err(|e| format!("invalid --url '{raw}': {e}"))?;
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive number of seconds".to_string());
        }
    }
    if let Some(bin) = args.bin.as_deref() {
        if bin.trim().is_empty() {
            return Err("invalid --bin, expected a program name or path".to_string());
        }
    }
    Ok(())
}

pub fn validate_target_url(raw: &str) -> Result<(), String> {
    let parsed = reqwest::Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{other}', expected http or https")),
    }
}

pub fn validate_wordlist(path: &std::path::Path) -> Result<(), String> {
    if path.is_file() {
        Ok(())
    } else {
        Err(format!(
            "wordlist '{}' does not exist or cannot be accessed",
            path.display()
        ))
    }
}
