use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::command::{self, CommandConfig, FuzzCommand};
use crate::config::{self, ConfigFile};
use crate::output::{self, report::SummaryReport};
use crate::runner::{self, RunResult, Runner, Termination};
use crate::utils;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RESULT_FILE: &str = "ffuf_results.json";
const DEFAULT_LOG_FILE: &str = "ffuf_output.log";
const DEFAULT_REPORT_FILE: &str = "ffuf_summary_report.txt";

fn print_banner() {
    const BANNER: &str = r#"
     ____                       _ __      __
    / __/_  __________  ____  (_) /___  / /_
   / /_/ / / /_  /_  / / __ \/ / / __ \/ __/
  / __/ /_/ / / /_/ /_/ /_/ / / / /_/ / /_
 /_/  \__,_/ /___/___/ .___/_/_/\____/\__/
                    /_/
       v0.1.0 - ffuf front-end and output classifier
    "#;
    print!("{}", BANNER);
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    command: CommandConfig,
    timeout: u64,
    result_file: PathBuf,
    log_file: PathBuf,
    report_file: PathBuf,
    no_color: bool,
    quiet: bool,
    assume_yes: bool,
    warnings: Vec<String>,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let mut warnings: Vec<String> = Vec::new();

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };
    let quiet = args.quiet || cfg.quiet.unwrap_or(false);

    let target_url = args
        .url
        .or(cfg.target_url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    let wordlist = args
        .wordlist
        .or(cfg.wordlist)
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty());
    let (target_url, wordlist) = match (target_url, wordlist) {
        (Some(url), Some(wordlist)) => (url, config::expand_tilde(&wordlist)),
        _ => {
            return Err(
                "target URL and wordlist are required (--url and --wordlist, or set them in the config file)"
                    .to_string(),
            )
        }
    };
    validation::validate_target_url(&target_url)
        .map_err(|e| format!("invalid target URL '{target_url}': {e}"))?;
    validation::validate_wordlist(&wordlist)?;

    let method_raw = args
        .method
        .or(cfg.method)
        .unwrap_or_else(|| "GET".to_string());
    let method = match utils::parse_http_method(&method_raw) {
        Ok(method) => method,
        Err(e) => {
            warnings.push(format!("{e}; defaulting to GET"));
            reqwest::Method::GET
        }
    };

    let mut headers = cfg.headers.map(|h| h.into_vec()).unwrap_or_default();
    headers.extend(
        args.header
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty()),
    );
    let cookies = args
        .cookies
        .or(cfg.cookies)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let extra_args = if args.extra_args.is_empty() {
        cfg.extra_args.unwrap_or_default()
    } else {
        args.extra_args
    };

    let timeout = args.timeout.or(cfg.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout == 0 {
        return Err("invalid timeout, expected positive number of seconds".to_string());
    }

    let program = args
        .bin
        .or(cfg.bin)
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| command::DEFAULT_PROGRAM.to_string());

    let result_file = config::expand_tilde(
        &args
            .result_file
            .or(cfg.result_file)
            .unwrap_or_else(|| DEFAULT_RESULT_FILE.to_string()),
    );
    let log_file = config::expand_tilde(
        &args
            .log_file
            .or(cfg.log_file)
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
    );
    let report_file = config::expand_tilde(
        &args
            .report_file
            .or(cfg.report_file)
            .unwrap_or_else(|| DEFAULT_REPORT_FILE.to_string()),
    );

    Ok(RunConfig {
        command: CommandConfig {
            program,
            target_url,
            wordlist,
            method,
            headers,
            cookies,
            extra_args,
        },
        timeout,
        result_file,
        log_file,
        report_file,
        no_color,
        quiet,
        assume_yes: args.yes,
        warnings,
    })
}

async fn confirm(prompt: &str) -> Result<bool, String> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{prompt} (y/n): ").as_bytes())
        .await
        .map_err(|e| format!("failed to write prompt: {e}"))?;
    stdout
        .flush()
        .await
        .map_err(|e| format!("failed to write prompt: {e}"))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines
        .next_line()
        .await
        .map_err(|e| format!("failed to read answer: {e}"))?
        .unwrap_or_default();
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn build_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(500));
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.blue} {elapsed} [{bar:30}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars(r#"#>-"#));
    }
    pb
}

fn print_results_summary(result: &RunResult, run: &RunConfig) {
    match &result.termination {
        Termination::TimedOut => utils::print_warning(&format!(
            "Timeout exceeded after {} seconds. Stopped the process.",
            run.timeout
        )),
        Termination::Aborted(reason) => {
            utils::print_error(&format!("An unexpected error occurred: {reason}"))
        }
        Termination::Exited(Some(0)) => {}
        Termination::Exited(code) => {
            let status = code
                .map(|c| format!("status {c}"))
                .unwrap_or_else(|| "a signal".to_string());
            utils::print_warning(&format!(
                "{} exited with {status}",
                run.command.program
            ));
            for line in result.stderr_tail.iter() {
                println!("    {}", line.dimmed());
            }
        }
    }

    println!();
    println!("{}", "----- Results Summary -----".bold().white());
    println!(
        "Total Requests Made: {}",
        result.counters.requests_made.to_string().bold().cyan()
    );
    println!(
        "Total Successful Responses: {}",
        result.counters.successful_responses.to_string().bold().green()
    );
    println!(
        "Total Errors: {}",
        result.counters.error_count.to_string().bold().red()
    );
    println!();
}

async fn persist(result: &RunResult, result_file: &Path, report_file: &Path) {
    match output::write_results(result_file, &result.records).await {
        Ok(()) => utils::print_info(&format!("Results saved to {}", result_file.display())),
        Err(e) => utils::print_error(&format!("Error saving results to file: {e}")),
    }

    let report = SummaryReport::generate(&result.records);
    match output::report::write_report(report_file, &report).await {
        Ok(()) => utils::print_info(&format!(
            "Summary report saved to {}",
            report_file.display()
        )),
        Err(e) => utils::print_error(&format!("Error saving summary report: {e}")),
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    for warning in run.warnings.iter() {
        utils::print_warning(warning);
    }

    command::check_dependency(&run.command.program).map_err(|e| e.to_string())?;

    let fuzz_command = FuzzCommand::build(&run.command);

    format_kv_line("Target", &command::fuzz_url(&run.command.target_url));
    format_kv_line(
        "Wordlist",
        &run.command.wordlist.display().to_string(),
    );
    format_kv_line(
        "Request",
        &format!(
            "method={} headers={} cookies={}",
            run.command.method,
            run.command.headers.len(),
            if run.command.cookies.is_some() { "on" } else { "off" }
        ),
    );
    format_kv_line("Timeout", &format!("{}s", run.timeout));
    format_kv_line(
        "Output",
        &format!(
            "results={} log={} report={}",
            run.result_file.display(),
            run.log_file.display(),
            run.report_file.display()
        ),
    );
    format_kv_line("Command", &fuzz_command.display());
    println!();

    if !run.assume_yes && !confirm("Do you want to proceed with this command?").await? {
        utils::print_info("Fuzzing canceled by the user.");
        return Ok(());
    }

    let total_entries = match utils::count_wordlist_entries(&run.command.wordlist).await {
        Ok(n) => n,
        Err(e) => {
            utils::print_warning(&format!("could not count wordlist entries: {e}"));
            0
        }
    };

    let mut options = runner::Options::new(fuzz_command, Duration::from_secs(run.timeout));
    options.log_file = Some(run.log_file.clone());
    options.echo_lines = !run.quiet;
    let runner = Runner::new(options).map_err(|e| e.to_string())?;

    let now = Instant::now();
    let pb = build_progress_bar(total_entries);
    let result = runner.run(&pb).await;
    pb.finish_and_clear();
    let result = result.map_err(|e| e.to_string())?;

    print_results_summary(&result, &run);
    persist(&result, &run.result_file, &run.report_file).await;

    let elapsed_time = now.elapsed();

    println!();
    println!(":: Completed :: run took {}s ::", elapsed_time.as_secs());

    Ok(())
}

fn init_config(path: Option<PathBuf>) -> Result<(), String> {
    let path = path
        .or_else(config::default_config_path)
        .ok_or_else(|| "could not determine a config path, pass --config".to_string())?;
    if config::ensure_default_config_file(&path)? {
        println!("Config written to {}", path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print().map_err(|e| e.to_string())?;
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));
    if args.init_config {
        return init_config(user_config_path);
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
