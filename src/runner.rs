use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::ProgressBar;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::time::Instant;

use crate::classifier;
use crate::command::FuzzCommand;
use crate::output::log::LogSink;
use crate::recorder::{self, OutputRecord, RunCounters};
use crate::utils;

pub const STDERR_TAIL_LINES: usize = 20;

// how long to wait for the stderr drain after the child is gone; a
// grandchild can keep the pipe open long after the tool was killed.
const STDERR_GRACE: Duration = Duration::from_millis(250);

#[derive(Clone, Debug)]
pub struct Options {
    pub command: FuzzCommand,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
    pub echo_lines: bool,
}

impl Options {
    pub fn new(command: FuzzCommand, timeout: Duration) -> Self {
        Self {
            command,
            timeout,
            log_file: None,
            echo_lines: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("command program is empty")]
    EmptyProgram,

    #[error("timeout must be greater than zero")]
    InvalidTimeout,

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stream} of {program} was not captured")]
    MissingPipe {
        program: String,
        stream: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The tool closed its output and exited on its own.
    Exited(Option<i32>),
    TimedOut,
    /// Reading the output failed; whatever was collected so far is kept.
    Aborted(String),
}

#[derive(Clone, Debug)]
pub struct RunResult {
    pub counters: RunCounters,
    pub records: Vec<OutputRecord>,
    pub termination: Termination,
    pub elapsed: Duration,
    pub stderr_tail: Vec<String>,
}

impl RunResult {
    pub fn timed_out(&self) -> bool {
        self.termination == Termination::TimedOut
    }
}

#[derive(Clone, Debug)]
pub struct Runner {
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.command.program.trim().is_empty() {
            return Err(RunnerError::EmptyProgram);
        }
        if options.timeout.is_zero() {
            return Err(RunnerError::InvalidTimeout);
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Launches the tool and streams its standard output until it exits or
    /// the timeout elapses.
    ///
    /// Only a failure to launch is returned as an error. Once the tool is
    /// running every record read so far ends up in the result, including
    /// when reading breaks half-way.
    pub async fn run(&self, pb: &ProgressBar) -> Result<RunResult, RunnerError> {
        let started_at = Instant::now();
        let deadline = started_at + self.options.timeout;
        let program = self.options.command.program.clone();

        let mut child = self
            .options
            .command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| RunnerError::MissingPipe {
            program: program.clone(),
            stream: "stdout",
        })?;
        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(drain_stderr(stderr, stderr_tail.clone())));

        let mut log = match self.options.log_file.as_deref() {
            Some(path) => match LogSink::open(path).await {
                Ok(sink) => sink,
                Err(e) => {
                    utils::pb_println(pb, format!("{} {e}", utils::tag("WRN")));
                    LogSink::disabled()
                }
            },
            None => LogSink::disabled(),
        };

        let mut records: Vec<OutputRecord> = Vec::new();
        let mut counters = RunCounters::default();
        let mut reader = BufReader::new(stdout);
        let mut buf: Vec<u8> = Vec::new();

        let termination = loop {
            buf.clear();
            let read = match tokio::time::timeout_at(deadline, reader.read_until(b'\n', &mut buf))
                .await
            {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    stop(&mut child).await;
                    break Termination::Aborted(format!("failed to read output: {e}"));
                }
                Err(_) => {
                    stop(&mut child).await;
                    break Termination::TimedOut;
                }
            };

            if read == 0 {
                break match tokio::time::timeout_at(deadline, child.wait()).await {
                    Ok(Ok(status)) => Termination::Exited(status.code()),
                    Ok(Err(e)) => {
                        stop(&mut child).await;
                        Termination::Aborted(format!("failed to wait for {program}: {e}"))
                    }
                    Err(_) => {
                        stop(&mut child).await;
                        Termination::TimedOut
                    }
                };
            }

            let decoded = String::from_utf8_lossy(&buf);
            let line = decoded.trim_end();
            if let Err(e) = log.append(line).await {
                utils::pb_println(pb, format!("{} {e}", utils::tag("WRN")));
            }
            if self.options.echo_lines {
                utils::pb_println(pb, line.to_string());
            }
            let outcome = recorder::record(line, classifier::classify(line), &mut records);
            counters.observe(outcome);
            pb.inc(1);

            if started_at.elapsed() > self.options.timeout {
                stop(&mut child).await;
                break Termination::TimedOut;
            }
        };

        if let Err(e) = log.close().await {
            utils::pb_println(pb, format!("{} {e}", utils::tag("WRN")));
        }

        if let Some(mut handle) = stderr_task {
            if tokio::time::timeout(STDERR_GRACE, &mut handle).await.is_err() {
                handle.abort();
            }
        }
        let stderr_tail = take_tail(&stderr_tail);

        Ok(RunResult {
            counters,
            records,
            termination,
            elapsed: started_at.elapsed(),
            stderr_tail,
        })
    }
}

async fn stop(child: &mut Child) {
    // the child may already be gone; there is nothing left to report then
    let _ = child.kill().await;
}

async fn drain_stderr<R>(stderr: R, tail: Arc<Mutex<VecDeque<String>>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = BufReader::new(stderr);
    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = String::from_utf8_lossy(&buf).trim_end().to_string();
        if line.is_empty() {
            continue;
        }
        if let Ok(mut tail) = tail.lock() {
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
    }
}

fn take_tail(tail: &Mutex<VecDeque<String>>) -> Vec<String> {
    match tail.lock() {
        Ok(mut tail) => tail.drain(..).collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::classifier::Outcome;

    fn shell(script: &str, timeout: Duration) -> Options {
        Options::new(
            FuzzCommand {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), script.to_string()],
            },
            timeout,
        )
    }

    async fn run(options: Options) -> RunResult {
        Runner::new(options)
            .unwrap()
            .run(&ProgressBar::hidden())
            .await
            .unwrap()
    }

    #[test]
    fn rejects_zero_timeout_and_empty_program() {
        let err = Runner::new(shell("true", Duration::ZERO)).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidTimeout));

        let mut options = shell("true", Duration::from_secs(1));
        options.command.program = " ".to_string();
        assert!(matches!(
            Runner::new(options).unwrap_err(),
            RunnerError::EmptyProgram
        ));
    }

    #[tokio::test]
    async fn records_lines_in_order_and_counts_outcomes() {
        let result = run(shell(
            r#"printf 'HTTP/1.1 200 OK\n\nadmin Found\nconnection error\n   \nnoise\n'"#,
            Duration::from_secs(10),
        ))
        .await;

        let lines: Vec<_> = result.records.iter().map(|r| r.raw_text.as_str()).collect();
        assert_eq!(
            lines,
            vec!["HTTP/1.1 200 OK", "", "admin Found", "connection error", "", "noise"]
        );
        let outcomes: Vec<_> = result.records.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::Ok,
                Outcome::Unknown,
                Outcome::Success,
                Outcome::Error,
                Outcome::Unknown,
                Outcome::Unknown
            ]
        );
        assert_eq!(
            result.counters,
            RunCounters {
                requests_made: 6,
                successful_responses: 1,
                error_count: 1,
            }
        );
        assert_eq!(result.termination, Termination::Exited(Some(0)));
        assert_eq!(result.records[0].status_code(), Some("200"));
    }

    #[tokio::test]
    async fn blank_lines_are_recorded_and_counted() {
        let result = run(shell(r"printf 'a\n\nb\n'", Duration::from_secs(10))).await;
        let lines: Vec<_> = result.records.iter().map(|r| r.raw_text.as_str()).collect();
        assert_eq!(lines, vec!["a", "", "b"]);
        assert_eq!(result.counters.requests_made, 3);
    }

    #[tokio::test]
    async fn closed_stdout_with_live_child_still_times_out() {
        let started = std::time::Instant::now();
        let result = run(shell(
            "echo 'HTTP/1.1 200 OK'; exec 1>&-; sleep 10",
            Duration::from_secs(1),
        ))
        .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(result.timed_out());
        assert_eq!(result.records.len(), 1);
    }

    #[tokio::test]
    async fn log_is_written_while_the_run_is_going() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("ffuf_output.log");
        let mut options = shell("echo first; echo second; sleep 3", Duration::from_secs(10));
        options.log_file = Some(log_path.clone());

        let runner = Runner::new(options).unwrap();
        let pb = ProgressBar::hidden();
        let run = runner.run(&pb);
        let peek = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            std::fs::read_to_string(&log_path).unwrap_or_default()
        };
        let (result, mid_run) = tokio::join!(run, peek);

        assert_eq!(mid_run.lines().count(), 2);
        assert!(mid_run.lines().last().unwrap().ends_with("] second"));
        assert_eq!(result.unwrap().records.len(), 2);
    }

    #[tokio::test]
    async fn reports_non_zero_exit_code() {
        let result = run(shell(
            "echo 'Error: wordlist missing'; exit 3",
            Duration::from_secs(10),
        ))
        .await;
        assert_eq!(result.termination, Termination::Exited(Some(3)));
        assert_eq!(result.counters.error_count, 1);
    }

    #[tokio::test]
    async fn timeout_keeps_lines_received_before_it() {
        let started = std::time::Instant::now();
        let result = run(shell(
            "echo 'HTTP/1.1 200 OK'; sleep 10; echo 'HTTP/1.1 404 Not Found'",
            Duration::from_secs(1),
        ))
        .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(result.timed_out());
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].outcome, Outcome::Ok);
        assert_eq!(result.counters.requests_made, 1);
    }

    #[tokio::test]
    async fn timeout_stops_a_chatty_child() {
        let started = std::time::Instant::now();
        let result = run(shell(
            "while true; do echo 'tick Found'; sleep 0.1; done",
            Duration::from_secs(1),
        ))
        .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(result.timed_out());
        assert!(!result.records.is_empty());
        assert_eq!(result.counters.requests_made, result.records.len());
        assert_eq!(result.counters.successful_responses, result.records.len());
    }

    #[tokio::test]
    async fn heavy_stderr_does_not_stall_the_run() {
        let result = run(shell(
            r#"i=0; while [ $i -lt 5000 ]; do echo "stderr noise line $i" 1>&2; i=$((i+1)); done; echo 'admin Found'"#,
            Duration::from_secs(30),
        ))
        .await;

        assert_eq!(result.termination, Termination::Exited(Some(0)));
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.stderr_tail.len(), STDERR_TAIL_LINES);
        assert_eq!(
            result.stderr_tail.last().map(String::as_str),
            Some("stderr noise line 4999")
        );
    }

    #[tokio::test]
    async fn undecodable_bytes_are_replaced() {
        let result = run(shell(r#"printf 'HTTP/1.1 200 \377OK\n'"#, Duration::from_secs(10))).await;
        assert_eq!(result.records.len(), 1);
        assert!(result.records[0].raw_text.contains('\u{FFFD}'));
        assert_eq!(result.records[0].outcome, Outcome::Ok);
    }

    #[tokio::test]
    async fn writes_each_line_to_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("ffuf_output.log");
        let mut options = shell("echo first; echo 'HTTP/1.1 403 Forbidden'", Duration::from_secs(10));
        options.log_file = Some(log_path.clone());
        let result = run(options).await;
        assert_eq!(result.records.len(), 2);

        let contents = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('[') && lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] HTTP/1.1 403 Forbidden"));
    }

    #[tokio::test]
    async fn unwritable_log_does_not_abort_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = shell("echo 'admin Found'", Duration::from_secs(10));
        options.log_file = Some(dir.path().join("missing").join("out.log"));
        let result = run(options).await;
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.termination, Termination::Exited(Some(0)));
    }

    #[tokio::test]
    async fn launch_failure_is_an_error() {
        let options = Options::new(
            FuzzCommand {
                program: "/nonexistent/fuzzpilot-tool".to_string(),
                args: Vec::new(),
            },
            Duration::from_secs(1),
        );
        let err = Runner::new(options)
            .unwrap()
            .run(&ProgressBar::hidden())
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
