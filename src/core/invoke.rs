//! Run the external `tide` program and collect what it prints.

use crate::errors::InvocationError;
use chrono::NaiveDate;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Prefix XTide uses for fatal diagnostics on stderr.
const FATAL_PREFIX: &str = "XTide Fatal Error:";

/// A source of raw tide predictions for a location and day range.
///
/// The production implementation is [`XTideProgram`]; anything that can
/// produce text in a format the parser understands fits here.
pub trait TideSource {
    fn fetch(
        &self,
        location: &str,
        start: NaiveDate,
        num_days: u32,
    ) -> Result<String, InvocationError>;
}

/// The XTide `tide` command-line program.
#[derive(Debug, Clone)]
pub struct XTideProgram {
    pub path: PathBuf,
    pub timeout: Duration,
}

impl XTideProgram {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    /// Arguments for one request: CSV format, plain mode, from local
    /// midnight of `start` to 23:59 of `start + num_days`.
    pub fn build_args(location: &str, start: NaiveDate, num_days: u32) -> Vec<String> {
        let end = crate::utils::date::add_days(start, num_days);
        vec![
            "-l".into(),
            location.into(),
            "-b".into(),
            format!("{} 00:00", start.format("%Y-%m-%d")),
            "-e".into(),
            format!("{} 23:59", end.format("%Y-%m-%d")),
            "-f".into(),
            "c".into(),
            "-m".into(),
            "p".into(),
        ]
    }
}

impl TideSource for XTideProgram {
    fn fetch(
        &self,
        location: &str,
        start: NaiveDate,
        num_days: u32,
    ) -> Result<String, InvocationError> {
        invoke(location, start, num_days, &self.path, self.timeout)
    }
}

/// Run `program` for `location` and return its stdout.
///
/// The child is killed once `timeout` elapses. No retries.
pub fn invoke(
    location: &str,
    start: NaiveDate,
    num_days: u32,
    program: &Path,
    timeout: Duration,
) -> Result<String, InvocationError> {
    let args = XTideProgram::build_args(location, start, num_days);
    log::debug!("running {} {:?}", program.display(), args);

    let mut child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => InvocationError::NotFound {
                path: program.to_path_buf(),
            },
            _ => InvocationError::Spawn {
                path: program.to_path_buf(),
                source: e,
            },
        })?;

    // Drain both pipes while waiting so a chatty child cannot block on a full pipe.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                // Grandchildren may still hold the pipes open: leave the readers detached.
                log::warn!(
                    "{} killed after {}s",
                    program.display(),
                    timeout.as_secs()
                );
                return Err(InvocationError::Timeout {
                    seconds: timeout.as_secs(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(InvocationError::Spawn {
                    path: program.to_path_buf(),
                    source: e,
                });
            }
        }
    };

    let out = collect(stdout);
    let err = collect(stderr);

    if !status.success() || (out.trim().is_empty() && !err.trim().is_empty()) {
        return Err(InvocationError::ProgramFailed {
            status: status.to_string(),
            stderr: diagnostic(&err),
        });
    }

    Ok(out)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// XTide's fatal lines when present, otherwise the whole trimmed stderr.
fn diagnostic(stderr: &str) -> String {
    let fatal: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with(FATAL_PREFIX))
        .collect();

    if fatal.is_empty() {
        stderr.trim().to_string()
    } else {
        fatal.join("\n")
    }
}
