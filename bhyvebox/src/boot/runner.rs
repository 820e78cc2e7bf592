//! Blocking execution of stage commands.

use crate::builder::Command;
use crate::errors::{BhyveboxError, BhyveboxResult};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::process::Stdio;
use std::thread::{self, JoinHandle};

/// Lines of each stream kept for the caller once a child exits.
const RETAINED_LINES: usize = 64;

/// What a finished child process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    /// Trailing stdout lines.
    pub stdout: String,
    /// Trailing stderr lines.
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit status as shown in errors.
    pub fn status_string(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs a command to completion and captures its output.
///
/// Only launch failures are errors here; interpreting the exit code is up
/// to the caller.
pub trait ProcessRunner {
    fn run(&self, command: &Command) -> BhyveboxResult<ProcessOutput>;
}

/// Runs commands on the host with stdin closed.
///
/// Output is piped and logged line by line while the child runs, stdout at
/// info and stderr at warn. Only the last [`RETAINED_LINES`] of each stream
/// stay in memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &Command) -> BhyveboxResult<ProcessOutput> {
        let binary = command.binary().display().to_string();
        tracing::info!(command = %command, "Executing");

        let launch_error = |message: String| BhyveboxError::ProcessExecution {
            binary: binary.clone(),
            status: "failed to launch".to_string(),
            stderr: message,
        };

        let mut child = command
            .to_process_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| launch_error(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .map(|pipe| spawn_reader(pipe, &binary, Stream::Stdout))
            .transpose()
            .map_err(|e| launch_error(e.to_string()))?;
        let stderr = child
            .stderr
            .take()
            .map(|pipe| spawn_reader(pipe, &binary, Stream::Stderr))
            .transpose()
            .map_err(|e| launch_error(e.to_string()))?;

        let status = child.wait().map_err(|e| BhyveboxError::ProcessExecution {
            binary: binary.clone(),
            status: "failed to wait".to_string(),
            stderr: e.to_string(),
        })?;

        Ok(ProcessOutput {
            code: status.code(),
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(&self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Log every line of `pipe` as it arrives and hand back the trailing lines.
fn spawn_reader<R: Read + Send + 'static>(
    pipe: R,
    binary: &str,
    stream: Stream,
) -> std::io::Result<JoinHandle<String>> {
    let binary = binary.to_string();
    thread::Builder::new()
        .name(format!("bhyvebox-{}", stream.as_str()))
        .spawn(move || {
            let mut tail = VecDeque::with_capacity(RETAINED_LINES);
            for line in BufReader::new(pipe).lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::error!(
                            binary = %binary,
                            stream = stream.as_str(),
                            "Failed to read from pipe: {}",
                            e
                        );
                        break;
                    }
                };
                if !line.trim().is_empty() {
                    match stream {
                        Stream::Stdout => tracing::info!(binary = %binary, "{}", line),
                        Stream::Stderr => tracing::warn!(binary = %binary, "{}", line),
                    }
                }
                if tail.len() == RETAINED_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            tail.into_iter().map(|line| line + "\n").collect()
        })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    match handle.map(JoinHandle::join) {
        Some(Ok(tail)) => tail,
        Some(Err(_)) => {
            tracing::warn!("Output reader thread panicked");
            String::new()
        }
        None => String::new(),
    }
}
