//! Bounded runs of external tools (LaTeX engines, bibtex, image converters)

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use which::which;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Run `command` with null stdio and wait at most `timeout` for it.
///
/// A process that overruns is killed and reported as
/// [`ConvertError::Timeout`]. `program` names the tool in errors.
pub(crate) fn run_with_timeout(
    command: &mut Command,
    program: &str,
    timeout: Duration,
) -> Result<ExitStatus, ConvertError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let mut child = command.spawn().map_err(|e| {
        ConvertError::Compile(format!(
            "Failed to launch {program} ({}): {e}",
            Path::new(command.get_program()).display()
        ))
    })?;

    let started = Instant::now();
    loop {
        let status = child
            .try_wait()
            .map_err(|e| ConvertError::Compile(format!("Failed to wait for {program}: {e}")))?;
        if let Some(status) = status {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            // The process may exit between the poll and the kill.
            let _ = child.kill();
            let _ = child.wait();
            return Err(ConvertError::Timeout {
                engine: program.to_string(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// First of `names` found on `PATH`.
pub(crate) fn find_on_path(names: &[&str]) -> Option<PathBuf> {
    names.iter().find_map(|name| which(name).ok())
}
