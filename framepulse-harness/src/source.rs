//! Timestamp sources: where the poll loop gets its latency dumps.

use std::collections::VecDeque;
use std::process::Command;

use thiserror::Error;

/// Errors raised while fetching a latency dump.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The shell command could not be spawned or its output collected.
    #[error("failed to run `{command}`: {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Produces the raw text of one latency dump per poll cycle.
///
/// Implementations may block for a device round-trip; the poll thread is
/// the only caller, so blocking stalls nothing else.
pub trait TimestampSource: Send {
    /// Fetch one dump of the display pipeline's latency data.
    fn fetch_latency_dump(&mut self) -> Result<String, SourceError>;

    /// Short description for logs.
    fn name(&self) -> String;
}

/// Fetches dumps from an attached device with
/// `adb shell dumpsys SurfaceFlinger --latency "<layer>"`.
pub struct AdbShellSource {
    layer: String,
    serial: Option<String>,
}

impl AdbShellSource {
    pub fn new(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            serial: None,
        }
    }

    /// Target a specific device when several are attached.
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    /// The command the device shell runs. adb joins its shell arguments
    /// with spaces and the device re-tokenizes the result, so the layer
    /// name carries its own quoting.
    fn remote_command(&self) -> String {
        format!("dumpsys SurfaceFlinger --latency \"{}\"", self.layer)
    }

    fn command_line(&self) -> String {
        match &self.serial {
            Some(serial) => format!("adb -s {serial} shell {}", self.remote_command()),
            None => format!("adb shell {}", self.remote_command()),
        }
    }
}

impl TimestampSource for AdbShellSource {
    fn fetch_latency_dump(&mut self) -> Result<String, SourceError> {
        let mut cmd = Command::new("adb");
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.arg("shell").arg(self.remote_command());

        let output = cmd.output().map_err(|source| SourceError::Command {
            command: self.command_line(),
            source,
        })?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                command: self.command_line(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> String {
        format!("adb layer {:?}", self.layer)
    }
}

/// Replays a fixed sequence of dump texts, one per poll cycle.
///
/// Used by tests and offline replays. Once the script is exhausted every
/// further cycle sees an empty dump, like an idle device.
pub struct ScriptedSource {
    dumps: VecDeque<String>,
}

impl ScriptedSource {
    pub fn new<I, S>(dumps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dumps: dumps.into_iter().map(Into::into).collect(),
        }
    }

    /// Dumps not yet served.
    pub fn remaining(&self) -> usize {
        self.dumps.len()
    }
}

impl TimestampSource for ScriptedSource {
    fn fetch_latency_dump(&mut self) -> Result<String, SourceError> {
        Ok(self.dumps.pop_front().unwrap_or_default())
    }

    fn name(&self) -> String {
        "scripted".to_string()
    }
}
