//! Exchange Model
//!
//! One command submission paired with its (possibly still pending) output.
//! An exchange starts either complete (built-ins, launch failures) or
//! running with a provisional payload, and is finalized exactly once.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::ansi::{self, StyledRun};
use crate::error::{Error, Result};

/// Synthetic exit status reported when the child could not be started
pub const LAUNCH_FAILURE_STATUS: i32 = 127;

/// Unique identifier of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExchangeId(Uuid);

impl ExchangeId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format of a structured text payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFormat {
    Plain,
    Markdown,
}

/// Renderable content of an exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Terminal output after escape sequence interpretation
    Attributed(Vec<StyledRun>),
    /// Text declared by an output envelope
    Structured { text: String, format: TextFormat },
    /// Image bytes, absent when the body could not be decoded
    Image(Option<Vec<u8>>),
}

impl Payload {
    /// The placeholder shown while a command is running
    pub fn provisional() -> Self {
        Payload::Attributed(Vec::new())
    }

    /// Unstyled text as a single default run (no runs for empty text)
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Payload::Attributed(Vec::new())
        } else {
            Payload::Attributed(vec![StyledRun::plain(text)])
        }
    }

    /// Text content with styling dropped; images yield an empty string
    pub fn text(&self) -> String {
        match self {
            Payload::Attributed(runs) => ansi::plain_text(runs),
            Payload::Structured { text, .. } => text.clone(),
            Payload::Image(_) => String::new(),
        }
    }

    /// Whether there is nothing to render
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Attributed(runs) => runs.iter().all(|run| run.text.is_empty()),
            Payload::Structured { text, .. } => text.is_empty(),
            Payload::Image(bytes) => bytes.as_ref().map_or(true, |b| b.is_empty()),
        }
    }

    /// Detected format of image bytes, if this is a decodable image payload
    pub fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            Payload::Image(Some(bytes)) => image::guess_format(bytes).ok(),
            _ => None,
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::provisional()
    }
}

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The process exited with a status code
    Exited(i32),
    /// The process was killed by a signal
    Signaled(i32),
    /// The process never started
    LaunchFailed,
}

impl Termination {
    /// Exit status attached to the exchange
    pub fn exit_status(&self) -> i32 {
        match self {
            Termination::Exited(code) => *code,
            Termination::Signaled(signal) => 128 + signal,
            Termination::LaunchFailed => LAUNCH_FAILURE_STATUS,
        }
    }

    /// Anything other than a normal exit
    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Termination::Exited(_))
    }
}

impl From<std::process::ExitStatus> for Termination {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Termination::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Termination::Signaled(signal);
            }
        }
        Termination::Exited(-1)
    }
}

/// Lifecycle state of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeStatus {
    /// Still backed by a live session
    Running,
    /// Finalized; never returns to running
    Completed {
        termination: Termination,
        duration: Duration,
    },
}

/// One command submission and its output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    /// Unique identifier
    pub id: ExchangeId,

    /// When the command was submitted (in local time)
    pub timestamp: DateTime<Local>,

    /// Prompt shown at issuance, for display only
    pub prompt: String,

    /// The command text as submitted
    pub command: String,

    /// Directory the command ran in
    pub working_directory: PathBuf,

    /// What to render
    pub payload: Payload,

    status: ExchangeStatus,
}

impl Exchange {
    /// A provisional exchange for a command that is about to run
    pub fn running(prompt: &str, command: &str, working_directory: PathBuf) -> Self {
        Self {
            id: ExchangeId::new(),
            timestamp: Local::now(),
            prompt: prompt.to_string(),
            command: command.to_string(),
            working_directory,
            payload: Payload::provisional(),
            status: ExchangeStatus::Running,
        }
    }

    /// An exchange that is complete from the start
    pub fn completed(
        prompt: &str,
        command: &str,
        working_directory: PathBuf,
        payload: Payload,
        termination: Termination,
        duration: Duration,
    ) -> Self {
        Self {
            id: ExchangeId::new(),
            timestamp: Local::now(),
            prompt: prompt.to_string(),
            command: command.to_string(),
            working_directory,
            payload,
            status: ExchangeStatus::Completed {
                termination,
                duration,
            },
        }
    }

    /// Current lifecycle state
    pub fn status(&self) -> ExchangeStatus {
        self.status
    }

    /// Whether the command is still running
    pub fn is_running(&self) -> bool {
        matches!(self.status, ExchangeStatus::Running)
    }

    /// Exit status, absent while running
    pub fn exit_status(&self) -> Option<i32> {
        self.termination().map(|t| t.exit_status())
    }

    /// How the command ended, absent while running
    pub fn termination(&self) -> Option<Termination> {
        match self.status {
            ExchangeStatus::Running => None,
            ExchangeStatus::Completed { termination, .. } => Some(termination),
        }
    }

    /// How long the command took, absent while running
    pub fn duration(&self) -> Option<Duration> {
        match self.status {
            ExchangeStatus::Running => None,
            ExchangeStatus::Completed { duration, .. } => Some(duration),
        }
    }

    /// Replace the provisional payload of a running exchange.
    ///
    /// Returns false (and changes nothing) once the exchange has completed.
    pub fn update_provisional(&mut self, payload: Payload) -> bool {
        if self.is_running() {
            self.payload = payload;
            true
        } else {
            false
        }
    }

    /// Finalize the exchange. `None` keeps the current payload.
    pub fn complete(
        &mut self,
        payload: Option<Payload>,
        termination: Termination,
        duration: Duration,
    ) -> Result<()> {
        if !self.is_running() {
            return Err(Error::ExchangeAlreadyCompleted {
                id: self.id.to_string(),
            });
        }
        if let Some(payload) = payload {
            self.payload = payload;
        }
        self.status = ExchangeStatus::Completed {
            termination,
            duration,
        };
        Ok(())
    }
}
