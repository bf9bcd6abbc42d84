//! PTY Process Spawning
//!
//! Launches one external command under `shell -c`, with a pseudo-terminal
//! slave as stdin and stdout and a separate pipe for stderr. portable-pty
//! allocates the pair; the child itself is started with tokio so stderr can
//! be kept apart from the terminal stream.

use portable_pty::{native_pty_system, MasterPty, PtySize};
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, ChildStderr, Command};
use tokio::sync::mpsc::UnboundedReceiver;

use super::streams::spawn_reader;
use crate::config::SessionConfig;
use crate::error::{Error, Result};

/// A freshly launched child and the resources attached to it
pub struct SpawnedProcess {
    /// The child process
    pub child: Child,
    /// Process ID, also the process group ID
    pub pid: Option<u32>,
    /// Chunks read from the pseudo-terminal master
    pub output_rx: UnboundedReceiver<Vec<u8>>,
    /// The stderr pipe
    pub stderr: Option<ChildStderr>,
    /// Master side, kept open until output has been drained
    pub master: Box<dyn MasterPty + Send>,
}

/// Pseudo-terminal resources prepared before a child exists
struct PtyEndpoints {
    master: Box<dyn MasterPty + Send>,
    reader: Box<dyn Read + Send>,
    slave_in: File,
    slave_out: File,
}

impl PtyEndpoints {
    /// Allocate the pair, clone the master reader and open the slave twice.
    ///
    /// Every fallible pseudo-terminal step happens here, so a failure never
    /// leaves a started child behind.
    fn open(command: &str, config: &SessionConfig) -> Result<Self> {
        let pair = native_pty_system()
            .openpty(PtySize {
                rows: config.rows,
                cols: config.cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| Error::PtyCreationFailed {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        let slave_path = pair.master.tty_name().ok_or_else(|| Error::PtyCreationFailed {
            command: command.to_string(),
            reason: "pseudo-terminal has no device path".to_string(),
        })?;

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| Error::PtyReaderCloneFailed {
                reason: e.to_string(),
            })?;

        let slave_open_failed = |e: std::io::Error| Error::PtySlaveOpenFailed {
            path: slave_path.clone(),
            reason: e.to_string(),
        };
        let slave_in = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&slave_path)
            .map_err(slave_open_failed)?;
        let slave_out = slave_in.try_clone().map_err(slave_open_failed)?;

        // Our descriptors are enough; the pair's own slave handle would keep
        // the master from ever seeing EOF.
        drop(pair.slave);

        Ok(Self {
            master: pair.master,
            reader,
            slave_in,
            slave_out,
        })
    }
}

/// Spawn `command` through the configured shell in `working_directory`
pub fn spawn_command(
    command: &str,
    working_directory: &Path,
    config: &SessionConfig,
) -> Result<SpawnedProcess> {
    let PtyEndpoints {
        master,
        reader,
        slave_in,
        slave_out,
    } = PtyEndpoints::open(command, config)?;

    let mut cmd = Command::new(&config.shell_path);
    cmd.arg("-c")
        .arg(command)
        .current_dir(working_directory)
        .stdin(Stdio::from(slave_in))
        .stdout(Stdio::from(slave_out))
        .stderr(Stdio::piped())
        .process_group(0);

    if !config.inherit_env {
        cmd.env_clear();
    }
    cmd.envs(&config.environment);

    let mut child = cmd.spawn().map_err(|e| Error::CommandSpawnFailed {
        command: command.to_string(),
        reason: e.to_string(),
    })?;

    // The child has its own copies of the slave now.
    drop(cmd);

    let pid = child.id();
    let label = format!("pid {}", pid.unwrap_or(0));
    let output_rx = spawn_reader(reader, config.read_buffer_size, label);

    Ok(SpawnedProcess {
        stderr: child.stderr.take(),
        child,
        pid,
        output_rx,
        master,
    })
}
