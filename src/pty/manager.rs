//! Session Manager
//!
//! Owns every in-flight external command. Each launch gets its own
//! pseudo-terminal, reader thread and tokio task; the task streams
//! re-rendered output and finally the classified result back over a single
//! event channel.
//!
//! The active-session table is a plain map owned by the manager. It is only
//! modified by [`SessionManager::launch`] and when a `Finished` event is
//! received, so it never needs a lock.
//!
//! ```ignore
//! let mut manager = SessionManager::new(SessionConfig::default(), signals);
//! manager.launch(id, "ls --color", Path::new("/tmp"))?;
//! while let Some(event) = manager.next_event().await {
//!     // apply to history
//! }
//! ```

use futures::future::join_all;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::events::{SessionEvent, SessionOutcome};
use super::process::{spawn_command, SpawnedProcess};
use super::streams::Utf8ChunkDecoder;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::models::{ExchangeId, Termination};
use crate::platform::{Platform, SignalOps};
use crate::terminal::{CapturedOutput, OutputClassifier};

/// Bookkeeping for one running session
struct ActiveSession {
    pid: Option<u32>,
    task: JoinHandle<()>,
}

/// Manager of concurrently running external commands
pub struct SessionManager {
    config: SessionConfig,
    classifier: OutputClassifier,
    signals: Arc<dyn SignalOps>,
    sessions: HashMap<ExchangeId, ActiveSession>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl SessionManager {
    /// Create a manager with explicit signal operations
    pub fn new(config: SessionConfig, signals: Arc<dyn SignalOps>) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            config,
            classifier: OutputClassifier::new(),
            signals,
            sessions: HashMap::new(),
            events_tx,
            events_rx,
        }
    }

    /// Create a manager using the platform's signal operations
    pub fn with_platform(config: SessionConfig) -> Self {
        Self::new(config, Arc::from(Platform::signals()))
    }

    /// Launch `command` for the exchange `id`.
    ///
    /// Must be called from within a tokio runtime. On error nothing is
    /// registered and no events will be emitted for `id`.
    pub fn launch(&mut self, id: ExchangeId, command: &str, working_directory: &Path) -> Result<()> {
        let spawned = spawn_command(command, working_directory, &self.config)?;
        let pid = spawned.pid;
        info!(
            "Launched '{}' (pid {:?}) in {}",
            command,
            pid,
            working_directory.display()
        );

        let task = tokio::spawn(run_session(
            id,
            spawned,
            Duration::from_millis(self.config.output_drain_ms),
            self.classifier,
            self.events_tx.clone(),
        ));

        self.sessions.insert(
            id,
            ActiveSession {
                pid,
                task,
            },
        );
        Ok(())
    }

    /// Send a termination signal to every active session.
    ///
    /// Returns how many sessions were signalled successfully. Each one still
    /// produces its `Finished` event afterwards.
    pub async fn interrupt(&self) -> usize {
        let targets: Vec<(&ExchangeId, u32)> = self
            .sessions
            .iter()
            .filter_map(|(id, session)| session.pid.map(|pid| (id, pid)))
            .collect();

        let results = join_all(
            targets
                .iter()
                .map(|(_, pid)| self.signals.terminate_group(*pid)),
        )
        .await;

        let mut delivered = 0;
        for ((id, pid), result) in targets.iter().zip(results) {
            match result {
                Ok(()) => delivered += 1,
                Err(e) => warn!("Failed to interrupt session {} (pid {}): {}", id, pid, e),
            }
        }
        info!("Interrupted {} of {} sessions", delivered, self.sessions.len());
        delivered
    }

    /// Send a termination signal to the session running `id`.
    ///
    /// Returns false if `id` is not running or the signal failed.
    pub async fn stop(&self, id: ExchangeId) -> bool {
        let Some(pid) = self.sessions.get(&id).and_then(|s| s.pid) else {
            debug!("stop: exchange {} is not running", id);
            return false;
        };
        match self.signals.terminate_group(pid).await {
            Ok(()) => {
                info!("Stopped session {} (pid {})", id, pid);
                true
            }
            Err(e) => {
                warn!("Failed to stop session {} (pid {}): {}", id, pid, e);
                false
            }
        }
    }

    /// Whether a session for `id` is active
    pub fn is_running(&self, id: ExchangeId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Number of active sessions
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Take the next pending event without waiting
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        let event = self.events_rx.try_recv().ok()?;
        self.observe(&event);
        Some(event)
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once no session is active and nothing is queued.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if self.sessions.is_empty() {
            return self.try_next_event();
        }
        let event = self.events_rx.recv().await?;
        self.observe(&event);
        Some(event)
    }

    fn observe(&mut self, event: &SessionEvent) {
        if let SessionEvent::Finished { id, outcome } = event {
            if self.sessions.remove(id).is_some() {
                debug!(
                    "Session {} finished with {:?} after {:?}",
                    id, outcome.termination, outcome.duration
                );
            }
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        for session in self.sessions.values() {
            session.task.abort();
        }
    }
}

/// Drive one session from launch to its `Finished` event
async fn run_session(
    id: ExchangeId,
    spawned: SpawnedProcess,
    drain: Duration,
    classifier: OutputClassifier,
    events: UnboundedSender<SessionEvent>,
) {
    let started = Instant::now();
    let SpawnedProcess {
        mut child,
        mut output_rx,
        stderr,
        master,
        ..
    } = spawned;

    let stderr_task = stderr.map(|pipe| tokio::spawn(read_stderr(pipe)));
    let mut capture = StreamCapture::new(id, classifier, &events);

    let status = loop {
        tokio::select! {
            chunk = output_rx.recv() => match chunk {
                Some(chunk) => capture.absorb(&chunk),
                None => break wait_for_exit(&mut child).await,
            },
            status = child.wait() => break to_termination(status),
        }
    };

    // Output written just before exit may still be in flight.
    let deadline = tokio::time::sleep(drain);
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            chunk = output_rx.recv() => match chunk {
                Some(chunk) => capture.absorb(&chunk),
                None => break,
            },
            _ = &mut deadline => {
                debug!("Output drain deadline reached for {}", id);
                break;
            }
        }
    }
    drop(master);

    let stderr = match stderr_task {
        Some(mut task) => {
            let joined = tokio::time::timeout(drain, &mut task).await;
            match joined {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!("stderr reader for {} failed: {}", id, e);
                    String::new()
                }
                Err(_) => {
                    debug!("stderr still open for {}, giving up", id);
                    task.abort();
                    String::new()
                }
            }
        }
        None => String::new(),
    };

    let captured = CapturedOutput {
        raw: capture.raw,
        text: capture.text,
        stderr,
        termination: status,
    };
    let classification = classifier.classify(&captured);

    let event = SessionEvent::Finished {
        id,
        outcome: SessionOutcome {
            payload: classification.payload,
            stderr: classification.stderr,
            termination: status,
            duration: started.elapsed(),
        },
    };
    if events.send(event).is_err() {
        debug!("Session {} finished after its manager was dropped", id);
    }
}

/// Accumulated stdout of one session
struct StreamCapture<'a> {
    id: ExchangeId,
    classifier: OutputClassifier,
    events: &'a UnboundedSender<SessionEvent>,
    decoder: Utf8ChunkDecoder,
    raw: Vec<u8>,
    text: String,
}

impl<'a> StreamCapture<'a> {
    fn new(
        id: ExchangeId,
        classifier: OutputClassifier,
        events: &'a UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            id,
            classifier,
            events,
            decoder: Utf8ChunkDecoder::new(),
            raw: Vec::new(),
            text: String::new(),
        }
    }

    /// Append a chunk and publish the re-rendered buffer
    fn absorb(&mut self, chunk: &[u8]) {
        self.raw.extend_from_slice(chunk);
        self.text.push_str(&self.decoder.decode(chunk));

        if let Some(payload) = self.classifier.render_streaming(&self.text) {
            let _ = self.events.send(SessionEvent::Output {
                id: self.id,
                payload,
            });
        }
    }
}

async fn wait_for_exit(child: &mut Child) -> Termination {
    to_termination(child.wait().await)
}

fn to_termination(status: std::io::Result<std::process::ExitStatus>) -> Termination {
    match status {
        Ok(status) => Termination::from(status),
        Err(e) => {
            warn!("Failed to wait for child: {}", e);
            Termination::Exited(-1)
        }
    }
}

async fn read_stderr(mut pipe: ChildStderr) -> String {
    let mut decoder = Utf8ChunkDecoder::new();
    let mut text = String::new();
    let mut buf = [0u8; 4096];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => text.push_str(&decoder.decode(&buf[..n])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("stderr read ended: {}", e);
                break;
            }
        }
    }
    text
}
