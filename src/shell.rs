//! Shell facade
//!
//! [`Shell`] is the submission interface. It routes command lines to the
//! built-ins or the session manager, owns both history stores, and applies
//! session events on the caller's thread. Nothing outside this type mutates
//! history or the navigation context.

use std::sync::Arc;
use std::time::Instant;

use crate::commands::BuiltinDispatcher;
use crate::config::Config;
use crate::context::ShellContext;
use crate::history::HistoryStore;
use crate::models::{Exchange, ExchangeId, Payload, Termination, TextFormat};
use crate::platform::SignalOps;
use crate::pty::{SessionEvent, SessionManager};

/// A history change produced by applying a session event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedEvent {
    /// The provisional payload of a running exchange changed
    Updated(ExchangeId),
    /// The exchange was finalized
    Completed(ExchangeId),
}

/// Interactive shell session engine
pub struct Shell {
    config: Config,
    context: ShellContext,
    stdout_history: HistoryStore,
    stderr_history: HistoryStore,
    sessions: SessionManager,
    builtins: BuiltinDispatcher,
}

impl Shell {
    /// Create a shell that signals children through the platform layer
    pub fn new(config: Config, context: ShellContext) -> Self {
        let sessions = SessionManager::with_platform(config.session.clone());
        Self::with_sessions(config, context, sessions)
    }

    /// Create a shell with explicit signal operations
    pub fn with_signals(config: Config, context: ShellContext, signals: Arc<dyn SignalOps>) -> Self {
        let sessions = SessionManager::new(config.session.clone(), signals);
        Self::with_sessions(config, context, sessions)
    }

    fn with_sessions(config: Config, context: ShellContext, sessions: SessionManager) -> Self {
        Self {
            builtins: BuiltinDispatcher::new(config.history.listing_limit),
            config,
            context,
            stdout_history: HistoryStore::new(),
            stderr_history: HistoryStore::new(),
            sessions,
        }
    }

    /// Submit a command line.
    ///
    /// Built-ins complete immediately; anything else is launched and
    /// appears as a running exchange. Returns `None` for a blank line.
    /// External commands require a tokio runtime context.
    pub fn submit(&mut self, prompt: &str, command: &str) -> Option<ExchangeId> {
        let command = command.trim_matches(|c| c == '\n' || c == '\r');
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return None;
        }

        let started = Instant::now();
        let working_directory = self.context.current_directory().to_path_buf();

        if let Some(result) =
            self.builtins
                .dispatch(&parts, &mut self.context, &self.stdout_history)
        {
            let elapsed = started.elapsed();
            let (text, termination) = match result {
                Ok(text) => (text, Termination::Exited(0)),
                Err(e) => {
                    let message = e.to_string();
                    self.stderr_history.append(Exchange::completed(
                        prompt,
                        command,
                        working_directory.clone(),
                        Payload::plain(message.clone()),
                        Termination::Exited(1),
                        elapsed,
                    ));
                    (message, Termination::Exited(1))
                }
            };
            let exchange = Exchange::completed(
                prompt,
                command,
                working_directory,
                Payload::Structured {
                    text,
                    format: TextFormat::Plain,
                },
                termination,
                elapsed,
            );
            return Some(self.stdout_history.append(exchange));
        }

        let id = self
            .stdout_history
            .append(Exchange::running(prompt, command, working_directory.clone()));

        if let Err(e) = self.sessions.launch(id, command, &working_directory) {
            error!("Failed to launch '{}': {}", command, e);
            let message = e.to_string();
            let elapsed = started.elapsed();
            if let Err(e) = self.stdout_history.complete(
                id,
                Some(Payload::plain(message.clone())),
                Termination::LaunchFailed,
                elapsed,
            ) {
                warn!("{}", e);
            }
            self.stderr_history.append(Exchange::completed(
                prompt,
                command,
                working_directory,
                Payload::plain(message),
                Termination::LaunchFailed,
                elapsed,
            ));
        }

        Some(id)
    }

    /// Send a termination signal to every running command
    pub async fn interrupt(&self) -> usize {
        self.sessions.interrupt().await
    }

    /// Send a termination signal to the command behind `id`, if running
    pub async fn stop(&self, id: ExchangeId) -> bool {
        self.sessions.stop(id).await
    }

    /// Handle a control-key chord from the command line.
    ///
    /// Only Ctrl-C is interpreted; it interrupts every running command.
    pub async fn handle_control_key(&self, key: char) -> Option<usize> {
        if key.eq_ignore_ascii_case(&'c') {
            Some(self.interrupt().await)
        } else {
            None
        }
    }

    /// Apply every event that is already queued
    pub fn process_pending_events(&mut self) -> Vec<AppliedEvent> {
        let mut applied = Vec::new();
        while let Some(event) = self.sessions.try_next_event() {
            applied.extend(self.apply(event));
        }
        applied
    }

    /// Wait for and apply the next event that changes history.
    ///
    /// Returns `None` once no command is running.
    pub async fn next_event(&mut self) -> Option<AppliedEvent> {
        loop {
            let event = self.sessions.next_event().await?;
            if let Some(applied) = self.apply(event) {
                return Some(applied);
            }
        }
    }

    /// Apply events until no command is running
    pub async fn wait_idle(&mut self) {
        while self.next_event().await.is_some() {}
    }

    fn apply(&mut self, event: SessionEvent) -> Option<AppliedEvent> {
        match event {
            SessionEvent::Output { id, payload } => {
                match self.stdout_history.update_provisional(id, payload) {
                    Ok(true) => Some(AppliedEvent::Updated(id)),
                    Ok(false) => None,
                    Err(e) => {
                        warn!("{}", e);
                        None
                    }
                }
            }
            SessionEvent::Finished { id, outcome } => {
                if let Err(e) = self.stdout_history.complete(
                    id,
                    outcome.payload,
                    outcome.termination,
                    outcome.duration,
                ) {
                    warn!("{}", e);
                    return None;
                }

                if let Some(stderr) = outcome.stderr {
                    if let Some(origin) = self.stdout_history.get(id) {
                        let exchange = Exchange::completed(
                            &origin.prompt,
                            &origin.command,
                            origin.working_directory.clone(),
                            Payload::plain(stderr),
                            outcome.termination,
                            outcome.duration,
                        );
                        self.stderr_history.append(exchange);
                    }
                }
                Some(AppliedEvent::Completed(id))
            }
        }
    }

    /// Apply one filter text to both histories
    pub fn set_filter(&mut self, filter: &str) {
        self.stdout_history.set_filter(filter);
        self.stderr_history.set_filter(filter);
    }

    /// Re-list the current directory after it changed on disk
    pub fn directory_changed(&mut self) {
        self.context.refresh();
    }

    /// History of command output
    pub fn stdout_history(&self) -> &HistoryStore {
        &self.stdout_history
    }

    /// History of error output
    pub fn stderr_history(&self) -> &HistoryStore {
        &self.stderr_history
    }

    /// Navigation and selection state
    pub fn context(&self) -> &ShellContext {
        &self.context
    }

    /// Mutable navigation and selection state
    pub fn context_mut(&mut self) -> &mut ShellContext {
        &mut self.context
    }

    /// Whether the exchange `id` is still backed by a running command
    pub fn is_running(&self, id: ExchangeId) -> bool {
        self.sessions.is_running(id)
    }

    /// Number of running commands
    pub fn running_count(&self) -> usize {
        self.sessions.active_count()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
