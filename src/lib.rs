//! mosaicsh - an embeddable shell session engine
//!
//! This library runs command lines the way a block-based terminal does:
//! every submission becomes an [`Exchange`] in a filterable history, external
//! commands run under a pseudo-terminal with their output streamed and
//! re-rendered as it arrives, and finished output is classified into styled
//! terminal text, markdown, plain text or an image.
//!
//! ## Module Organization
//!
//! - [`shell`] - The [`Shell`] facade: submission, interruption, event application
//! - [`pty`] - Session manager, pseudo-terminal spawning and stream readers
//! - [`terminal`] - Output envelope parsing and classification
//! - [`ansi`] - Escape sequence interpreter producing styled runs
//! - [`history`] - Exchange history with a filtered projection
//! - [`commands`] - Built-in commands (`cd`, `select`, `deselect`, `pwd`, `history`)
//! - [`context`] - Navigation and selection state
//! - [`wildcard`] - `*` / `?` name matching
//! - [`platform`] - Filesystem and signal collaborators
//! - [`config`] - Configuration loading
//! - [`models`] - Exchange and payload types
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() -> mosaicsh::Result<()> {
//! let config = mosaicsh::init();
//! let mut shell = mosaicsh::create_shell(config)?;
//!
//! let id = shell.submit("~ % ", "ls -G");
//! shell.wait_idle().await;
//!
//! for exchange in shell.stdout_history().filtered() {
//!     println!("{}", exchange.payload.text());
//! }
//! # let _ = id;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Owner thread:** calls [`Shell::submit`] and applies session events
//! - **Session tasks:** one tokio task per running command
//! - **PTY reader threads:** blocking reads from each pseudo-terminal master
//!
//! Session tasks only talk to the owner through a channel, so history and
//! navigation state are never shared across threads.

#![allow(unexpected_cfgs)]

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;

// Core modules
pub mod ansi;
pub mod commands;
pub mod context;
pub mod history;
pub mod pty;
pub mod shell;
pub mod terminal;
pub mod wildcard;

// Platform and model modules
pub mod models;
pub mod platform;

// Re-exports for core functionality
pub use config::{Config, ConfigLoader};
pub use context::ShellContext;
pub use error::{Error, Result};
pub use history::HistoryStore;
pub use models::{Exchange, ExchangeId, Payload, Termination, TextFormat};
pub use shell::{AppliedEvent, Shell};

use std::path::Path;
use std::sync::Arc;

use platform::Platform;

// Version information
/// The current version of mosaicsh from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The application name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration from the default locations.
///
/// Never fails: unreadable or invalid files are logged and skipped, and
/// defaults are used when nothing usable is found.
pub fn init() -> Config {
    info!("Initializing {} v{}", NAME, VERSION);
    let mut loader = ConfigLoader::new();
    let config = loader.load();
    match loader.current_path() {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("Using default configuration"),
    }
    config
}

/// Load configuration from an explicit file.
///
/// Unlike [`init`], a missing, unparsable or invalid file is an error.
pub fn init_with_config(config_path: &Path) -> Result<Config> {
    info!(
        "Initializing {} v{} with config: {}",
        NAME,
        VERSION,
        config_path.display()
    );
    ConfigLoader::load_from_path(config_path).map_err(|e| {
        error!(
            "Failed to load configuration from {}: {}",
            config_path.display(),
            e
        );
        e
    })
}

/// Create a shell rooted at the process's current directory
pub fn create_shell(config: Config) -> Result<Shell> {
    let directory = std::env::current_dir()?;
    let context = ShellContext::new(directory, Arc::from(Platform::filesystem()));
    Ok(Shell::new(config, context))
}

/// Human-readable explanation of a startup failure
pub fn handle_startup_error(error: &Error) -> String {
    match error {
        Error::ConfigLoadFailed { path, reason } => {
            format!(
                "Configuration Error: Failed to load config from '{}': {}\n\nTry:\n• Check the path\n• Ensure file permissions are correct",
                path.display(),
                reason
            )
        }
        Error::ConfigParseFailed { format, reason } => {
            format!(
                "Configuration Error: Failed to parse {} config: {}\n\nTry:\n• Check configuration file syntax",
                format, reason
            )
        }
        Error::ConfigValidationFailed { field, reason } => {
            format!(
                "Configuration Error: Validation failed for '{}': {}",
                field, reason
            )
        }
        Error::Io(err) => format!("I/O Error: {}", err),
        _ => format!("Unexpected Error: {}", error),
    }
}
