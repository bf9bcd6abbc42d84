//! Pseudoterminal (PTY) Session Management
//!
//! This module runs external commands under a pseudo-terminal, streams their
//! output, and reports classified results as events.

pub mod events;
pub mod manager;
pub mod process;
pub mod streams;

// Re-exports for convenience
pub use events::{SessionEvent, SessionOutcome};
pub use manager::SessionManager;
pub use process::{spawn_command, SpawnedProcess};
pub use streams::{spawn_reader, Utf8ChunkDecoder};
