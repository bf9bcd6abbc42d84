//! Terminal Output Handling
//!
//! Envelope detection and classification of captured command output into
//! renderable payloads.

pub mod envelope;
pub mod output;

// Re-exports for convenience
pub use envelope::{looks_enveloped, Envelope, MIME_VERSION_HEADER};
pub use output::{normalize_newlines, CapturedOutput, Classification, OutputClassifier};
