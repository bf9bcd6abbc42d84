//! Output Classification
//!
//! Decides the final payload of a finished command from its captured stdout
//! bytes and stderr text, and renders the provisional payload while output
//! is still streaming in.

use base64::Engine;

use super::envelope::{looks_enveloped, Envelope};
use crate::ansi;
use crate::models::{Payload, Termination, TextFormat};

/// Everything captured from one finished command
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Raw bytes read from the pseudo-terminal master
    pub raw: Vec<u8>,
    /// The same output decoded chunk by chunk (lossy)
    pub text: String,
    /// Decoded standard error
    pub stderr: String,
    /// How the process ended
    pub termination: Termination,
}

/// Result of classifying captured output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Final payload, or `None` to keep the provisional one
    pub payload: Option<Payload>,
    /// Trimmed stderr text for the error history, if any
    pub stderr: Option<String>,
}

/// Stateless classifier for command output
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputClassifier;

impl OutputClassifier {
    /// Create a new classifier
    pub fn new() -> Self {
        Self
    }

    /// Classify the output of a finished command
    pub fn classify(&self, output: &CapturedOutput) -> Classification {
        let stderr = output.stderr.trim_matches(|c| c == '\n' || c == '\r');
        let stderr = (!stderr.is_empty()).then(|| stderr.to_string());

        let payload = match Envelope::parse(&output.raw) {
            Some(envelope) => {
                debug!("Enveloped output with type {:?}", envelope.content_type);
                self.classify_enveloped(&envelope, envelope.body(&output.raw))
            }
            None => Some(self.classify_unenveloped(output, stderr.as_deref())),
        };

        Classification { payload, stderr }
    }

    /// Render output that is still streaming in.
    ///
    /// Returns `None` while the text so far may be the start of an envelope.
    pub fn render_streaming(&self, text: &str) -> Option<Payload> {
        if looks_enveloped(text) {
            return None;
        }
        Some(Payload::Attributed(ansi::interpret(&normalize_newlines(text))))
    }

    fn classify_enveloped(&self, envelope: &Envelope, body: &[u8]) -> Option<Payload> {
        let content_type = envelope.content_type.as_deref()?;

        if content_type.starts_with("image/") {
            let bytes = if envelope.base64 {
                decode_base64(body)
            } else {
                Some(body.to_vec())
            };
            if bytes.is_none() {
                warn!("Discarding undecodable {} body", content_type);
            }
            return Some(Payload::Image(bytes));
        }

        let format = match content_type {
            "text/markdown" => TextFormat::Markdown,
            "text/plain" => TextFormat::Plain,
            other => {
                debug!("Unrecognized envelope type {}, keeping provisional payload", other);
                return None;
            }
        };

        let decoded = if envelope.base64 {
            decode_base64(body).or_else(|| {
                warn!("Keeping undecodable {} body as sent", content_type);
                None
            })
        } else {
            None
        };
        let body = decoded.as_deref().unwrap_or(body);
        let text = normalize_newlines(&String::from_utf8_lossy(body));
        Some(Payload::Structured {
            text: text.trim_end_matches('\n').to_string(),
            format,
        })
    }

    fn classify_unenveloped(&self, output: &CapturedOutput, stderr: Option<&str>) -> Payload {
        let stdout = output.text.trim_end_matches(|c| c == '\n' || c == '\r');

        match stderr {
            Some(stderr) if stdout.is_empty() && output.termination.is_abnormal() => {
                Payload::plain(stderr)
            }
            _ => Payload::Attributed(ansi::interpret(&normalize_newlines(stdout))),
        }
    }
}

/// Undo the pseudo-terminal's `\n` to `\r\n` translation
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn decode_base64(body: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .ok()
}
