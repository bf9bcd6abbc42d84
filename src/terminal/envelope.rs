//! Output envelope parsing
//!
//! A child process may prefix its output with a MIME-style header block to
//! ask for structured rendering:
//!
//! ```text
//! MIME-Version: 1.0
//! Content-Type: text/markdown
//!
//! # Body
//! ```
//!
//! Header lines may end in `\n` or `\r\n` (the pseudo-terminal translates
//! the former into the latter).

use once_cell::sync::Lazy;
use regex::Regex;

/// Header line that marks output as enveloped
pub const MIME_VERSION_HEADER: &str = "MIME-Version:";

static HEADER_LINE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9][A-Za-z0-9-]*):[ \t]*(.*)$").ok());

/// Parsed header block of an enveloped output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Lowercased media type, without parameters
    pub content_type: Option<String>,
    /// Whether the body is base64 encoded
    pub base64: bool,
    /// Byte offset of the body within the parsed buffer
    pub body_offset: usize,
}

impl Envelope {
    /// Parse a header block at the start of `buffer`.
    ///
    /// Returns `None` when the buffer is not enveloped: a line that is not
    /// header-shaped appears before the blank line, the blank line never
    /// arrives, or no `MIME-Version` header was present.
    pub fn parse(buffer: &[u8]) -> Option<Envelope> {
        let pattern = HEADER_LINE.as_ref()?;

        let mut offset = 0;
        let mut seen_version = false;
        let mut content_type = None;
        let mut base64 = false;

        loop {
            let newline = buffer[offset..].iter().position(|&b| b == b'\n')?;
            let raw_line = &buffer[offset..offset + newline];
            offset += newline + 1;

            let raw_line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
            if raw_line.is_empty() {
                break;
            }

            let line = std::str::from_utf8(raw_line).ok()?;
            let captures = pattern.captures(line)?;
            let key = captures.get(1).map_or("", |m| m.as_str());
            let value = captures.get(2).map_or("", |m| m.as_str()).trim();

            if key.eq_ignore_ascii_case("MIME-Version") {
                seen_version = true;
            } else if key.eq_ignore_ascii_case("Content-Type") {
                let media_type = value.split(';').next().unwrap_or("").trim();
                content_type = Some(media_type.to_ascii_lowercase());
            } else if key.eq_ignore_ascii_case("Content-Transfer-Encoding") {
                base64 = value.eq_ignore_ascii_case("base64");
            }
        }

        if !seen_version {
            return None;
        }

        Some(Envelope {
            content_type,
            base64,
            body_offset: offset,
        })
    }

    /// The body bytes following the header block
    pub fn body<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        buffer.get(self.body_offset..).unwrap_or(&[])
    }
}

/// Whether streamed output so far looks like the start of an envelope.
///
/// While this holds, live re-rendering is suppressed so header text never
/// flashes up as terminal output.
pub fn looks_enveloped(text: &str) -> bool {
    if text.len() >= MIME_VERSION_HEADER.len() {
        text.starts_with(MIME_VERSION_HEADER)
    } else {
        MIME_VERSION_HEADER.starts_with(text)
    }
}
