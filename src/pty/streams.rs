//! PTY Streams
//!
//! Bridges the blocking pseudo-terminal master reader to async code with a
//! background thread and a channel, and decodes the resulting chunks.

use std::io::Read;
use std::thread;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Start a thread that forwards everything read from `reader` as chunks.
///
/// The channel closes when the reader hits EOF or a non-retryable error.
/// On Linux the master reports `EIO` once every slave descriptor is closed,
/// which is treated the same as EOF.
pub fn spawn_reader(
    mut reader: Box<dyn Read + Send>,
    buffer_size: usize,
    label: String,
) -> UnboundedReceiver<Vec<u8>> {
    let (tx, rx) = unbounded_channel::<Vec<u8>>();

    thread::spawn(move || {
        let mut buf = vec![0u8; buffer_size.max(1)];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    debug!("PTY read EOF for {}", label);
                    break;
                }
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        debug!("PTY read: receiver for {} dropped, stopping", label);
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("PTY read for {} ended: {}", label, e);
                    break;
                }
            }
        }
        debug!("PTY reader thread for {} exiting", label);
    });

    rx
}

/// Per-chunk UTF-8 decoder.
///
/// A multi-byte character split across two reads is carried over to the
/// next chunk. A chunk containing invalid bytes contributes nothing.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    carry: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning the complete characters it yields
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        match std::str::from_utf8(&bytes) {
            Ok(text) => text.to_string(),
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                self.carry = bytes.split_off(valid);
                String::from_utf8(bytes).unwrap_or_default()
            }
            Err(e) => {
                trace!("Dropping undecodable chunk of {} bytes: {}", chunk.len(), e);
                String::new()
            }
        }
    }

    /// Bytes held back waiting for the rest of a character
    pub fn pending(&self) -> usize {
        self.carry.len()
    }
}
