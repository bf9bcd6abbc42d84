//! Signal operations that record instead of signalling

use std::sync::Mutex;

use mosaicsh::error::Result;
use mosaicsh::platform::{Platform, SignalOps};

/// Records every terminated pid, then forwards to the real platform
/// so that the signalled children actually exit
pub struct RecordingSignals {
    terminated: Mutex<Vec<u32>>,
    inner: Box<dyn SignalOps>,
}

impl RecordingSignals {
    pub fn new() -> Self {
        Self {
            terminated: Mutex::new(Vec::new()),
            inner: Platform::signals(),
        }
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SignalOps for RecordingSignals {
    async fn terminate_group(&self, pid: u32) -> Result<()> {
        self.terminated.lock().unwrap().push(pid);
        self.inner.terminate_group(pid).await
    }
}
