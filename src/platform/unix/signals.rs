//! Unix signal operations
//!
//! Children are spawned as process group leaders, so signalling the group
//! reaches everything a `sh -c` pipeline started.

use crate::error::{Error, Result};
use crate::platform::traits::SignalOps;
use nix::sys::signal::{kill, killpg, Signal as NixSignal};
use nix::unistd::Pid;

#[derive(Debug, Default)]
pub struct UnixSignals;

impl UnixSignals {
    pub fn new() -> Self {
        Self
    }

    fn signal_group(pid: u32, signal: NixSignal) -> Result<()> {
        let pid = Pid::from_raw(pid as i32);
        killpg(pid, signal)
            .or_else(|e| {
                debug!("killpg({}) failed ({}), signalling process only", pid, e);
                kill(pid, signal)
            })
            .map_err(|e| Error::SignalSendFailed {
                signal: signal.as_str().to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl SignalOps for UnixSignals {
    async fn terminate_group(&self, pid: u32) -> Result<()> {
        Self::signal_group(pid, NixSignal::SIGTERM)
    }
}
