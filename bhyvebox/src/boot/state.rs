//! Boot sequence state machine.
//!
//! ```text
//! NotStarted → BootloaderRunning → BootloaderComplete → HypervisorRunning → HypervisorExited
//!      └──────────────┴──────────────────┴───────────────────┴──→ Failed
//! ```

use crate::errors::{BhyveboxError, BhyveboxResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress of one `start` invocation. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootSequence {
    NotStarted,
    BootloaderRunning,
    BootloaderComplete,
    HypervisorRunning,
    /// bhyve returned success; the guest has shut down.
    HypervisorExited,
    Failed,
}

impl BootSequence {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BootSequence::HypervisorExited | BootSequence::Failed)
    }

    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: BootSequence) -> bool {
        use BootSequence::*;
        matches!(
            (self, target),
            (NotStarted, BootloaderRunning)
                | (BootloaderRunning, BootloaderComplete)
                | (BootloaderComplete, HypervisorRunning)
                | (HypervisorRunning, HypervisorExited)
                | (NotStarted | BootloaderRunning | BootloaderComplete | HypervisorRunning, Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BootSequence::NotStarted => "not_started",
            BootSequence::BootloaderRunning => "bootloader_running",
            BootSequence::BootloaderComplete => "bootloader_complete",
            BootSequence::HypervisorRunning => "hypervisor_running",
            BootSequence::HypervisorExited => "hypervisor_exited",
            BootSequence::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BootSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current sequence value plus when it last changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootState {
    pub sequence: BootSequence,
    pub last_updated: DateTime<Utc>,
}

impl BootState {
    pub fn new() -> Self {
        Self {
            sequence: BootSequence::NotStarted,
            last_updated: Utc::now(),
        }
    }

    /// Attempt state transition with validation.
    pub fn transition_to(&mut self, next: BootSequence) -> BhyveboxResult<()> {
        if !self.sequence.can_transition_to(next) {
            return Err(BhyveboxError::InvalidState(format!(
                "Cannot transition from {} to {}",
                self.sequence, next
            )));
        }
        self.sequence = next;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Move to `Failed` unless already terminal.
    pub fn fail(&mut self) {
        if !self.sequence.is_terminal() {
            self.sequence = BootSequence::Failed;
            self.last_updated = Utc::now();
        }
    }
}

impl Default for BootState {
    fn default() -> Self {
        Self::new()
    }
}
