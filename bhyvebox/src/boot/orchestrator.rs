//! Two-stage guest boot.

use super::runner::ProcessRunner;
use super::state::{BootSequence, BootState};
use crate::builder::{self, Stage};
use crate::config::{VmConfig, store};
use crate::errors::{BhyveboxError, BhyveboxResult};
use crate::storage::{GuestLayout, ZfsBackend};

/// Drives one guest through grub-bhyve and then bhyve.
///
/// Every step is a hard gate: the first failure moves the sequence to
/// [`BootSequence::Failed`] and is returned unchanged. Nothing is retried.
pub struct Orchestrator<'a> {
    backend: &'a dyn ZfsBackend,
    runner: &'a dyn ProcessRunner,
    state: BootState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(backend: &'a dyn ZfsBackend, runner: &'a dyn ProcessRunner) -> Self {
        Self {
            backend,
            runner,
            state: BootState::new(),
        }
    }

    pub fn state(&self) -> &BootState {
        &self.state
    }

    pub fn sequence(&self) -> BootSequence {
        self.state.sequence
    }

    /// Boot the guest at `layout`, blocking until bhyve exits.
    pub fn start(&mut self, layout: &GuestLayout) -> BhyveboxResult<()> {
        let result = self.boot(layout);
        if let Err(e) = &result {
            self.state.fail();
            tracing::error!(uuid = %layout.uuid(), error = %e, "Boot failed");
        }
        result
    }

    fn boot(&mut self, layout: &GuestLayout) -> BhyveboxResult<()> {
        let dataset = layout.dataset();
        if !self.backend.dataset_exists(&dataset)? {
            return Err(BhyveboxError::GuestNotFound(format!(
                "{} (no dataset {})",
                layout.uuid(),
                dataset
            )));
        }

        let config = store::load(layout)?;
        config.log_summary("Starting guest");

        self.run_stage(
            Stage::Bootloader,
            &config,
            layout,
            BootSequence::BootloaderRunning,
            BootSequence::BootloaderComplete,
        )?;
        self.run_stage(
            Stage::Hypervisor,
            &config,
            layout,
            BootSequence::HypervisorRunning,
            BootSequence::HypervisorExited,
        )
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        config: &VmConfig,
        layout: &GuestLayout,
        running: BootSequence,
        done: BootSequence,
    ) -> BhyveboxResult<()> {
        let command = builder::build(stage, config, layout)?;
        self.state.transition_to(running)?;
        tracing::info!(uuid = %config.uuid, %stage, "Stage running");

        let output = self.runner.run(&command)?;
        if !output.success() {
            return Err(BhyveboxError::ProcessExecution {
                binary: command.binary().display().to_string(),
                status: output.status_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        self.state.transition_to(done)?;
        tracing::info!(uuid = %config.uuid, %stage, state = %self.state.sequence, "Stage finished");
        Ok(())
    }
}
