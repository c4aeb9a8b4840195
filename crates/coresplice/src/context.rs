//! Per-run state handed to every pipeline stage.

use crate::config::SpliceConfig;
use crate::diagnostics::{Diagnostics, Observation};
use crate::progress::{NoProgress, ProgressEvent, ProgressListener};

/// Configuration, progress listener and collected diagnostics for one run.
pub struct RunContext<'a> {
    config: &'a SpliceConfig,
    progress: &'a dyn ProgressListener,
    diagnostics: Diagnostics,
}

impl<'a> RunContext<'a> {
    pub fn new(config: &'a SpliceConfig) -> Self {
        Self {
            config,
            progress: &NoProgress,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressListener) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &'a SpliceConfig {
        self.config
    }

    pub fn record(&mut self, observation: Observation) {
        self.diagnostics.record(observation);
    }

    pub fn progress(&self, event: ProgressEvent) {
        self.progress.on_progress(event);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

impl std::fmt::Debug for RunContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("config", &self.config)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
