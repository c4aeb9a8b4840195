//! Progress reporting for long conversions.

use crate::identity::CoreKey;

/// Pipeline stage a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load,
    BuildSplice,
    OffSplice,
    Finish,
    Export,
    Write,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Load => "Loading tables",
            Stage::BuildSplice => "Building splice",
            Stage::OffSplice => "Resolving off-splice cores",
            Stage::Finish => "Finishing affine table",
            Stage::Export => "Splicing measurements",
            Stage::Write => "Writing outputs",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    StageStarted(Stage),
    /// A splice interval was resolved; `index` is 0-based.
    IntervalResolved {
        index: usize,
        total: usize,
        core: CoreKey,
    },
    /// An off-splice core received its affine row.
    CoreResolved {
        index: usize,
        total: usize,
        core: CoreKey,
    },
    StageFinished(Stage),
}

/// Receives progress events. Implementations must be cheap; they are called
/// once per interval and per core.
pub trait ProgressListener {
    fn on_progress(&self, event: ProgressEvent);
}

/// Closures are listeners.
impl<F> ProgressListener for F
where
    F: Fn(ProgressEvent),
{
    fn on_progress(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn on_progress(&self, _event: ProgressEvent) {}
}
