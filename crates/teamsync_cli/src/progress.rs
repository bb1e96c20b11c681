//! Rendering of [`ReconcileProgress`] events.
//!
//! On a terminal the run is drawn as an indicatif bar over the groups; when
//! stdout is piped (CI, cron) every event becomes a tracing record instead.

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use teamsync::sync::{ProgressCallback, ReconcileProgress};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Where progress events go for this process.
pub enum ProgressReporter {
    Interactive(InteractiveReporter),
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Pick the mode from whether stdout is a terminal.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    pub fn handle(&self, event: ReconcileProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Callback handed to the [`teamsync::sync::Reconciler`].
    ///
    /// Shares the reporter so the caller can still [`finish`](Self::finish)
    /// it when the run is cut short.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| reporter.handle(event))
    }

    /// Clear any bar still on screen. No-op when logging.
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
