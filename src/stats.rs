//! Expedition activity counters.

use std::fmt;

/// Running totals over the life of the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpeditionStats {
    /// Dispatch attempts started, including aborted ones.
    pub attempted: u64,
    /// Returns reconciled.
    pub received: u64,
    /// Fleets successfully sent out.
    pub sent: u64,
}

impl ExpeditionStats {
    pub(crate) fn record_attempted(&mut self) {
        self.attempted += 1;
    }

    pub(crate) fn record_received(&mut self) {
        self.received += 1;
    }

    pub(crate) fn record_sent(&mut self) {
        self.sent += 1;
    }
}

impl fmt::Display for ExpeditionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sent / {} received / {} attempted",
            self.sent, self.received, self.attempted
        )
    }
}
