//! Render reporting.

use std::time::{Duration, Instant};

/// Stores report state.
#[derive(Debug)]
pub enum ReportState {
    /// No state.
    None,
    /// The last row that was reported.
    Row(u32),
    /// The last instant been reported.
    Duration(Instant),
}

/// Specifies how often progress is logged when rendering.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Report {
    /// No report.
    None,
    /// Report every Nth row.
    Row(u32),
    /// Report every duration.
    Duration(Duration),
}

impl Default for Report {
    fn default() -> Report {Report::Row(10)}
}

impl Report {
    /// Gets the start state of reporting.
    pub fn start(&self) -> ReportState {
        match self {
            Report::None => ReportState::None,
            Report::Row(_) => ReportState::Row(0),
            Report::Duration(_) => ReportState::Duration(Instant::now()),
        }
    }

    /// Update the report state and return `true` if should report.
    pub fn update(&self, state: &mut ReportState, row: u32) -> bool {
        use ReportState::*;
        match (self, state) {
            (Report::None, None) => false,
            (Report::Row(0), Row(_)) => false,
            (Report::Row(n), Row(last)) => {
                if row >= *last + n {
                    *last += n;
                    true
                } else {false}
            }
            (Report::Duration(dur), Duration(last)) => {
                let now = Instant::now();
                if now >= *last + *dur {
                    *last = now;
                    true
                } else {false}
            }
            _ => false,
        }
    }

    /// Logs progress of a channel if due.
    pub fn progress(&self, state: &mut ReportState, channel: &str, row: u32, height: u32) {
        if self.update(state, row) {
            tracing::info!(channel, row = row + 1, height, "rendering row {} of {}", row + 1, height);
        }
    }
}
