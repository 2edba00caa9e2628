//! Reporting of feed values the client does not understand
//!
//! Building a record never fails because of an unsupported enum value. The
//! value degrades to a sentinel and a notice goes to the reporter handed to
//! the builder.

use std::sync::Mutex;

use tracing::warn;

/// Feed value that was accepted but not understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Payload field the value came from
    pub field: &'static str,
    pub value: String,
}

/// Receiver for [`Notice`]s
pub trait DiagnosticReporter: Send + Sync {
    fn report(&self, notice: Notice);
}

/// Emits every notice as a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl DiagnosticReporter for TracingReporter {
    fn report(&self, notice: Notice) {
        warn!(
            field = notice.field,
            value = %notice.value,
            "'{}' is an unsupported value for {}, the client may need an update",
            notice.value,
            notice.field
        );
    }
}

/// Keeps notices in memory for callers that want to inspect them
#[derive(Debug, Default)]
pub struct RecordingReporter {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticReporter for RecordingReporter {
    fn report(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.report(Notice {
            field: "dominentpol",
            value: "xyz".to_string(),
        });
        reporter.report(Notice {
            field: "dominentpol",
            value: "abc".to_string(),
        });

        let values: Vec<String> = reporter.notices().into_iter().map(|n| n.value).collect();
        assert_eq!(values, vec!["xyz", "abc"]);
    }

    #[test]
    fn test_tracing_reporter_does_not_panic() {
        TracingReporter.report(Notice {
            field: "dominentpol",
            value: "xyz".to_string(),
        });
    }
}
