//! Error-tracking seam
//!
//! Faults worth a human's attention go to an injected [`ErrorReporter`];
//! reset-style connection noise is filtered at the call site before it ever
//! reaches the reporter. The default reporter writes through `tracing`.

use tracing::{error, warn};

use crate::error::StoreError;

/// Sink for store faults that should reach error tracking.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorReporter: Send + Sync {
    /// Deliver one fault together with the operation it interrupted.
    fn report(&self, context: &str, error: &StoreError);
}

/// Default reporter: structured log lines at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, context: &str, error: &StoreError) {
        error!(context, %error, "store fault");
    }
}

/// Report a fault unless it is transient connection noise, which is only
/// logged at warn level.
pub(crate) fn report_fault(reporter: &dyn ErrorReporter, context: &str, error: &StoreError) {
    if error.is_transient() {
        warn!(context, %error, "transient store fault, not reported");
    } else {
        reporter.report(context, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn transient_faults_skip_the_reporter() {
        let mut reporter = MockErrorReporter::new();
        reporter.expect_report().never();

        let err = StoreError::unavailable(io::Error::new(io::ErrorKind::ConnectionReset, "peer"));
        report_fault(&reporter, "guilds.fetch", &err);
    }

    #[test]
    fn real_faults_reach_the_reporter() {
        let mut reporter = MockErrorReporter::new();
        reporter
            .expect_report()
            .withf(|context, error| context == "guilds.fetch" && !error.is_transient())
            .times(1)
            .return_const(());

        report_fault(&reporter, "guilds.fetch", &StoreError::backend("boom"));
    }
}
