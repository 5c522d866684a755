// ── Stores ──
//
// Each store owns the records of one type and reports every operation's
// outcome to the session's notifier.

pub(crate) mod collection;
mod documents;
mod records;

pub use documents::DocumentStore;
pub use records::RecordStore;

use tracing::warn;

use crate::error::CoreError;
use crate::notify::{Notification, Notifier};

/// Send a success or failure notification for `result` and hand it back.
pub(crate) fn report<T>(
    notifier: &dyn Notifier,
    subject: &str,
    verb: &str,
    result: Result<T, CoreError>,
    success: impl FnOnce(&T) -> String,
) -> Result<T, CoreError> {
    match &result {
        Ok(value) => notifier.notify(Notification::success(success(value))),
        Err(err) => report_failure(notifier, subject, verb, err),
    }
    result
}

/// Failure-only variant for reads, which stay silent on success.
pub(crate) fn report_failure(notifier: &dyn Notifier, subject: &str, verb: &str, err: &CoreError) {
    warn!(subject, verb, error = %err, "operation failed");
    notifier.notify(Notification::error(format!("Could not {verb} {subject}: {err}")));
}
