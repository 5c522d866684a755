//! Terminal notification sink.
//!
//! Success notifications become a colored line on stderr once the command
//! proper has started. Failures stay in the log: the returned error is
//! rendered by miette on exit.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use tracing::debug;

use farmacia_core::{Notification, NotificationKind, Notifier};

#[derive(Debug)]
pub struct CliNotifier {
    quiet: bool,
    color: bool,
    armed: AtomicBool,
}

impl CliNotifier {
    pub fn new(quiet: bool, color: bool) -> Self {
        Self {
            quiet,
            color,
            armed: AtomicBool::new(false),
        }
    }

    /// Start printing. Earlier notifications (session setup) go to the log only.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    fn line(&self, notification: &Notification) -> String {
        if self.color {
            format!("{} {}", "✓".green().bold(), notification.message)
        } else {
            format!("✓ {}", notification.message)
        }
    }
}

impl Notifier for CliNotifier {
    fn notify(&self, notification: Notification) {
        let printable = notification.kind == NotificationKind::Success
            && !self.quiet
            && self.armed.load(Ordering::Acquire);
        if printable {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", self.line(&notification));
        } else {
            debug!(kind = %notification.kind, "{}", notification.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_has_check_mark() {
        let notifier = CliNotifier::new(false, false);
        let line = notifier.line(&Notification::success("Perda 1 finalized"));
        assert_eq!(line, "✓ Perda 1 finalized");
    }
}
