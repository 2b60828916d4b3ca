use std::io::{self, Write};
use tracing::error;

/// Receives user-facing failure messages from transfer operations.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Any `Fn(&str)` closure can act as a notifier.
impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn error(&self, message: &str) {
        self(message)
    }
}

/// Reports through `tracing` once a global subscriber is installed, otherwise
/// straight to stderr so library users without one still see the failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        if tracing::dispatcher::has_been_set() {
            error!("{}", message);
        } else {
            // Nowhere left to report a failed stderr write
            let _ = write_plain(&mut io::stderr().lock(), message);
        }
    }
}

fn write_plain(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "error: {}", message)
}
