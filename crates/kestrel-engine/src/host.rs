//! The host interface: where console output and the final outcome go.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::warn;

/// Callbacks the engine uses to talk to its embedder.
pub trait HostHooks {
    /// Receives one `console.log` line.
    fn log(&self, message: &str);

    /// Called once when evaluation completes normally.
    fn success(&self) {}

    /// Called once when evaluation ends with an uncaught exception or a
    /// fault, with a description of it.
    fn failure(&self, _reason: &str) {}
}

/// Writes log lines to stdout and failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioHost;

impl HostHooks for StdioHost {
    fn log(&self, message: &str) {
        write_line(std::io::stdout().lock(), message);
    }

    fn failure(&self, reason: &str) {
        write_line(std::io::stderr().lock(), &format!("Uncaught {reason}"));
    }
}

/// Writes one line. Returns false, with a warning, when the stream rejects
/// it.
fn write_line(mut out: impl Write, message: &str) -> bool {
    match writeln!(out, "{message}").and_then(|()| out.flush()) {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "failed to write host output");
            false
        }
    }
}

/// The outcome reported to a [`BufferedHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `success` was called
    Success,
    /// `failure` was called with this reason
    Failure(String),
}

#[derive(Debug, Default)]
struct Buffer {
    lines: Vec<String>,
    outcome: Option<Outcome>,
}

/// Collects log lines and the outcome in memory. Clones share the buffer,
/// so one clone can be handed to the engine and another inspected.
#[derive(Debug, Default, Clone)]
pub struct BufferedHost {
    buffer: Rc<RefCell<Buffer>>,
}

impl BufferedHost {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The lines logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.buffer.borrow().lines.clone()
    }

    /// The last reported outcome.
    pub fn outcome(&self) -> Option<Outcome> {
        self.buffer.borrow().outcome.clone()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        let mut buffer = self.buffer.borrow_mut();
        buffer.lines.clear();
        buffer.outcome = None;
    }
}

impl HostHooks for BufferedHost {
    fn log(&self, message: &str) {
        self.buffer.borrow_mut().lines.push(message.to_owned());
    }

    fn success(&self) {
        self.buffer.borrow_mut().outcome = Some(Outcome::Success);
    }

    fn failure(&self, reason: &str) {
        self.buffer.borrow_mut().outcome = Some(Outcome::Failure(reason.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct LogOnly;

    impl HostHooks for LogOnly {
        fn log(&self, _message: &str) {}
    }

    #[test]
    fn test_write_line() {
        let mut out = Vec::new();
        assert!(write_line(&mut out, "hello"));
        assert_eq!(out, b"hello\n");
        assert!(!write_line(ClosedPipe, "lost"));
    }

    #[test]
    fn test_default_hooks_ignore_outcome() {
        let host = LogOnly;
        host.success();
        host.failure("ignored");
    }

    #[test]
    fn test_buffered_host_shares_state() {
        let host = BufferedHost::new();
        let handle = host.clone();
        host.log("one");
        host.log("two");
        host.failure("boom");
        assert_eq!(handle.lines(), vec!["one".to_string(), "two".to_string()]);
        assert_eq!(handle.outcome(), Some(Outcome::Failure("boom".into())));

        handle.clear();
        assert!(host.lines().is_empty());
        assert_eq!(host.outcome(), None);
    }
}
