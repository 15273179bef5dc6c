//! Output streams visible to the guest.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Destination for guest-originated output (write syscalls, diagnostics).
pub trait StreamSink {
    /// Writes raw bytes to the stream.
    fn write(&self, bytes: &[u8]);
}

/// Shared handle to a stream sink.
pub type SinkHandle = Rc<dyn StreamSink>;

/// Sink that forwards to the host's stdout.
#[derive(Default)]
pub struct StdoutSink;

impl StreamSink for StdoutSink {
    fn write(&self, bytes: &[u8]) {
        let mut out = std::io::stdout();
        let _ = out.write_all(bytes);
        let _ = out.flush();
    }
}

/// Sink that forwards to the host's stderr.
#[derive(Default)]
pub struct StderrSink;

impl StreamSink for StderrSink {
    fn write(&self, bytes: &[u8]) {
        let mut err = std::io::stderr();
        let _ = err.write_all(bytes);
        let _ = err.flush();
    }
}

/// Sink that records output in memory, for tests.
#[derive(Clone, Default)]
pub struct CaptureSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl CaptureSink {
    /// Creates an empty capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Returns the captured bytes as a lossy UTF-8 string.
    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl StreamSink for CaptureSink {
    fn write(&self, bytes: &[u8]) {
        self.buf.borrow_mut().extend_from_slice(bytes);
    }
}
