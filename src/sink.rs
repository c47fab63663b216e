//! Output sink for normalized log records.
//!
//! Handlers forward every record to a single shared sink. The sink appends a
//! record separator followed by the record bytes; write failures are not
//! surfaced back into the reactor.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::trace;

/// Destination for normalized log records.
///
/// `write` must not block for long; it runs synchronously inside endpoint
/// dispatch. Failures stay inside the sink.
pub trait Sink {
    /// Appends one record to the output stream.
    fn write(&mut self, bytes: &[u8]);
}

/// Shared handle to the single downstream sink.
///
/// The reactor is single-threaded and every handler runs to completion on the
/// dispatch thread, so plain reference counting is sufficient.
pub type SharedSink = Rc<RefCell<dyn Sink>>;

/// Sink that appends records to any [`Write`] stream.
///
/// Each record is written as a `\n` separator followed by the record bytes,
/// then flushed. Errors are dropped after a trace note.
///
/// # Example
/// ```ignore
/// let sink: SharedSink = Rc::new(RefCell::new(FileSink::new(io::stdout())));
/// ```
pub struct FileSink<W: Write> {
    out: W,
}

impl<W: Write> FileSink<W> {
    /// Wraps an output stream in a record-separated sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Sink for FileSink<W> {
    fn write(&mut self, bytes: &[u8]) {
        let result = self
            .out
            .write_all(b"\n")
            .and_then(|()| self.out.write_all(bytes))
            .and_then(|()| self.out.flush());

        if let Err(err) = result {
            trace!(%err, "record dropped by sink");
        }
    }
}

/// In-memory sink, records separated the same way as [`FileSink`].
impl Sink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.push(b'\n');
        self.extend_from_slice(bytes);
    }
}
