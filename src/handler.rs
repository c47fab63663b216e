//! Line handlers that normalize raw socket bytes before they reach the sink.
//!
//! A handler receives exactly the bytes produced by one read of the drain
//! loop, which is not necessarily a whole line. Three variants exist:
//! pass-through, syslog priority stripping, and journal newline folding.

use crate::sink::SharedSink;

/// Per-chunk transform between a drained descriptor and the sink.
///
/// `handle` runs synchronously on the dispatch thread and must not block.
pub trait LineHandler {
    /// Normalizes one chunk and forwards it to the sink.
    fn handle(&mut self, bytes: &[u8]);
}

/// Forwards chunks to the sink unchanged.
pub struct PassthroughHandler {
    sink: SharedSink,
}

impl PassthroughHandler {
    pub fn new(sink: SharedSink) -> Self {
        Self { sink }
    }
}

impl LineHandler for PassthroughHandler {
    fn handle(&mut self, bytes: &[u8]) {
        self.sink.borrow_mut().write(bytes);
    }
}

/// Strips a leading `<N>` priority tag and trailing newlines.
///
/// The numeric level and facility carry no information for this daemon, which
/// performs no priority-based filtering. A tag is only stripped when the full
/// `<digits>` prefix is present; anything else is forwarded verbatim minus
/// trailing newlines.
pub struct SyslogHandler {
    sink: SharedSink,
}

impl SyslogHandler {
    pub fn new(sink: SharedSink) -> Self {
        Self { sink }
    }
}

impl LineHandler for SyslogHandler {
    fn handle(&mut self, bytes: &[u8]) {
        let mut start = 0;
        if bytes.first() == Some(&b'<') {
            let digits = bytes[1..]
                .iter()
                .take_while(|byte| byte.is_ascii_digit())
                .count();
            if bytes.get(1 + digits) == Some(&b'>') {
                start = 2 + digits;
            }
        }

        let mut end = bytes.len();
        while end > start && bytes[end - 1] == b'\n' {
            end -= 1;
        }

        self.sink.borrow_mut().write(&bytes[start..end]);
    }
}

/// Folds embedded newlines to spaces so a multi-line payload stays one record.
///
/// The chunk length is unchanged; only `\n` bytes are rewritten.
pub struct JournalHandler {
    sink: SharedSink,
    folded: Vec<u8>,
}

impl JournalHandler {
    pub fn new(sink: SharedSink) -> Self {
        Self {
            sink,
            folded: Vec::new(),
        }
    }
}

impl LineHandler for JournalHandler {
    fn handle(&mut self, bytes: &[u8]) {
        self.folded.clear();
        self.folded.extend_from_slice(bytes);

        for byte in &mut self.folded {
            if *byte == b'\n' {
                *byte = b' ';
            }
        }

        self.sink.borrow_mut().write(&self.folded);
    }
}
