//! Watched socket endpoints and their notification behavior.

use std::io;
use std::os::unix::io::RawFd;
use std::path::Path;

use tracing::{trace, warn};

use crate::handler::{JournalHandler, LineHandler, PassthroughHandler, SyslogHandler};
use crate::net::unix;
use crate::reactor::event::Event;
use crate::reactor::registry::Registry;
use crate::reader;
use crate::sink::SharedSink;

/// The kind tag of an [`Endpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    DatagramSyslog,
    DatagramStructured,
    StreamListener,
    StreamConnection,
}

/// What the dispatch loop should do with an endpoint after its callback.
#[derive(Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Restore the endpoint; it stays watched.
    Keep,
    /// Unsubscribe and drop the endpoint, closing its descriptor.
    Close,
}

/// One watched descriptor plus its notification behavior.
///
/// The two datagram endpoints and the stream listener are persistent: created
/// at startup, watched until process shutdown. Stream connections are
/// ephemeral: created by the listener on accept, drained exactly once, then
/// torn down regardless of whether the peer could send more later.
///
/// Every endpoint exclusively owns its descriptor and closes it exactly once,
/// on drop.
pub enum Endpoint {
    DatagramSyslog(Datagram),
    DatagramStructured(Datagram),
    StreamListener(Listener),
    StreamConnection(Connection),
}

/// A bound, non-blocking datagram socket.
pub struct Datagram {
    file_descriptor: RawFd,
    handler: Box<dyn LineHandler>,
}

/// A bound, listening, non-blocking stream socket. Never carries payload
/// data itself; it only accepts.
pub struct Listener {
    file_descriptor: RawFd,
    sink: SharedSink,
}

/// An accepted stream connection, drained once and discarded.
pub struct Connection {
    file_descriptor: RawFd,
    handler: Box<dyn LineHandler>,
}

impl Endpoint {
    /// Creates the syslog datagram endpoint bound at `path`.
    ///
    /// Input is drained through the priority-stripping handler. When `alias`
    /// is given, a conventional symlink (such as `/dev/log`) is published
    /// best-effort next to the bound path.
    pub fn syslog(path: &Path, alias: Option<&Path>, sink: &SharedSink) -> io::Result<Self> {
        let file_descriptor = unix::bind_datagram(path)?;
        if let Some(alias) = alias {
            unix::link_alias(path, alias);
        }

        Ok(Self::DatagramSyslog(Datagram {
            file_descriptor,
            handler: Box::new(SyslogHandler::new(sink.clone())),
        }))
    }

    /// Creates the structured datagram endpoint bound at `path`.
    ///
    /// Input passes through to the sink unchanged.
    pub fn structured(path: &Path, sink: &SharedSink) -> io::Result<Self> {
        let file_descriptor = unix::bind_datagram(path)?;

        Ok(Self::DatagramStructured(Datagram {
            file_descriptor,
            handler: Box::new(PassthroughHandler::new(sink.clone())),
        }))
    }

    /// Creates the stdout stream listener bound at `path`.
    ///
    /// Each accepted connection becomes an ephemeral [`Endpoint::StreamConnection`]
    /// draining through the newline-folding handler.
    pub fn stream_listener(path: &Path, sink: &SharedSink) -> io::Result<Self> {
        let file_descriptor = unix::bind_listener(path)?;

        Ok(Self::StreamListener(Listener {
            file_descriptor,
            sink: sink.clone(),
        }))
    }

    /// Wraps an already-connected stream descriptor as a connection endpoint,
    /// taking ownership of it.
    pub fn adopt_stream(file_descriptor: RawFd, sink: &SharedSink) -> Self {
        Event::set_nonblocking(file_descriptor);

        Self::StreamConnection(Connection {
            file_descriptor,
            handler: Box::new(JournalHandler::new(sink.clone())),
        })
    }

    /// The watched descriptor.
    pub fn descriptor(&self) -> RawFd {
        match self {
            Self::DatagramSyslog(datagram) | Self::DatagramStructured(datagram) => {
                datagram.file_descriptor
            }
            Self::StreamListener(listener) => listener.file_descriptor,
            Self::StreamConnection(connection) => connection.file_descriptor,
        }
    }

    pub fn kind(&self) -> EndpointKind {
        match self {
            Self::DatagramSyslog(_) => EndpointKind::DatagramSyslog,
            Self::DatagramStructured(_) => EndpointKind::DatagramStructured,
            Self::StreamListener(_) => EndpointKind::StreamListener,
            Self::StreamConnection(_) => EndpointKind::StreamConnection,
        }
    }

    /// Handles one readiness notification.
    ///
    /// Runs to completion on the dispatch thread. The endpoint has been taken
    /// out of the registry for the duration of the call, so the callback may
    /// freely mutate the registry: the listener registers newly accepted
    /// connections into it. The returned [`Disposition`] tells the dispatch
    /// loop whether to restore the endpoint or tear it down.
    pub fn on_readable(&mut self, registry: &mut Registry) -> Disposition {
        match self {
            Self::DatagramSyslog(datagram) | Self::DatagramStructured(datagram) => {
                reader::drain(datagram.file_descriptor, datagram.handler.as_mut());
                Disposition::Keep
            }
            Self::StreamListener(listener) => {
                listener.accept_one(registry);
                Disposition::Keep
            }
            Self::StreamConnection(connection) => {
                reader::drain(connection.file_descriptor, connection.handler.as_mut());
                Disposition::Close
            }
        }
    }
}

impl Listener {
    /// Accepts at most one pending connection and registers it.
    ///
    /// No pending connection, a transient accept failure, or a failed
    /// registration all leave the listener watched and waiting for the next
    /// notification.
    fn accept_one(&self, registry: &mut Registry) {
        let peer = match unix::accept_connection(self.file_descriptor) {
            Ok(file_descriptor) => file_descriptor,
            Err(err) => {
                if err.kind() != io::ErrorKind::WouldBlock {
                    trace!(%err, "accept produced no connection");
                }
                return;
            }
        };

        let connection = Endpoint::adopt_stream(peer, &self.sink);
        if let Err(err) = registry.register(connection) {
            warn!(%err, "accepted connection dropped");
        }
    }
}

impl Drop for Datagram {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.file_descriptor);
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.file_descriptor);
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.file_descriptor);
        }
    }
}
