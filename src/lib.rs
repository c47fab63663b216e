//! Minimal journal-socket log-ingestion daemon.
//!
//! This crate exposes the socket surface a container or service runtime
//! expects for journal-style log collection and forwards everything to one
//! downstream sink. It includes a single-threaded, epoll-backed reactor that
//! multiplexes the watched descriptors and manages ephemeral per-connection
//! endpoints.
//!
//! # Architecture
//!
//! - **Reactor**: Waits for one ready descriptor at a time and dispatches to
//!   the matching endpoint
//! - **Registry**: Owns the live endpoints, keyed by descriptor
//! - **Endpoint**: A watched descriptor plus its kind — two persistent
//!   datagram sockets, a persistent stream listener, and ephemeral accepted
//!   connections drained exactly once
//! - **Line handlers**: Pass-through, syslog priority stripping, journal
//!   newline folding
//! - **Sink**: Appends separator-framed records to an output stream
//! - **DaemonBuilder**: Socket-path configuration and endpoint assembly

pub mod builder;
pub mod error;
pub mod handler;
pub mod net;
pub mod reactor;
pub mod reader;
pub mod sink;

pub use builder::DaemonBuilder;
pub use error::Error;
pub use handler::{JournalHandler, LineHandler, PassthroughHandler, SyslogHandler};
pub use reactor::core::{Reactor, ShutdownHandle};
pub use reactor::endpoint::{Disposition, Endpoint, EndpointKind};
pub use reactor::poller::Poller;
pub use reactor::registry::Registry;
pub use sink::{FileSink, SharedSink, Sink};
