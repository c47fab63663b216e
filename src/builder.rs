//! Fluent builder for daemon construction.
//!
//! Provides a builder pattern interface for configuring the socket paths and
//! assembling the reactor with its persistent endpoints.

use std::io;
use std::path::PathBuf;

use tracing::warn;

use crate::reactor::core::Reactor;
use crate::reactor::endpoint::Endpoint;
use crate::sink::SharedSink;

/// Builder for a fully wired log-ingestion reactor.
///
/// Socket paths default to the conventional journal locations; deployments
/// override them as needed. The syslog alias (typically `/dev/log`) is opt-in
/// so embedded and test uses never touch `/dev`.
///
/// # Example
/// ```ignore
/// let reactor = DaemonBuilder::new()
///     .syslog_alias("/dev/log")
///     .build(sink)?;
/// ```
pub struct DaemonBuilder {
    syslog_path: PathBuf,
    syslog_alias: Option<PathBuf>,
    structured_path: PathBuf,
    stream_path: PathBuf,
}

impl Default for DaemonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DaemonBuilder {
    /// Creates a builder with the conventional journal socket paths.
    pub fn new() -> Self {
        Self {
            syslog_path: PathBuf::from("/run/systemd/journal/dev-log"),
            syslog_alias: None,
            structured_path: PathBuf::from("/run/systemd/journal/socket"),
            stream_path: PathBuf::from("/run/systemd/journal/stdout"),
        }
    }

    /// Overrides the syslog datagram socket path.
    pub fn syslog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.syslog_path = path.into();
        self
    }

    /// Publishes a symlink alias for the syslog socket, e.g. `/dev/log`.
    pub fn syslog_alias(mut self, path: impl Into<PathBuf>) -> Self {
        self.syslog_alias = Some(path.into());
        self
    }

    /// Overrides the structured datagram socket path.
    pub fn structured_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.structured_path = path.into();
        self
    }

    /// Overrides the stdout stream listener path.
    pub fn stream_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stream_path = path.into();
        self
    }

    /// Builds the reactor and registers whichever persistent endpoints could
    /// be constructed.
    ///
    /// A single endpoint failing to bind degrades that endpoint only: the
    /// failure is reported and the reactor proceeds with the rest. Only a
    /// failure to create the reactor itself is an error.
    ///
    /// # Arguments
    /// * `sink` - The shared downstream sink all handlers forward to
    ///
    /// # Returns
    /// A reactor ready for [`Reactor::run`]
    pub fn build(self, sink: SharedSink) -> io::Result<Reactor> {
        let mut reactor = Reactor::new()?;

        let endpoints = [
            (
                "syslog",
                Endpoint::syslog(&self.syslog_path, self.syslog_alias.as_deref(), &sink),
            ),
            (
                "structured",
                Endpoint::structured(&self.structured_path, &sink),
            ),
            (
                "stdout",
                Endpoint::stream_listener(&self.stream_path, &sink),
            ),
        ];

        for (name, endpoint) in endpoints {
            match endpoint {
                Ok(endpoint) => {
                    if let Err(err) = reactor.registry_mut().register(endpoint) {
                        warn!(endpoint = name, %err, "endpoint could not be registered");
                    }
                }
                Err(err) => warn!(endpoint = name, %err, "endpoint unavailable"),
            }
        }

        Ok(reactor)
    }
}
