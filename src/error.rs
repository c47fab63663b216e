//! Error types for the reactor and its registry.

use std::io;
use std::os::unix::io::RawFd;

use thiserror::Error;

/// Errors surfaced by endpoint registration and the dispatch loop.
#[derive(Debug, Error)]
pub enum Error {
    /// The descriptor is already registered. Registration is keyed by
    /// descriptor value and each descriptor has exactly one owner, so this
    /// indicates a programming defect rather than a recoverable condition.
    #[error("descriptor {0} is already registered")]
    DuplicateDescriptor(RawFd),

    /// The readiness wait failed for a reason other than signal interruption.
    /// This is fatal to the dispatch loop.
    #[error("readiness wait failed: {0}")]
    Wait(#[source] io::Error),

    /// Any other I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}
