//! Ownership of the readiness-notification handle.

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

use crate::reactor::event::Event;

/// The process-wide epoll instance.
///
/// Created once and kept for the life of the reactor; every registered
/// endpoint descriptor is subscribed against it. The poller intentionally
/// reports a single ready descriptor per wait call: dispatch handles one
/// endpoint at a time, which keeps reentrant registry mutation (a listener
/// adding a connection, a connection removing itself) trivial to reason about.
pub struct Poller {
    poll_fd: RawFd,
}

impl Poller {
    /// Creates the epoll instance.
    pub fn new() -> io::Result<Self> {
        let poll_fd = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if poll_fd < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { poll_fd })
    }

    /// Blocks until one subscribed descriptor becomes readable.
    ///
    /// Returns `Ok(None)` when the wait was interrupted by a signal, so the
    /// caller can re-check its shutdown flag. Any other wait failure is
    /// returned as the error it is; the dispatch loop treats it as fatal.
    pub fn wait_one(&self) -> io::Result<Option<RawFd>> {
        let mut events = [Event::EMPTY; 1];

        match Event::wait(self.poll_fd, &mut events) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(events[0].descriptor())),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl AsRawFd for Poller {
    fn as_raw_fd(&self) -> RawFd {
        self.poll_fd
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.poll_fd);
        }
    }
}
