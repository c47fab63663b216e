//! The dispatch loop.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM, SIGUSR1};
use tracing::{debug, info, trace};

use crate::error::Error;
use crate::reactor::endpoint::Disposition;
use crate::reactor::poller::Poller;
use crate::reactor::registry::Registry;

/// Single-threaded socket reactor.
///
/// Owns the poller and the registry, and runs the loop that waits for one
/// ready descriptor at a time and invokes the matching endpoint's callback.
/// Exactly one callback runs at a time, to completion, before the next wait;
/// the wait call is the sole blocking point in the process.
///
/// Shutdown is cooperative: SIGINT/SIGTERM set an atomic flag that the loop
/// observes between wait calls, so an in-flight callback always finishes
/// first.
pub struct Reactor {
    registry: Registry,
    poller: Poller,
    stop_requested: Arc<AtomicBool>,
    flush_requested: Arc<AtomicBool>,
}

/// Cloneable handle that requests a reactor stop from another thread.
///
/// Equivalent to delivering a shutdown signal: the flag is observed between
/// wait calls, at the reactor's next wakeup.
#[derive(Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Reactor {
    /// Creates a reactor with an empty registry.
    pub fn new() -> io::Result<Self> {
        let poller = Poller::new()?;
        let registry = Registry::new(&poller);

        Ok(Self {
            registry,
            poller,
            stop_requested: Arc::new(AtomicBool::new(false)),
            flush_requested: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Returns a handle that can stop the dispatch loop.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.stop_requested))
    }

    /// Runs the dispatch loop until a stop is requested.
    ///
    /// Installs the signal handling first: SIGINT/SIGTERM request a stop,
    /// SIGHUP/SIGUSR1 are accepted and noted (reserved for a future flush
    /// feature). Handler context does nothing beyond an atomic store; all
    /// diagnostics are emitted from the loop after the flags are read.
    ///
    /// A wait failure other than signal interruption is fatal and is returned
    /// as [`Error::Wait`]; the registry and its endpoints are torn down by
    /// normal drop on the way out.
    pub fn run(&mut self) -> Result<(), Error> {
        self.install_signal_flags()?;
        info!(endpoints = self.registry.len(), "dispatch loop running");

        while !self.stop_requested.load(Ordering::SeqCst) {
            if self.flush_requested.swap(false, Ordering::SeqCst) {
                debug!("flush requested; flushing is not implemented yet");
            }

            let ready = match self.poller.wait_one() {
                Ok(Some(file_descriptor)) => file_descriptor,
                Ok(None) => continue,
                Err(err) => return Err(Error::Wait(err)),
            };

            // Ownership moves out of the registry for the duration of the
            // callback, leaving the map free for reentrant mutation.
            let Some(mut endpoint) = self.registry.take(ready) else {
                continue;
            };

            match endpoint.on_readable(&mut self.registry) {
                Disposition::Keep => self.registry.restore(endpoint),
                Disposition::Close => {
                    // Unsubscribe strictly before the descriptor closes.
                    self.registry.unwatch(ready);
                    trace!(file_descriptor = ready, "connection endpoint torn down");
                }
            }
        }

        info!("stop requested, dispatch loop finished");
        Ok(())
    }

    fn install_signal_flags(&self) -> io::Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.stop_requested))?;
        }

        for signal in [SIGHUP, SIGUSR1] {
            signal_hook::flag::register(signal, Arc::clone(&self.flush_requested))?;
        }

        Ok(())
    }
}
