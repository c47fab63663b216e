//! Descriptor-keyed ownership of live endpoints.

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::os::unix::io::{AsRawFd, RawFd};

use crate::error::Error;
use crate::reactor::endpoint::Endpoint;
use crate::reactor::event::Event;
use crate::reactor::poller::Poller;

/// The set of watched endpoints, keyed by descriptor.
///
/// The registry holds the sole owner of every registered endpoint and is the
/// only component that adds or removes readiness subscriptions. Two invariants
/// hold at all times:
/// - every key in the map has an active subscription on the poller;
/// - a descriptor is unsubscribed strictly before it can be closed, so a
///   reused descriptor number can never alias a stale subscription.
///
/// The registry is mutated only from the dispatch thread, including
/// reentrantly from inside an endpoint callback.
pub struct Registry {
    poll_fd: RawFd,
    endpoints: HashMap<RawFd, Endpoint>,
}

impl Registry {
    /// Creates an empty registry subscribing against `poller`.
    ///
    /// The poller must outlive the registry; the reactor owns both.
    pub fn new(poller: &Poller) -> Self {
        Self {
            poll_fd: poller.as_raw_fd(),
            endpoints: HashMap::new(),
        }
    }

    /// Subscribes the endpoint's descriptor and takes ownership of it.
    ///
    /// Fails with [`Error::DuplicateDescriptor`] if the descriptor is already
    /// present; the existing registration is left intact and the offered
    /// endpoint is dropped, closing its descriptor. A duplicate means two
    /// owners of one descriptor already exist, which the single-threaded
    /// mutation discipline rules out in correct code.
    pub fn register(&mut self, endpoint: Endpoint) -> Result<(), Error> {
        let file_descriptor = endpoint.descriptor();

        match self.endpoints.entry(file_descriptor) {
            MapEntry::Occupied(_) => Err(Error::DuplicateDescriptor(file_descriptor)),
            MapEntry::Vacant(slot) => {
                Event::new(file_descriptor).register(self.poll_fd)?;
                slot.insert(endpoint);
                Ok(())
            }
        }
    }

    /// Unsubscribes the descriptor and drops its endpoint, closing it.
    ///
    /// A descriptor that is not registered is a no-op, not an error.
    pub fn unregister(&mut self, file_descriptor: RawFd) {
        if self.endpoints.contains_key(&file_descriptor) {
            Event::unregister(self.poll_fd, file_descriptor);
            self.endpoints.remove(&file_descriptor);
        }
    }

    /// Looks up the endpoint watching `file_descriptor`.
    ///
    /// Absence is not an error; the dispatch loop simply skips the event.
    pub fn lookup(&self, file_descriptor: RawFd) -> Option<&Endpoint> {
        self.endpoints.get(&file_descriptor)
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Descriptors currently registered, in no particular order.
    pub fn descriptors(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.endpoints.keys().copied()
    }

    /// Moves an endpoint out of the map for dispatch.
    ///
    /// The readiness subscription stays armed; the caller either restores the
    /// endpoint or unwatches the descriptor before dropping it.
    pub(crate) fn take(&mut self, file_descriptor: RawFd) -> Option<Endpoint> {
        self.endpoints.remove(&file_descriptor)
    }

    /// Puts a dispatched endpoint back.
    pub(crate) fn restore(&mut self, endpoint: Endpoint) {
        self.endpoints.insert(endpoint.descriptor(), endpoint);
    }

    /// Drops the readiness subscription without touching the map.
    pub(crate) fn unwatch(&self, file_descriptor: RawFd) {
        Event::unregister(self.poll_fd, file_descriptor);
    }
}
