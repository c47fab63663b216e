use std::cell::RefCell;
use std::os::unix::io::IntoRawFd;
use std::os::unix::net::UnixStream;
use std::rc::Rc;

use logtap::{Endpoint, EndpointKind, Error, Poller, Registry, SharedSink};

// Exercises the whole registration contract in one sequence; the duplicate
// step deliberately creates a second owner for one descriptor, so this file
// stays a single test to keep descriptor numbers stable.
#[test]
fn registry_contract() {
    let poller = Poller::new().expect("poller");
    let mut registry = Registry::new(&poller);
    let sink: SharedSink = Rc::new(RefCell::new(Vec::<u8>::new()));

    let (left, _right) = UnixStream::pair().expect("socketpair");
    let file_descriptor = left.into_raw_fd();

    registry
        .register(Endpoint::adopt_stream(file_descriptor, &sink))
        .expect("register");
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.lookup(file_descriptor).map(Endpoint::kind),
        Some(EndpointKind::StreamConnection)
    );

    // Registering the same descriptor again is rejected and the original
    // registration survives.
    let duplicate = Endpoint::adopt_stream(file_descriptor, &sink);
    let err = registry.register(duplicate).expect_err("duplicate accepted");
    assert!(matches!(err, Error::DuplicateDescriptor(fd) if fd == file_descriptor));
    assert_eq!(registry.len(), 1);
    assert!(registry.lookup(file_descriptor).is_some());

    // Unregistering a descriptor that was never registered is a no-op.
    registry.unregister(file_descriptor + 512);
    assert_eq!(registry.len(), 1);

    registry.unregister(file_descriptor);
    assert!(registry.lookup(file_descriptor).is_none());
    assert!(registry.is_empty());
}
