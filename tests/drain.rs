use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::{UnixDatagram, UnixStream};

use logtap::LineHandler;
use logtap::reader;

struct Collect {
    chunks: Vec<Vec<u8>>,
}

impl Collect {
    fn new() -> Self {
        Self { chunks: Vec::new() }
    }
}

impl LineHandler for Collect {
    fn handle(&mut self, bytes: &[u8]) {
        self.chunks.push(bytes.to_vec());
    }
}

#[test]
fn drain_hands_over_all_available_bytes() {
    let (mut tx, rx) = UnixStream::pair().expect("socketpair");
    rx.set_nonblocking(true).expect("nonblocking");

    // More than one read buffer's worth, so the drain loops.
    let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    tx.write_all(&payload).expect("write payload");

    let mut collect = Collect::new();
    reader::drain(rx.as_raw_fd(), &mut collect);

    assert!(collect.chunks.len() >= 2);
    assert_eq!(collect.chunks.concat(), payload);

    // Nothing left: a second drain returns without producing chunks.
    let chunks_before = collect.chunks.len();
    reader::drain(rx.as_raw_fd(), &mut collect);
    assert_eq!(collect.chunks.len(), chunks_before);
}

#[test]
fn drain_stops_cleanly_at_peer_close() {
    let (mut tx, rx) = UnixStream::pair().expect("socketpair");
    rx.set_nonblocking(true).expect("nonblocking");

    tx.write_all(b"tail").expect("write");
    drop(tx);

    let mut collect = Collect::new();
    reader::drain(rx.as_raw_fd(), &mut collect);
    assert_eq!(collect.chunks, vec![b"tail".to_vec()]);

    // Peer is gone; the next drain sees end-of-stream and returns.
    reader::drain(rx.as_raw_fd(), &mut collect);
    assert_eq!(collect.chunks.len(), 1);
}

#[test]
fn drain_keeps_datagram_boundaries() {
    let (tx, rx) = UnixDatagram::pair().expect("datagram pair");
    rx.set_nonblocking(true).expect("nonblocking");

    tx.send(b"first").expect("send");
    tx.send(b"second").expect("send");

    let mut collect = Collect::new();
    reader::drain(rx.as_raw_fd(), &mut collect);

    assert_eq!(collect.chunks, vec![b"first".to_vec(), b"second".to_vec()]);
}
