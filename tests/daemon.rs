use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Read;
use std::io::Write;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use std::os::unix::net::{UnixDatagram, UnixStream};

use logtap::{DaemonBuilder, Endpoint, EndpointKind, FileSink, SharedSink};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("timed out waiting for {what}");
}

#[test]
fn daemon_end_to_end() {
    let dir = tempfile::tempdir().expect("tempdir");
    let syslog_path = dir.path().join("dev-log");
    let structured_path = dir.path().join("socket");
    let stream_path = dir.path().join("stdout");
    let record_path = dir.path().join("records");

    // The reactor is single-threaded and not sendable, so the daemon is
    // assembled and run inside its own thread; only the shutdown handle
    // crosses back.
    let (handle_tx, handle_rx) = mpsc::channel();
    let worker = {
        let syslog_path = syslog_path.clone();
        let structured_path = structured_path.clone();
        let stream_path = stream_path.clone();
        let record_path = record_path.clone();

        thread::spawn(move || {
            let out = File::create(&record_path).expect("record file");
            let sink: SharedSink = Rc::new(RefCell::new(FileSink::new(out)));

            let mut reactor = DaemonBuilder::new()
                .syslog_path(&syslog_path)
                .structured_path(&structured_path)
                .stream_path(&stream_path)
                .build(sink)
                .expect("build daemon");

            handle_tx.send(reactor.shutdown_handle()).expect("send handle");
            reactor.run().expect("dispatch loop");
        })
    };

    // All three sockets were bound before the handle was sent.
    let shutdown = handle_rx.recv().expect("shutdown handle");
    assert!(!shutdown.is_stop_requested());

    let client = UnixDatagram::unbound().expect("datagram client");
    client
        .send_to(b"<13>hello\n", &syslog_path)
        .expect("send syslog");
    client
        .send_to(b"FIELD=value", &structured_path)
        .expect("send structured");

    let mut conn = UnixStream::connect(&stream_path).expect("connect");
    conn.write_all(b"line one\nline two").expect("stream write");
    conn.set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");

    // The daemon drains the connection once and closes it, peer or no peer.
    let mut probe = [0u8; 1];
    let n = conn.read(&mut probe).expect("read after teardown");
    assert_eq!(n, 0, "drained connection should be closed by the daemon");

    // The listener stays registered and keeps accepting.
    let mut conn2 = UnixStream::connect(&stream_path).expect("second connect");
    conn2.write_all(b"again").expect("second write");
    conn2
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");
    let n = conn2.read(&mut probe).expect("second read");
    assert_eq!(n, 0);

    wait_until("records to land", || {
        fs::read(&record_path)
            .map(|records| {
                contains(&records, b"\nhello")
                    && contains(&records, b"\nFIELD=value")
                    && contains(&records, b"\nline one line two")
                    && contains(&records, b"\nagain")
            })
            .unwrap_or(false)
    });

    // Shutdown by real signal: the handler only sets the flag, the loop
    // observes it at its next wakeup.
    unsafe { libc::raise(libc::SIGTERM) };
    client.send_to(b"wake\n", &syslog_path).expect("send wake");
    worker.join().expect("daemon thread");

    let records = fs::read(&record_path).expect("records");
    assert!(contains(&records, b"\nwake"));
}

#[test]
fn failed_endpoint_degrades_only_itself() {
    let dir = tempfile::tempdir().expect("tempdir");

    // A bind under a directory that does not exist fails construction for
    // that endpoint alone.
    let missing = dir.path().join("no-such-dir").join("dev-log");

    let sink: SharedSink = Rc::new(RefCell::new(Vec::<u8>::new()));
    let reactor = DaemonBuilder::new()
        .syslog_path(&missing)
        .structured_path(dir.path().join("socket"))
        .stream_path(dir.path().join("stdout"))
        .build(sink)
        .expect("build");

    assert_eq!(reactor.registry().len(), 2);

    let kinds: Vec<EndpointKind> = reactor
        .registry()
        .descriptors()
        .filter_map(|fd| reactor.registry().lookup(fd).map(Endpoint::kind))
        .collect();
    assert!(kinds.contains(&EndpointKind::DatagramStructured));
    assert!(kinds.contains(&EndpointKind::StreamListener));
    assert!(!kinds.contains(&EndpointKind::DatagramSyslog));
}
