//! `logtapd` — journal-socket log collection daemon.

use std::cell::RefCell;
use std::io;
use std::process;
use std::rc::Rc;

use tracing::{error, info};

use logtap::{DaemonBuilder, FileSink, SharedSink};

fn main() {
    tracing_subscriber::fmt::init();

    let sink: SharedSink = Rc::new(RefCell::new(FileSink::new(io::stdout())));

    let mut reactor = match DaemonBuilder::new().syslog_alias("/dev/log").build(sink) {
        Ok(reactor) => reactor,
        Err(err) => {
            error!(%err, "reactor initialisation failed");
            process::exit(1);
        }
    };

    info!("collecting log traffic");
    if let Err(err) = reactor.run() {
        error!(%err, "dispatch loop failed");
        process::exit(1);
    }
}
