//! Drain loop for ready descriptors.

use std::io;
use std::os::unix::io::RawFd;

use tracing::trace;

use crate::handler::LineHandler;

/// Reads everything currently available from a non-blocking descriptor.
///
/// Each successful read hands its chunk to the handler before the next read is
/// issued. The drain ends when a read returns 0 (peer closed, or no more
/// datagrams), would block, or fails for any other reason; none of these is an
/// error from the caller's point of view. Nothing is buffered across calls.
///
/// # Arguments
/// * `file_descriptor` - A readable, non-blocking descriptor
/// * `handler` - Receives each chunk exactly as read
pub fn drain(file_descriptor: RawFd, handler: &mut dyn LineHandler) {
    let mut buf = [0u8; 2048];

    loop {
        let n = unsafe {
            libc::read(
                file_descriptor,
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
            )
        };

        if n > 0 {
            handler.handle(&buf[..n as usize]);
            continue;
        }

        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::WouldBlock {
                trace!(file_descriptor, %err, "drain cut short");
            }
        }

        return;
    }
}
