//! Creation and acceptance of `AF_UNIX` sockets.
//!
//! All sockets are opened non-blocking and close-on-exec. A stale socket file
//! left by a previous process is unlinked before bind.

use std::ffi::CString;
use std::io;
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::Path;
use std::ptr;

use tracing::debug;

/// Opens a datagram socket bound at `path`.
pub fn bind_datagram(path: &Path) -> io::Result<RawFd> {
    open_bound(libc::SOCK_DGRAM, path)
}

/// Opens a stream socket bound at `path` and puts it in listening state.
pub fn bind_listener(path: &Path) -> io::Result<RawFd> {
    let file_descriptor = open_bound(libc::SOCK_STREAM, path)?;

    let ret = unsafe { libc::listen(file_descriptor, libc::SOMAXCONN) };
    if ret < 0 {
        let err = io::Error::last_os_error();
        unsafe { libc::close(file_descriptor) };
        return Err(err);
    }

    Ok(file_descriptor)
}

/// Accepts one pending connection from a listening socket.
///
/// The accepted descriptor is non-blocking and close-on-exec. With nothing
/// pending this fails with [`io::ErrorKind::WouldBlock`].
pub fn accept_connection(listener: RawFd) -> io::Result<RawFd> {
    let file_descriptor = unsafe {
        libc::accept4(
            listener,
            ptr::null_mut(),
            ptr::null_mut(),
            libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
        )
    };

    if file_descriptor < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(file_descriptor)
}

/// Publishes a conventional symlink alias for a bound socket path.
///
/// Best effort: clients that only know the alias find the socket through it,
/// and a failure (missing privileges, alias already present) costs nothing.
pub fn link_alias(target: &Path, alias: &Path) {
    if let Err(err) = std::os::unix::fs::symlink(target, alias) {
        debug!(%err, alias = %alias.display(), "socket alias not created");
    }
}

fn open_bound(kind: libc::c_int, path: &Path) -> io::Result<RawFd> {
    let address = socket_address(path)?;

    let file_descriptor = unsafe {
        libc::socket(
            libc::AF_UNIX,
            kind | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
            0,
        )
    };
    if file_descriptor < 0 {
        return Err(io::Error::last_os_error());
    }

    remove_stale(path);

    let ret = unsafe {
        libc::bind(
            file_descriptor,
            &address as *const libc::sockaddr_un as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_un>() as libc::socklen_t,
        )
    };
    if ret < 0 {
        let err = io::Error::last_os_error();
        unsafe { libc::close(file_descriptor) };
        return Err(err);
    }

    Ok(file_descriptor)
}

fn socket_address(path: &Path) -> io::Result<libc::sockaddr_un> {
    let bytes = path.as_os_str().as_bytes();
    let mut address: libc::sockaddr_un = unsafe { mem::zeroed() };

    // The trailing NUL must fit as well.
    if bytes.len() >= address.sun_path.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "socket path too long for sun_path",
        ));
    }

    address.sun_family = libc::AF_UNIX as libc::sa_family_t;
    for (slot, byte) in address.sun_path.iter_mut().zip(bytes) {
        *slot = *byte as libc::c_char;
    }

    Ok(address)
}

fn remove_stale(path: &Path) {
    if let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) {
        unsafe { libc::unlink(c_path.as_ptr()) };
    }
}
