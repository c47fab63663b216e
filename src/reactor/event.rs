use std::io;
use std::os::unix::io::RawFd;
use std::ptr;

use libc::{EPOLL_CTL_ADD, EPOLL_CTL_DEL, EPOLLIN, F_GETFL, F_SETFL, O_NONBLOCK, epoll_ctl, fcntl};

#[repr(transparent)]
pub(crate) struct Event(libc::epoll_event);

impl Event {
    pub(crate) const EMPTY: Self = Self(libc::epoll_event { events: 0, u64: 0 });

    pub(crate) fn new(file_descriptor: RawFd) -> Self {
        Self(libc::epoll_event {
            events: EPOLLIN as u32,
            u64: file_descriptor as u64,
        })
    }

    pub(crate) fn descriptor(&self) -> RawFd {
        self.0.u64 as RawFd
    }

    pub(crate) fn register(mut self, poll_fd: RawFd) -> io::Result<()> {
        let file_descriptor = self.descriptor();
        let ret = unsafe { epoll_ctl(poll_fd, EPOLL_CTL_ADD, file_descriptor, &mut self.0) };

        if ret < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }

    pub(crate) fn unregister(poll_fd: RawFd, file_descriptor: RawFd) {
        // The descriptor may already be gone; nothing to do about a failure.
        unsafe {
            epoll_ctl(poll_fd, EPOLL_CTL_DEL, file_descriptor, ptr::null_mut());
        }
    }

    pub(crate) fn wait(poll_fd: RawFd, events: &mut [Event]) -> io::Result<usize> {
        let ret = unsafe {
            libc::epoll_wait(
                poll_fd,
                events.as_mut_ptr() as *mut libc::epoll_event,
                events.len() as i32,
                -1,
            )
        };

        if ret < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(ret as usize)
    }

    pub(crate) fn set_nonblocking(file_descriptor: RawFd) {
        let flags = unsafe { fcntl(file_descriptor, F_GETFL) };

        unsafe {
            fcntl(file_descriptor, F_SETFL, flags | O_NONBLOCK);
        }
    }
}
