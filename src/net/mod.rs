//! Unix-domain socket plumbing.
//!
//! This module provides the non-blocking `AF_UNIX` primitives the endpoints
//! are built on:
//! - [`unix`]: datagram/listener bind, connection accept, and the best-effort
//!   socket-path alias

pub mod unix;
