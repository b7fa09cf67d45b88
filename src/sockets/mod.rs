use std::net::SocketAddr;
use anyhow::Result;
use libc::pid_t;
use serde::{Serialize, Deserialize};
use crate::flow::Protocol;

/// The local socket a flow was matched to.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Attribution {
    pub pid:    Option<pid_t>,
    pub status: String,
    pub fd:     Option<i32>,
}

/// One row of the OS connection table.
#[derive(Clone, Debug)]
pub struct Socket {
    pub proto:  Protocol,
    pub local:  SocketAddr,
    pub remote: SocketAddr,
    pub status: String,
    pub pid:    Option<pid_t>,
    pub fd:     Option<i32>,
}

pub trait Source: Send + Sync + 'static {
    fn read(&self) -> Result<Vec<Socket>>;
}

pub use sockets::Sockets;
pub use os::System;

mod sockets;

#[cfg(target_os = "linux")]
#[path = "linux.rs"]
mod os;

#[cfg(not(target_os = "linux"))]
#[path = "empty.rs"]
mod os;


#[cfg(test)]
pub(crate) mod fake;
