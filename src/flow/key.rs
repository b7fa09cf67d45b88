use std::fmt;
use std::net::{IpAddr, SocketAddr};
use serde::{Serialize, Deserialize};

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Protocol {
    TCP,
    UDP,
    TCP6,
    UDP6,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Addr {
    pub addr: IpAddr,
    pub port: u16,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum Direction {
    In, Out
}

/// Identity of a flow: the remote endpoint and the transport protocol.
/// Both directions of a conversation share one signature.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct Signature {
    pub addr:  IpAddr,
    pub port:  u16,
    pub proto: Protocol,
}

impl Signature {
    pub fn new(remote: Addr, proto: Protocol) -> Self {
        Self {
            addr:  remote.addr,
            port:  remote.port,
            proto: proto,
        }
    }

    pub fn remote(&self) -> Addr {
        Addr {
            addr: self.addr,
            port: self.port,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Protocol::TCP  => "TCP",
            Protocol::UDP  => "UDP",
            Protocol::TCP6 => "TCP6",
            Protocol::UDP6 => "UDP6",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.remote(), self.proto)
    }
}

impl From<SocketAddr> for Addr {
    fn from(sa: SocketAddr) -> Self {
        Self {
            addr: sa.ip(),
            port: sa.port(),
        }
    }
}
