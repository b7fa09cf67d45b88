use std::net::IpAddr;
use anyhow::Result;

/// A blocking reverse lookup.
pub trait Lookup: Send + Sync + 'static {
    fn lookup(&self, ip: IpAddr) -> Result<String>;
}

/// Reverse lookup through the system resolver.
pub struct Dns;

impl Lookup for Dns {
    fn lookup(&self, ip: IpAddr) -> Result<String> {
        Ok(dns_lookup::lookup_addr(&ip)?)
    }
}

pub use resolver::Resolver;

mod resolver;
