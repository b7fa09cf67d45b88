use std::net::{IpAddr, UdpSocket};
use anyhow::{Result, anyhow};
use log::debug;
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use pnet::util::MacAddr;

/// A capture interface and the IPv4 address flows are classified against.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Link {
    pub index: u32,
    pub name:  String,
    pub mac:   Option<MacAddr>,
    pub addr:  IpAddr,
}

/// Find the named interface, or the one carrying the default route.
pub fn find(name: Option<&str>) -> Result<Link> {
    let ifaces = datalink::interfaces();
    match name {
        Some(name) => named(&ifaces, name),
        None       => default(&ifaces),
    }
}

/// Local address the OS picks to reach the internet. Connecting a UDP
/// socket sends nothing.
pub fn route() -> Result<IpAddr> {
    let sock = UdpSocket::bind("0.0.0.0:0")?;
    sock.connect("1.1.1.1:80")?;
    Ok(sock.local_addr()?.ip())
}

fn named(ifaces: &[NetworkInterface], name: &str) -> Result<Link> {
    let iface = ifaces.iter().find(|iface| iface.name == name).ok_or_else(|| {
        anyhow!("link {} not found", name)
    })?;
    link(iface).ok_or_else(|| anyhow!("link {} has no IPv4 address", name))
}

fn default(ifaces: &[NetworkInterface]) -> Result<Link> {
    match route() {
        Ok(ip) => match ifaces.iter().filter_map(link).find(|link| link.addr == ip) {
            Some(link) => return Ok(link),
            None       => debug!("no link owns route address {}", ip),
        },
        Err(e) => debug!("no default route: {}", e),
    }

    let dev = pcap::Device::lookup()?.ok_or_else(|| anyhow!("no capture device found"))?;
    named(ifaces, &dev.name)
}

fn link(iface: &NetworkInterface) -> Option<Link> {
    let addr = iface.ips.iter().map(IpNetwork::ip).find(IpAddr::is_ipv4)?;
    Some(Link {
        index: iface.index,
        name:  iface.name.clone(),
        mac:   iface.mac,
        addr:  addr,
    })
}
