use std::net::IpAddr;
use pnet::packet::Packet as PacketExt;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;

pub use decode::decode;

mod decode;

/// Network layer view of a frame.
pub enum Packet<'a> {
    IPv4(Ipv4Packet<'a>),
    IPv6(Ipv6Packet<'a>),
    Other(u16),
}

pub enum Transport<'a> {
    TCP(TcpPacket<'a>),
    UDP(UdpPacket<'a>),
    Other(IpNextHeaderProtocol),
}

impl<'a> Packet<'a> {
    pub fn src(&self) -> Option<IpAddr> {
        match self {
            Packet::IPv4(p)  => Some(p.get_source().into()),
            Packet::IPv6(p)  => Some(p.get_source().into()),
            Packet::Other(_) => None,
        }
    }

    pub fn dst(&self) -> Option<IpAddr> {
        match self {
            Packet::IPv4(p)  => Some(p.get_destination().into()),
            Packet::IPv6(p)  => Some(p.get_destination().into()),
            Packet::Other(_) => None,
        }
    }

    pub fn transport(&self) -> Option<Transport<'_>> {
        let (proto, payload) = match self {
            Packet::IPv4(p)  => (p.get_next_level_protocol(), p.payload()),
            Packet::IPv6(p)  => (p.get_next_header(), p.payload()),
            Packet::Other(_) => return None,
        };

        match proto {
            IpNextHeaderProtocols::Tcp => TcpPacket::new(payload).map(Transport::TCP),
            IpNextHeaderProtocols::Udp => UdpPacket::new(payload).map(Transport::UDP),
            other                      => Some(Transport::Other(other)),
        }
    }
}

#[cfg(test)]
pub(crate) mod build;
