use std::net::{Ipv4Addr, Ipv6Addr};
use pnet::packet::ethernet::{EtherType, EtherTypes, MutableEthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::ipv6::MutableIpv6Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;
use pnet::util::MacAddr;

const ETH: usize = 14;

pub fn tcp(src: &str, sport: u16, dst: &str, dport: u16, len: usize) -> Vec<u8> {
    ipv4(src, sport, dst, dport, IpNextHeaderProtocols::Tcp, len)
}

pub fn udp(src: &str, sport: u16, dst: &str, dport: u16, len: usize) -> Vec<u8> {
    ipv4(src, sport, dst, dport, IpNextHeaderProtocols::Udp, len)
}

pub fn ipv4(src: &str, sport: u16, dst: &str, dport: u16, proto: IpNextHeaderProtocol, len: usize) -> Vec<u8> {
    let src: Ipv4Addr = src.parse().unwrap();
    let dst: Ipv4Addr = dst.parse().unwrap();
    let l4 = header(proto);

    let mut buf = ethernet(EtherTypes::Ipv4, 20 + l4 + len);
    {
        let mut ip = MutableIpv4Packet::new(&mut buf[ETH..]).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length((20 + l4 + len) as u16);
        ip.set_ttl(64);
        ip.set_next_level_protocol(proto);
        ip.set_source(src);
        ip.set_destination(dst);
    }
    transport(&mut buf[ETH + 20..], proto, sport, dport, len);
    buf
}

pub fn ipv6(src: &str, sport: u16, dst: &str, dport: u16, len: usize) -> Vec<u8> {
    let src: Ipv6Addr = src.parse().unwrap();
    let dst: Ipv6Addr = dst.parse().unwrap();
    let proto = IpNextHeaderProtocols::Tcp;

    let mut buf = ethernet(EtherTypes::Ipv6, 40 + 20 + len);
    {
        let mut ip = MutableIpv6Packet::new(&mut buf[ETH..]).unwrap();
        ip.set_version(6);
        ip.set_payload_length((20 + len) as u16);
        ip.set_next_header(proto);
        ip.set_hop_limit(64);
        ip.set_source(src);
        ip.set_destination(dst);
    }
    transport(&mut buf[ETH + 40..], proto, sport, dport, len);
    buf
}

/// Insert an 802.1Q tag after the MAC addresses.
pub fn vlan(frame: Vec<u8>, id: u16) -> Vec<u8> {
    let mut buf = frame[..12].to_vec();
    buf.extend_from_slice(&[0x81, 0x00]);
    buf.extend_from_slice(&(id & 0x0fff).to_be_bytes());
    buf.extend_from_slice(&frame[12..]);
    buf
}

fn ethernet(ethertype: EtherType, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; ETH + len];
    let mut eth = MutableEthernetPacket::new(&mut buf).unwrap();
    eth.set_source(MacAddr::new(2, 0, 0, 0, 0, 1));
    eth.set_destination(MacAddr::new(2, 0, 0, 0, 0, 2));
    eth.set_ethertype(ethertype);
    buf
}

fn header(proto: IpNextHeaderProtocol) -> usize {
    match proto {
        IpNextHeaderProtocols::Tcp => 20,
        IpNextHeaderProtocols::Udp => 8,
        _                          => 0,
    }
}

fn transport(buf: &mut [u8], proto: IpNextHeaderProtocol, sport: u16, dport: u16, len: usize) {
    match proto {
        IpNextHeaderProtocols::Tcp => {
            let mut tcp = MutableTcpPacket::new(buf).unwrap();
            tcp.set_source(sport);
            tcp.set_destination(dport);
            tcp.set_data_offset(5);
        }
        IpNextHeaderProtocols::Udp => {
            let mut udp = MutableUdpPacket::new(buf).unwrap();
            udp.set_source(sport);
            udp.set_destination(dport);
            udp.set_length((8 + len) as u16);
        }
        _ => (),
    }
}
