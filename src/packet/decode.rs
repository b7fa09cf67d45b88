use pnet::packet::{Packet as PacketExt, PacketSize};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::vlan::VlanPacket;
use pnet::packet::ethernet::{EthernetPacket, EtherTypes};
use super::Packet;

pub fn decode<'a>(p: &'a EthernetPacket<'a>) -> (Option<u16>, Option<Packet<'a>>) {
    let mut ethertype = p.get_ethertype();
    let mut payload   = p.payload();
    let mut vlan      = None;

    while ethertype == EtherTypes::Vlan {
        if let Some(pkt) = VlanPacket::new(payload) {
            vlan      = Some(pkt.get_vlan_identifier());
            ethertype = pkt.get_ethertype();
            payload   = &payload[pkt.packet_size()..];
        } else {
            return (None, None)
        }
    }

    match ethertype {
        EtherTypes::Ipv4 => (vlan, ipv4(payload)),
        EtherTypes::Ipv6 => (vlan, ipv6(payload)),
        _                => (vlan, Some(Packet::Other(ethertype.0))),
    }
}

fn ipv4(payload: &[u8]) -> Option<Packet> {
    let mut pkt = valid(Ipv4Packet::new(payload)?)?;
    if pkt.get_next_level_protocol() == IpNextHeaderProtocols::Ipv4 {
        let n = pkt.get_header_length() as usize * 4;
        pkt = valid(Ipv4Packet::new(&payload[n..])?)?;
    }
    Some(Packet::IPv4(pkt))
}

fn ipv6(payload: &[u8])-> Option<Packet> {
    Some(Packet::IPv6(Ipv6Packet::new(payload)?))
}

// non-first fragments carry no transport header
fn valid(pkt: Ipv4Packet) -> Option<Ipv4Packet> {
    let len = pkt.get_header_length() as usize * 4;
    match pkt.get_version() {
        4 if len >= Ipv4Packet::minimum_packet_size()
          && len <= pkt.packet().len()
          && pkt.get_fragment_offset() == 0 => Some(pkt),
        _                                   => None,
    }
}
