use std::net::IpAddr;
use log::trace;
use pnet::packet::ethernet::EthernetPacket;
use crate::flow::{Addr, Direction, Event, Protocol, Signature};
use crate::packet::{self, Packet, Transport};
use super::Frame;

/// Turns captured frames into flow events relative to the local address.
#[derive(Copy, Clone, Debug)]
pub struct Classifier {
    local: IpAddr,
}

impl Classifier {
    pub fn new(local: IpAddr) -> Self {
        Self { local }
    }

    pub fn classify(&self, frame: &Frame) -> Option<Event> {
        let eth = EthernetPacket::new(frame.data)?;

        let (_, pkt) = packet::decode(&eth);
        let event = match pkt {
            Some(pkt @ Packet::IPv4(_)) => self.ipv4(&pkt, frame.len),
            _                           => None,
        };

        if event.is_none() {
            trace!("unclassified frame of {} bytes", frame.len);
        }

        event
    }

    fn ipv4(&self, pkt: &Packet, len: usize) -> Option<Event> {
        let (proto, sport, dport) = match pkt.transport()? {
            Transport::TCP(p)   => (Protocol::TCP, p.get_source(), p.get_destination()),
            Transport::UDP(p)   => (Protocol::UDP, p.get_source(), p.get_destination()),
            Transport::Other(_) => return None,
        };

        let src = Addr { addr: pkt.src()?, port: sport };
        let dst = Addr { addr: pkt.dst()?, port: dport };

        let (direction, local, remote) = if dst.addr == self.local {
            (Direction::In, dst, src)
        } else if src.addr == self.local {
            (Direction::Out, src, dst)
        } else {
            return None;
        };

        Some(Event {
            signature: Signature::new(remote, proto),
            direction: direction,
            local:     local,
            remote:    remote,
            bytes:     len,
        })
    }
}
