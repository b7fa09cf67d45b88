use std::path::PathBuf;
use anyhow::{Result, anyhow};
use log::debug;
use pcap::{Active, Capture, Linktype, Offline};
use super::Config;
use pcap::Error::*;

/// A captured frame. `len` is the length on the wire, `data` may be cut
/// short by the snaplen.
#[derive(Copy, Clone, Debug)]
pub struct Frame<'a> {
    pub data: &'a [u8],
    pub len:  usize,
}

pub enum Next<'a> {
    Frame(Frame<'a>),
    Timeout,
    Done,
}

/// An open capture delivering frames in arrival order.
pub trait Session: Send {
    fn next(&mut self) -> Result<Next<'_>>;
}

/// Something a capture session can be opened on.
pub trait Device: Send {
    fn name(&self) -> &str;
    fn open(&self, cfg: &Config) -> Result<Box<dyn Session>>;
}

/// A live libpcap capture on a network interface.
pub struct Pcap {
    name: String,
}

/// Replay of a pcap savefile.
pub struct File {
    name: String,
    path: PathBuf,
}

impl Pcap {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_owned() }
    }
}

impl File {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { name, path }
    }
}

impl Device for Pcap {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, cfg: &Config) -> Result<Box<dyn Session>> {
        let mut cap = Capture::from_device(self.name.as_str())?
            .buffer_size(cfg.buffer_size as i32)
            .timeout(cfg.timeout.as_millis().try_into()?)
            .snaplen(cfg.snaplen as i32)
            .promisc(cfg.promisc)
            .open()?;

        match cap.list_datalinks()?.into_iter().find(|lt| *lt == Linktype::ETHERNET) {
            Some(linktype) => cap.set_datalink(linktype)?,
            None           => return Err(anyhow!("link {} not ethernet", self.name)),
        }

        cap.filter(&cfg.filter, true)?;

        debug!("opened {} with filter '{}'", self.name, cfg.filter);

        Ok(Box::new(Live(cap)))
    }
}

impl Device for File {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, cfg: &Config) -> Result<Box<dyn Session>> {
        let mut cap = Capture::from_file(&self.path)?;

        if cap.get_datalink() != Linktype::ETHERNET {
            return Err(anyhow!("file {} not ethernet", self.name));
        }

        cap.filter(&cfg.filter, true)?;

        Ok(Box::new(Replay(cap)))
    }
}

struct Live(Capture<Active>);

struct Replay(Capture<Offline>);

impl Session for Live {
    fn next(&mut self) -> Result<Next<'_>> {
        match self.0.next_packet() {
            Ok(pkt)             => Ok(Next::Frame(frame(&pkt))),
            Err(TimeoutExpired) => Ok(Next::Timeout),
            Err(NoMorePackets)  => Ok(Next::Done),
            Err(e)              => Err(e.into()),
        }
    }
}

impl Session for Replay {
    fn next(&mut self) -> Result<Next<'_>> {
        match self.0.next_packet() {
            Ok(pkt)            => Ok(Next::Frame(frame(&pkt))),
            Err(NoMorePackets) => Ok(Next::Done),
            Err(e)             => Err(e.into()),
        }
    }
}

fn frame<'a>(pkt: &pcap::Packet<'a>) -> Frame<'a> {
    Frame {
        data: pkt.data,
        len:  pkt.header.len as usize,
    }
}
