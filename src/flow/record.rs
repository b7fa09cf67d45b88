use std::time::SystemTime;
use libc::pid_t;
use serde::{Serialize, Deserialize};
use crate::process;
use crate::sockets::Attribution;
use super::{Addr, Direction, Event, Protocol, Signature};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub signature:   Signature,
    pub protocol:    Protocol,
    pub first_seen:  SystemTime,
    pub last_seen:   SystemTime,
    pub packets:     u64,
    pub incoming:    u64,
    pub outgoing:    u64,
    pub bytes:       u64,
    pub upload:      u64,
    pub download:    u64,
    pub local:       Addr,
    pub remote:      Addr,
    pub hostname:    Option<String>,
    pub attribution: Option<Attribution>,
    pub attributed:  SystemTime,
}

impl Record {
    pub fn new(event: &Event, attribution: Option<Attribution>, now: SystemTime) -> Self {
        Self {
            signature:   event.signature,
            protocol:    event.signature.proto,
            first_seen:  now,
            last_seen:   now,
            packets:     0,
            incoming:    0,
            outgoing:    0,
            bytes:       0,
            upload:      0,
            download:    0,
            local:       event.local,
            remote:      event.remote,
            hostname:    None,
            attribution: attribution,
            attributed:  now,
        }
    }

    pub fn increment(&mut self, dir: Direction, bytes: u64, now: SystemTime) {
        self.packets += 1;
        self.bytes   += bytes;

        match dir {
            Direction::In => {
                self.incoming += 1;
                self.download += bytes;
            }
            Direction::Out => {
                self.outgoing += 1;
                self.upload   += bytes;
            }
        }

        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    pub fn pid(&self) -> Option<pid_t> {
        self.attribution.as_ref()?.pid
    }

    /// Name of the owning process, read from the live process table on
    /// every call since the pid may have exited or been reused.
    pub fn process_name(&self) -> Option<String> {
        process::name(self.pid()?)
    }

    /// Remote endpoint shown with the resolved hostname when known.
    pub fn endpoint(&self) -> String {
        match &self.hostname {
            Some(host) => format!("{}:{}", host, self.remote.port),
            None       => self.remote.to_string(),
        }
    }
}
