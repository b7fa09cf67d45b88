use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::Duration;
use anyhow::{Result, anyhow};
use libc::pid_t;
use parking_lot::Mutex;
use crate::flow::Protocol;
use super::{Socket, Source};

/// An in-memory connection table.
#[derive(Default)]
pub struct Fake {
    pub socks: Mutex<Vec<Socket>>,
    pub delay: Mutex<Duration>,
    pub fail:  AtomicBool,
    pub reads: AtomicUsize,
}

impl Fake {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, proto: Protocol, local: &str, remote: &str, pid: pid_t) {
        self.socks.lock().push(Socket {
            proto:  proto,
            local:  local.parse().unwrap(),
            remote: remote.parse().unwrap(),
            status: "ESTABLISHED".to_owned(),
            pid:    Some(pid),
            fd:     Some(3),
        });
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Source for Arc<Fake> {
    fn read(&self) -> Result<Vec<Socket>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock();
        sleep(delay);

        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("permission denied"));
        }

        Ok(self.socks.lock().clone())
    }
}
