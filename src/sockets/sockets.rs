use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use crate::flow::{Addr, Signature};
use super::{Attribution, Socket, Source};

/// Cache of the OS connection table indexed by remote endpoint and
/// protocol.
///
/// A refresh reads the whole table on a reader thread, builds a new index
/// and swaps it in, so lookups never observe a partial index. Callers wait
/// for a refresh at most `timeout` and otherwise carry on with the previous
/// index; concurrent refresh requests share the read already in flight.
#[derive(Clone)]
pub struct Sockets {
    inner:   Arc<Inner>,
    timeout: Duration,
}

struct Inner {
    source:  Box<dyn Source>,
    index:   RwLock<Option<HashMap<Signature, Attribution>>>,
    pending: Mutex<Option<Receiver<()>>>,
}

impl Sockets {
    pub fn new<S: Source>(source: S, timeout: Duration) -> Self {
        let inner = Inner {
            source:  Box::new(source),
            index:   RwLock::new(None),
            pending: Mutex::new(None),
        };

        Self {
            inner:   Arc::new(inner),
            timeout: timeout,
        }
    }

    /// Find the socket owning `sig`. Reads the OS table first when `force`
    /// is set or nothing was read yet; otherwise a miss triggers a single
    /// refresh and retry. A miss after that is not an error.
    pub fn lookup(&self, sig: &Signature, force: bool) -> Option<Attribution> {
        let refreshed = force || self.inner.index.read().is_none();

        if refreshed {
            self.refresh();
        }

        match self.get(sig) {
            Some(attribution) => Some(attribution),
            None if !refreshed => {
                self.refresh();
                self.get(sig)
            }
            None => None,
        }
    }

    pub fn refresh(&self) {
        let rx = match self.spawn() {
            Some(rx) => rx,
            None     => return,
        };

        // the reader drops its sender once the new index is in place
        if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(self.timeout) {
            warn!("socket table refresh exceeded {:?}", self.timeout);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.index.read().as_ref().map(HashMap::len).unwrap_or(0)
    }

    fn get(&self, sig: &Signature) -> Option<Attribution> {
        self.inner.index.read().as_ref()?.get(sig).cloned()
    }

    fn spawn(&self) -> Option<Receiver<()>> {
        let mut pending = self.inner.pending.lock();

        if let Some(rx) = &*pending {
            return Some(rx.clone());
        }

        let (tx, rx) = bounded::<()>(0);
        let inner    = self.inner.clone();

        let spawned = thread::Builder::new().name("sockets".to_owned()).spawn(move || {
            inner.reload();
            inner.pending.lock().take();
            drop(tx);
        });

        match spawned {
            Ok(_)  => *pending = Some(rx.clone()),
            Err(e) => {
                warn!("failed to spawn socket reader: {}", e);
                return None;
            }
        }

        Some(rx)
    }
}

impl Inner {
    fn reload(&self) {
        let start = Instant::now();

        match self.source.read() {
            Ok(socks) => {
                let index = index(socks);
                debug!("indexed {} sockets in {:?}", index.len(), start.elapsed());
                *self.index.write() = Some(index);
            }
            Err(e) => warn!("failed to read socket table: {:?}", e),
        }
    }
}

fn index(socks: Vec<Socket>) -> HashMap<Signature, Attribution> {
    socks.into_iter().filter(|sock| {
        !sock.remote.ip().is_unspecified() && sock.remote.port() != 0
    }).map(|sock| {
        let sig = Signature::new(Addr::from(sock.remote), sock.proto);
        (sig, Attribution {
            pid:    sock.pid,
            status: sock.status,
            fd:     sock.fd,
        })
    }).collect()
}
