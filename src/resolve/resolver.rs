use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use log::{debug, trace};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::spawn_blocking;
use tokio::time::timeout;
use super::Lookup;

const FOUND_TTL:  Duration = Duration::from_secs(600);
const FAILED_TTL: Duration = Duration::from_secs(60);
const SWEEP:      u64      = 1024;

/// Reverse DNS off the packet path.
///
/// Lookups run on the runtime's blocking pool, at most `workers` at a time.
/// A lookup's permit is held until the OS call returns, even when the
/// caller already gave up on it, so slow resolvers can't pile up blocking
/// threads. Waiting for a permit counts against the timeout.
///
/// Answers and failures are cached per address, and concurrent requests for
/// one address share a single lookup.
#[derive(Clone)]
pub struct Resolver {
    lookup:  Arc<dyn Lookup>,
    handle:  Handle,
    permits: Arc<Semaphore>,
    timeout: Duration,
    cache:   Arc<Mutex<Cache>>,
    pending: Arc<Mutex<Pending>>,
}

type Pending = HashMap<IpAddr, Vec<oneshot::Sender<Option<String>>>>;

#[derive(Default)]
struct Cache {
    entries: HashMap<IpAddr, Cached>,
    inserts: u64,
}

#[derive(Debug)]
struct Cached {
    host:    Option<String>,
    expires: Instant,
}

/// Wakes the requests waiting on a lookup when it completes or is dropped.
struct Flight<'a> {
    pending: &'a Mutex<Pending>,
    ip:      IpAddr,
    host:    Option<String>,
}

impl Resolver {
    pub fn new<L: Lookup>(lookup: L, handle: Handle, workers: usize, timeout: Duration) -> Self {
        Self {
            lookup:  Arc::new(lookup),
            handle:  handle,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            timeout: timeout,
            cache:   Default::default(),
            pending: Default::default(),
        }
    }

    /// Hostname of `ip`, or `None` on failure or timeout.
    pub async fn resolve(&self, ip: IpAddr) -> Option<String> {
        let rx = {
            let mut pending = self.pending.lock();
            match pending.get_mut(&ip) {
                Some(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    if let Some(host) = self.cached(ip) {
                        trace!("cached name for {}: {:?}", ip, host);
                        return host;
                    }
                    pending.insert(ip, Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = rx {
            trace!("joining lookup of {}", ip);
            return rx.await.ok().flatten();
        }

        let mut flight = Flight {
            pending: &self.pending,
            ip:      ip,
            host:    None,
        };

        let host = self.query(ip).await;
        self.store(ip, &host);
        flight.host = host.clone();

        host
    }

    /// Resolve `ip` in the background and hand the result to `f`.
    pub fn dispatch<F>(&self, ip: IpAddr, f: F) where F: FnOnce(Option<String>) + Send + 'static {
        let resolver = self.clone();
        self.handle.spawn(async move {
            f(resolver.resolve(ip).await);
        });
    }

    async fn query(&self, ip: IpAddr) -> Option<String> {
        let permits = self.permits.clone();
        let lookup  = self.lookup.clone();

        let task = async move {
            let permit = permits.acquire_owned().await?;
            let host   = spawn_blocking(move || {
                let _permit = permit;
                lookup.lookup(ip)
            }).await??;
            Ok::<_, anyhow::Error>(host)
        };

        match timeout(self.timeout, task).await {
            Ok(Ok(host)) if host != ip.to_string() => {
                debug!("resolved {} to {}", ip, host);
                Some(host)
            }
            Ok(Ok(_)) => {
                debug!("no name for {}", ip);
                None
            }
            Ok(Err(e)) => {
                debug!("reverse lookup of {} failed: {}", ip, e);
                None
            }
            Err(_) => {
                debug!("reverse lookup of {} timed out after {:?}", ip, self.timeout);
                None
            }
        }
    }

    fn cached(&self, ip: IpAddr) -> Option<Option<String>> {
        let mut cache = self.cache.lock();
        match cache.entries.get(&ip) {
            Some(c) if c.expires > Instant::now() => Some(c.host.clone()),
            Some(_) => {
                cache.entries.remove(&ip);
                None
            }
            None => None,
        }
    }

    fn store(&self, ip: IpAddr, host: &Option<String>) {
        let now = Instant::now();
        let ttl = match host {
            Some(_) => FOUND_TTL,
            None    => FAILED_TTL,
        };

        let mut cache = self.cache.lock();
        cache.entries.insert(ip, Cached {
            host:    host.clone(),
            expires: now + ttl,
        });

        cache.inserts += 1;
        if cache.inserts % SWEEP == 0 {
            cache.entries.retain(|_, c| c.expires > now);
        }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let waiters = self.pending.lock().remove(&self.ip).unwrap_or_default();
        for tx in waiters {
            let _ = tx.send(self.host.clone());
        }
    }
}
