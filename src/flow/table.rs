use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::mem;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use log::{debug, trace};
use parking_lot::{Mutex, RwLock};
use crate::resolve::Resolver;
use crate::sockets::Sockets;
use super::{Event, Record, Signature};

/// The live flow table. Records are created at most once per signature and
/// never removed; `replace` swaps the whole content.
///
/// The map itself sits behind a read/write lock that is only taken for
/// writing to insert a new signature or replace everything. Each record has
/// its own mutex, so updates to different flows don't contend and a
/// snapshot sees every record in a consistent state.
pub struct Table {
    flows:    RwLock<HashMap<Signature, Arc<Mutex<Record>>>>,
    sockets:  Sockets,
    resolver: Option<Resolver>,
    stale:    Duration,
}

impl Table {
    pub fn new(sockets: Sockets, resolver: Option<Resolver>, stale: Duration) -> Self {
        Self {
            flows:    RwLock::new(HashMap::new()),
            sockets:  sockets,
            resolver: resolver,
            stale:    stale,
        }
    }

    pub fn update(&self, event: &Event) {
        let now   = SystemTime::now();
        let entry = self.flows.read().get(&event.signature).cloned();

        match entry {
            Some(record) => self.increment(&record, event, now),
            None         => self.create(event, now),
        }
    }

    /// Copy of every record. The map lock is only held to collect the
    /// record handles, so a busy record delays no other update.
    pub fn snapshot(&self) -> Vec<Record> {
        let records = self.flows.read().values().cloned().collect::<Vec<_>>();
        records.iter().map(|record| record.lock().clone()).collect()
    }

    /// Substitute the table content, e.g. with records loaded from disk.
    /// Must not be called while packets are still being applied.
    pub fn replace(&self, records: Vec<Record>) {
        let mut map = records.into_iter().map(|record| {
            (record.signature, Arc::new(Mutex::new(record)))
        }).collect::<HashMap<_, _>>();

        let mut flows = self.flows.write();
        mem::swap(&mut *flows, &mut map);

        debug!("replaced {} flows with {}", map.len(), flows.len());
    }

    pub fn get(&self, sig: &Signature) -> Option<Record> {
        self.flows.read().get(sig).map(|record| record.lock().clone())
    }

    pub fn len(&self) -> usize {
        self.flows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.read().is_empty()
    }

    pub fn sockets(&self) -> &Sockets {
        &self.sockets
    }

    #[cfg(test)]
    pub(crate) fn handle(&self, sig: &Signature) -> Option<Arc<Mutex<Record>>> {
        self.flows.read().get(sig).cloned()
    }

    fn increment(&self, record: &Arc<Mutex<Record>>, event: &Event, now: SystemTime) {
        let stale = {
            let mut rec = record.lock();
            rec.increment(event.direction, event.bytes as u64, now);

            let age = now.duration_since(rec.attributed).unwrap_or_default();
            if age > self.stale {
                rec.attributed = now;
                true
            } else {
                false
            }
        };

        if stale {
            trace!("refreshing attribution of {}", event.signature);
            let attribution = self.sockets.lookup(&event.signature, true);
            record.lock().attribution = attribution;
        }
    }

    fn create(&self, event: &Event, now: SystemTime) {
        let attribution = self.sockets.lookup(&event.signature, false);

        let (record, created) = match self.flows.write().entry(event.signature) {
            Entry::Occupied(e) => (e.get().clone(), false),
            Entry::Vacant(e)   => {
                let record = Record::new(event, attribution, now);
                (e.insert(Arc::new(Mutex::new(record))).clone(), true)
            }
        };

        if created {
            debug!("new flow {} <-> {}", event.remote, event.local);
            self.resolve(&record, event.signature.addr);
        }

        self.increment(&record, event, now);
    }

    fn resolve(&self, record: &Arc<Mutex<Record>>, addr: IpAddr) {
        let resolver = match &self.resolver {
            Some(resolver) => resolver,
            None           => return,
        };

        let record = Arc::downgrade(record);
        resolver.dispatch(addr, move |host| {
            if let (Some(host), Some(record)) = (host, record.upgrade()) {
                record.lock().hostname = Some(host);
            }
        });
    }
}
