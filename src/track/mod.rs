use std::net::IpAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use anyhow::{Result, bail};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::{debug, warn};
use tokio::runtime::Handle;
use crate::capture::{self, Classifier, Controller, Device, State};
use crate::flow::{Event, Record, Table};
use crate::resolve::{Lookup, Resolver};
use crate::sockets::{Sockets, Source};

#[derive(Clone, Debug)]
pub struct Config {
    pub capture:         capture::Config,
    pub stale:           Duration,
    pub workers:         usize,
    pub dns_timeout:     Duration,
    pub refresh_timeout: Duration,
    pub queue:           usize,
    pub resolve:         bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capture:         capture::Config::default(),
            stale:           Duration::from_secs(60 * 60),
            workers:         4,
            dns_timeout:     Duration::from_secs(5),
            refresh_timeout: Duration::from_secs(2),
            queue:           10_000,
            resolve:         true,
        }
    }
}

impl Config {
    /// Build an empty flow table backed by the given socket source and
    /// reverse lookup.
    pub fn table<S: Source, L: Lookup>(&self, source: S, lookup: L, handle: Handle) -> Table {
        let sockets  = Sockets::new(source, self.refresh_timeout);
        let resolver = match self.resolve {
            true  => Some(Resolver::new(lookup, handle, self.workers, self.dns_timeout)),
            false => None,
        };
        Table::new(sockets, resolver, self.stale)
    }
}

/// Ties capture to the flow table: frames classified on the capture thread
/// are applied in arrival order by a single updater thread.
pub struct Tracker {
    table:      Arc<Table>,
    controller: Controller,
    flush:      Sender<Sender<()>>,
    updater:    Option<JoinHandle<()>>,
}

impl Tracker {
    pub fn new(cfg: &Config, table: Table, device: Box<dyn Device>, local: IpAddr) -> Result<Self> {
        let table = Arc::new(table);

        let (tx, rx)          = bounded(cfg.queue.max(1));
        let (flush, flush_rx) = bounded(1);

        let updater = {
            let table = table.clone();
            thread::Builder::new().name("updater".to_owned()).spawn(move || {
                update(&table, rx, flush_rx);
            })?
        };

        let classifier = Classifier::new(local);
        let controller = Controller::new(device, cfg.capture.clone(), classifier, tx);

        Ok(Self {
            table:      table,
            controller: controller,
            flush:      flush,
            updater:    Some(updater),
        })
    }

    pub fn start(&mut self) -> Result<()> {
        self.controller.start()
    }

    /// Stop capture and wait until every queued packet has been applied.
    pub fn stop(&mut self) -> Result<()> {
        let result = self.controller.stop();
        self.drain();
        result
    }

    pub fn check(&mut self) -> Result<()> {
        self.controller.check()
    }

    pub fn state(&self) -> State {
        self.controller.state()
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.table.snapshot()
    }

    pub fn replace(&self, records: Vec<Record>) -> Result<()> {
        if self.state() == State::Capturing {
            bail!("cannot replace flows while capturing");
        }
        self.drain();
        self.table.replace(records);
        Ok(())
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    fn drain(&self) {
        let (ack, done) = bounded(1);
        if self.flush.send(ack).is_ok() && done.recv_timeout(Duration::from_secs(5)).is_err() {
            warn!("updater did not drain in time");
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if let Err(e) = self.controller.stop() {
            warn!("capture stop failed: {:?}", e);
        }

        // closing the flush channel ends the updater
        let (flush, _) = bounded(0);
        drop(std::mem::replace(&mut self.flush, flush));

        if let Some(updater) = self.updater.take() {
            if updater.join().is_err() {
                warn!("updater thread panicked");
            }
        }
    }
}

fn update(table: &Table, events: Receiver<Event>, flush: Receiver<Sender<()>>) {
    loop {
        select! {
            recv(events) -> event => match event {
                Ok(event) => table.update(&event),
                Err(_)    => break,
            },
            recv(flush) -> ack => match ack {
                Ok(ack) => {
                    events.try_iter().for_each(|event| table.update(&event));
                    let _ = ack.send(());
                }
                Err(_) => break,
            },
        }
    }
    debug!("updater finished");
}
