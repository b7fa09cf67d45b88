use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::sleep;
use std::time::{Duration, Instant};
use anyhow::{Result, anyhow};
use clap::{ArgMatches, value_t};
use log::{error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag::register;
use tokio::runtime::Runtime;
use crate::args::opt;
use crate::capture::{self, Device, File, Pcap, State};
use crate::link;
use crate::resolve::Dns;
use crate::show::print;
use crate::sockets::System;
use crate::store::{self, Format};
use crate::track::{self, Tracker};

pub fn watch(args: &ArgMatches) -> Result<()> {
    let interval = value_t!(args, "interval", u64)?;
    let top      = value_t!(args, "top", usize)?;
    let workers  = value_t!(args, "workers", usize)?;
    let timeout  = value_t!(args, "dns-timeout", u64)?;
    let stale    = value_t!(args, "stale", u64)?;
    let queue    = value_t!(args, "queue", usize)?;
    let local    = opt::<IpAddr>(args.value_of("local"))?;

    let save = args.value_of("save").map(Path::new);
    let load = args.value_of("load").map(Path::new);

    // fail before capturing rather than on exit
    let format = save.map(Format::from_path).transpose()?;

    let capture = capture::Config {
        promisc: args.is_present("promisc"),
        ..Default::default()
    };

    let cfg = track::Config {
        capture:         capture,
        stale:           minutes(stale),
        workers:         workers,
        dns_timeout:     Duration::from_secs(timeout),
        queue:           queue,
        resolve:         !args.is_present("no-resolve"),
        ..Default::default()
    };

    let (device, local) = source(args.value_of("interface"), args.value_of("read"), local)?;

    info!("tracking {} with local address {}", device.name(), local);

    let shutdown = Arc::new(AtomicBool::new(false));
    register(SIGTERM, shutdown.clone())?;
    register(SIGINT,  shutdown.clone())?;

    let rt    = Runtime::new()?;
    let table = cfg.table(System, Dns, rt.handle().clone());

    let mut tracker = Tracker::new(&cfg, table, device, local)?;

    if let Some(path) = load {
        tracker.replace(store::load(path)?)?;
    }

    tracker.start()?;

    let interval = Duration::from_secs(interval.max(1));
    let mut next = Instant::now() + interval;
    let mut fail = None;

    while !shutdown.load(Ordering::Acquire) {
        sleep(Duration::from_millis(100));

        if let Err(e) = tracker.check() {
            error!("capture failed: {:?}", e);
            fail = Some(e);
            break;
        }

        if tracker.state() == State::Idle {
            break;
        }

        if Instant::now() >= next {
            print(&tracker.snapshot(), top);
            next += interval;
        }
    }

    tracker.stop()?;

    let records = tracker.snapshot();
    print(&records, top);

    if let (Some(path), Some(format)) = (save, format) {
        store::save(path, &records, format)?;
    }

    drop(tracker);
    rt.shutdown_timeout(Duration::from_secs(1));

    match fail {
        Some(e) => Err(e),
        None    => Ok(()),
    }
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(60))
}

fn source(interface: Option<&str>, read: Option<&str>, local: Option<IpAddr>) -> Result<(Box<dyn Device>, IpAddr)> {
    if let Some(path) = read {
        let local = local.ok_or_else(|| anyhow!("replay requires a local address"))?;
        return Ok((Box::new(File::new(path)), local));
    }

    let link  = link::find(interface)?;
    let local = local.unwrap_or(link.addr);

    Ok((Box::new(Pcap::new(&link.name)), local))
}
