use std::path::Path;
use anyhow::Result;
use clap::ArgMatches;
use crate::args::opt;
use crate::flow::Record;
use crate::store::{self, Format};

pub fn show(args: &ArgMatches) -> Result<()> {
    let file = Path::new(args.value_of("file").unwrap_or_default());
    let top  = opt(args.value_of("top"))?.unwrap_or(usize::MAX);

    let records = store::load(file)?;
    print(&records, top);

    if let Some(path) = args.value_of("save") {
        let path = Path::new(path);
        store::save(path, &records, Format::from_path(path)?)?;
    }

    Ok(())
}

/// Print the busiest `top` flows.
pub fn print(records: &[Record], top: usize) {
    let mut records = records.iter().collect::<Vec<_>>();
    records.sort_by(|a, b| b.packets.cmp(&a.packets).then(a.last_seen.cmp(&b.last_seen)));

    println!("{:>7} {:<16} {:<5} {:<40} {:<21} {:>8} {:>8} {:>8} {:>12} {:>12} {:>12}",
             "PID", "PROCESS", "PROTO", "REMOTE", "LOCAL", "PACKETS", "IN", "OUT", "BYTES", "DOWN", "UP");

    for rec in records.into_iter().take(top) {
        let pid = rec.pid().map(|pid| pid.to_string()).unwrap_or_else(|| "-".to_owned());
        let name = rec.process_name().unwrap_or_else(|| "unknown".to_owned());

        println!("{:>7} {:<16} {:<5} {:<40} {:<21} {:>8} {:>8} {:>8} {:>12} {:>12} {:>12}",
                 pid, name, rec.protocol.to_string(), rec.endpoint(), rec.local.to_string(),
                 rec.packets, rec.incoming, rec.outgoing, rec.bytes, rec.download, rec.upload);
    }
}
