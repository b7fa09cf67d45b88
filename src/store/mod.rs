use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use anyhow::{Context, Error, Result, anyhow};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use humantime::format_rfc3339_seconds;
use log::info;
use crate::flow::Record;

/// On-disk representation of a table snapshot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Format {
    /// gzip compressed JSON, readable by `load`.
    Data,
    /// One line per flow for people.
    Text,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        ext.parse().with_context(|| format!("unknown format of {}", path.display()))
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "data" | "gz" | "ntd" => Ok(Format::Data),
            "txt"  | "text"       => Ok(Format::Text),
            _                     => Err(anyhow!("invalid format '{}'", s)),
        }
    }
}

pub fn save(path: &Path, records: &[Record], format: Format) -> Result<()> {
    let file = File::create(path).with_context(|| {
        format!("failed to create {}", path.display())
    })?;

    let mut w = BufWriter::new(file);

    let result = match format {
        Format::Data => data(&mut w, records),
        Format::Text => text(&mut w, records),
    };
    result.with_context(|| format!("failed to write {}", path.display()))?;

    info!("saved {} flows to {}", records.len(), path.display());

    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| {
        format!("failed to open {}", path.display())
    })?;

    let reader  = GzDecoder::new(BufReader::new(file));
    let records = serde_json::from_reader::<_, Vec<Record>>(reader).with_context(|| {
        format!("failed to read {}", path.display())
    })?;

    info!("loaded {} flows from {}", records.len(), path.display());

    Ok(records)
}

fn data<W: Write>(w: &mut W, records: &[Record]) -> Result<()> {
    let mut gz = GzEncoder::new(w, Compression::default());
    serde_json::to_writer(&mut gz, records)?;
    gz.finish()?.flush()?;
    Ok(())
}

fn text<W: Write>(w: &mut W, records: &[Record]) -> Result<()> {
    for rec in records {
        writeln!(w, "{}", Line(rec))?;
    }
    w.flush()?;
    Ok(())
}

/// Text rendering of one record.
pub struct Line<'a>(pub &'a Record);

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rec = self.0;
        let pid = match rec.pid() {
            Some(pid) => pid.to_string(),
            None      => "-".to_owned(),
        };

        write!(f, "{} <-> {} {} packets {} in {} out {} ", rec.endpoint(), rec.local, rec.protocol, rec.packets, rec.incoming, rec.outgoing)?;
        write!(f, "bytes {} down {} up {} pid {} ", rec.bytes, rec.download, rec.upload, pid)?;
        write!(f, "first {} last {}", format_rfc3339_seconds(rec.first_seen), format_rfc3339_seconds(rec.last_seen))
    }
}

#[cfg(test)]
mod test;
