use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};
use anyhow::Result;
use crate::flow::{Addr, Direction, Event, Protocol, Record, Signature};
use crate::sockets::Attribution;
use super::{load, save, Format};

fn record(remote: &str, proto: Protocol) -> Record {
    let local  = Addr::from("10.0.0.2:51000".parse::<SocketAddr>().unwrap());
    let remote = Addr::from(remote.parse::<SocketAddr>().unwrap());
    let event  = Event {
        signature: Signature::new(remote, proto),
        direction: Direction::Out,
        local:     local,
        remote:    remote,
        bytes:     40,
    };

    let now = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    let mut rec = Record::new(&event, None, now);
    rec.increment(Direction::Out, 40, now);
    rec.increment(Direction::In, 60, now + Duration::from_secs(1));
    rec
}

#[test]
fn format_from_path() -> Result<()> {
    assert_eq!(Format::from_path(Path::new("flows.data"))?, Format::Data);
    assert_eq!(Format::from_path(Path::new("flows.json.gz"))?, Format::Data);
    assert_eq!(Format::from_path(Path::new("flows.TXT"))?, Format::Text);
    assert!(Format::from_path(Path::new("flows")).is_err());
    assert!(Format::from_path(Path::new("flows.csv")).is_err());
    Ok(())
}

#[test]
fn data_round_trip() -> Result<()> {
    let dir  = tempfile::tempdir()?;
    let path = dir.path().join("flows.data");

    let mut dns = record("1.1.1.1:53", Protocol::UDP);
    dns.hostname    = Some("one.one.one.one".to_owned());
    dns.attribution = Some(Attribution {
        pid:    Some(4242),
        status: "NONE".to_owned(),
        fd:     Some(7),
    });

    let records = vec![record("93.184.216.34:443", Protocol::TCP), dns];

    save(&path, &records, Format::Data)?;
    assert_eq!(load(&path)?, records);

    // gzip magic
    assert_eq!(&fs::read(&path)?[..2], &[0x1f, 0x8b]);

    Ok(())
}

#[test]
fn text_lines() -> Result<()> {
    let dir  = tempfile::tempdir()?;
    let path = dir.path().join("flows.txt");

    let mut web = record("93.184.216.34:443", Protocol::TCP);
    web.hostname = Some("example.com".to_owned());

    save(&path, &[web, record("1.1.1.1:53", Protocol::UDP)], Format::Text)?;

    let text  = fs::read_to_string(&path)?;
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "example.com:443 <-> 10.0.0.2:51000 TCP packets 2 in 1 out 1 \
                          bytes 100 down 60 up 40 pid - \
                          first 2020-09-13T12:26:40Z last 2020-09-13T12:26:41Z");
    assert!(lines[1].starts_with("1.1.1.1:53 <-> 10.0.0.2:51000 UDP"));

    Ok(())
}

#[test]
fn errors_name_path() -> Result<()> {
    let dir  = tempfile::tempdir()?;

    let missing = dir.path().join("missing.data");
    let err     = load(&missing).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.data"));

    let garbage = dir.path().join("garbage.data");
    fs::write(&garbage, b"not gzip")?;
    let err = load(&garbage).unwrap_err();
    assert!(format!("{:#}", err).contains("garbage.data"));

    let nowhere = dir.path().join("no/such/dir/flows.txt");
    assert!(save(&nowhere, &[], Format::Text).is_err());

    Ok(())
}
