use std::collections::HashMap;
use anyhow::Result;
use libc::pid_t;
use procfs::net::TcpState;
use procfs::process::{all_processes, FDTarget};
use crate::flow::Protocol;
use super::{Socket, Source};

/// IPv4 TCP and UDP sockets from /proc/net, with owners found by matching
/// socket inodes against every visible /proc/<pid>/fd entry.
pub struct System;

impl Source for System {
    fn read(&self) -> Result<Vec<Socket>> {
        let owners = owners()?;
        let owner  = |inode: u64| match owners.get(&inode) {
            Some(&(pid, fd)) => (Some(pid), Some(fd)),
            None             => (None, None),
        };

        let mut socks = Vec::new();

        for entry in procfs::net::tcp()? {
            let (pid, fd) = owner(entry.inode);
            socks.push(Socket {
                proto:  Protocol::TCP,
                local:  entry.local_address,
                remote: entry.remote_address,
                status: status(&entry.state).to_owned(),
                pid:    pid,
                fd:     fd,
            });
        }

        for entry in procfs::net::udp()? {
            let (pid, fd) = owner(entry.inode);
            socks.push(Socket {
                proto:  Protocol::UDP,
                local:  entry.local_address,
                remote: entry.remote_address,
                status: "NONE".to_owned(),
                pid:    pid,
                fd:     fd,
            });
        }

        Ok(socks)
    }
}

fn owners() -> Result<HashMap<u64, (pid_t, i32)>> {
    let mut map = HashMap::new();

    for proc in all_processes()?.filter_map(|p| p.ok()) {
        // other users' fds are unreadable without privileges
        let fds = match proc.fd() {
            Ok(fds) => fds,
            Err(_)  => continue,
        };

        for fd in fds.filter_map(|fd| fd.ok()) {
            if let FDTarget::Socket(inode) = fd.target {
                map.insert(inode, (proc.pid, fd.fd));
            }
        }
    }

    Ok(map)
}

fn status(state: &TcpState) -> &'static str {
    match state {
        TcpState::Established => "ESTABLISHED",
        TcpState::SynSent     => "SYN_SENT",
        TcpState::SynRecv     => "SYN_RECV",
        TcpState::FinWait1    => "FIN_WAIT1",
        TcpState::FinWait2    => "FIN_WAIT2",
        TcpState::TimeWait    => "TIME_WAIT",
        TcpState::Close       => "CLOSE",
        TcpState::CloseWait   => "CLOSE_WAIT",
        TcpState::LastAck     => "LAST_ACK",
        TcpState::Listen      => "LISTEN",
        TcpState::Closing     => "CLOSING",
        _                     => "UNKNOWN",
    }
}
