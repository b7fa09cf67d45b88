use anyhow::{Error, Result};
use libc::pid_t;
use procfs::process;
use super::Process;

impl Process {
    pub fn load(pid: pid_t) -> Result<Self> {
        process::Process::new(pid)?.try_into()
    }
}

impl TryFrom<process::Process> for Process {
    type Error = Error;

    fn try_from(proc: process::Process) -> Result<Self, Self::Error> {
        Ok(Process {
            pid:  proc.pid,
            comm: proc.stat()?.comm,
        })
    }
}
