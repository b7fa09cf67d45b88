use libc::pid_t;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Process {
    pub pid:  pid_t,
    pub comm: String,
}

/// Current name of `pid`, or `None` once the process is gone.
pub fn name(pid: pid_t) -> Option<String> {
    Process::load(pid).ok().map(|proc| proc.comm)
}

#[cfg(target_os = "linux")]
#[path = "linux.rs"]
mod ext;

#[cfg(not(target_os = "linux"))]
#[path = "posix.rs"]
mod ext;
