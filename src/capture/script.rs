use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use anyhow::{Result, anyhow};
use super::{Config, Device, Frame, Next, Session};

/// How a scripted session behaves once its frames run out.
#[derive(Copy, Clone, Debug)]
pub enum End {
    Idle,
    Done,
    Fail,
}

/// A device replaying canned frames.
pub struct Script {
    pub frames: Vec<Vec<u8>>,
    pub end:    End,
    pub broken: bool,
    pub opened: Arc<AtomicUsize>,
}

struct Playback {
    frames:  VecDeque<Vec<u8>>,
    current: Vec<u8>,
    end:     End,
}

impl Script {
    pub fn new(frames: Vec<Vec<u8>>, end: End) -> Self {
        Self {
            frames: frames,
            end:    end,
            broken: false,
            opened: Default::default(),
        }
    }
}

impl Device for Script {
    fn name(&self) -> &str {
        "script"
    }

    fn open(&self, _cfg: &Config) -> Result<Box<dyn Session>> {
        if self.broken {
            return Err(anyhow!("no such device"));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(Playback {
            frames:  self.frames.iter().cloned().collect(),
            current: Vec::new(),
            end:     self.end,
        }))
    }
}

impl Session for Playback {
    fn next(&mut self) -> Result<Next<'_>> {
        if let Some(frame) = self.frames.pop_front() {
            self.current = frame;
            return Ok(Next::Frame(Frame {
                data: &self.current,
                len:  self.current.len(),
            }));
        }

        match self.end {
            End::Idle => {
                std::thread::sleep(std::time::Duration::from_millis(5));
                Ok(Next::Timeout)
            }
            End::Done => Ok(Next::Done),
            End::Fail => Err(anyhow!("interface went down")),
        }
    }
}
