use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use anyhow::{Result, anyhow};
use crossbeam_channel::Sender;
use log::{debug, info, warn};
use crate::flow::Event;
use super::{Classifier, Config, Device, Next, Queue, Session};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    Idle,
    Capturing,
}

/// Owns at most one capture session and the thread driving it.
pub struct Controller {
    device:     Box<dyn Device>,
    cfg:        Config,
    classifier: Classifier,
    tx:         Sender<Event>,
    task:       Option<Running>,
}

struct Running {
    stop:   Arc<AtomicBool>,
    handle: JoinHandle<Result<()>>,
}

impl Controller {
    pub fn new(device: Box<dyn Device>, cfg: Config, classifier: Classifier, tx: Sender<Event>) -> Self {
        Self {
            device:     device,
            cfg:        cfg,
            classifier: classifier,
            tx:         tx,
            task:       None,
        }
    }

    pub fn state(&self) -> State {
        match &self.task {
            Some(task) if !task.handle.is_finished() => State::Capturing,
            _                                        => State::Idle,
        }
    }

    /// Open a session and start capturing. Returns the outcome of a
    /// previous session that failed since the last call.
    pub fn start(&mut self) -> Result<()> {
        if self.state() == State::Capturing {
            return Ok(());
        }

        self.stop()?;

        let session = self.device.open(&self.cfg)?;
        let queue   = Queue::new(self.classifier, self.tx.clone());
        let stop    = Arc::new(AtomicBool::new(false));
        let name    = self.device.name().to_owned();

        let mut task = Task {
            session: session,
            queue:   queue,
            stop:    stop.clone(),
        };

        let handle = thread::Builder::new().name(format!("capture {}", name)).spawn(move || {
            info!("starting {} capture", name);
            let result = task.poll();
            match &result {
                Ok(()) => debug!("capture {} finished, {} dropped", name, task.queue.dropped()),
                Err(e) => warn!("capture {} stopped: {:?}", name, e),
            };
            result
        })?;

        self.task = Some(Running { stop, handle });

        Ok(())
    }

    /// Stop capturing and wait for the capture thread to exit.
    pub fn stop(&mut self) -> Result<()> {
        let task = match self.task.take() {
            Some(task) => task,
            None       => return Ok(()),
        };

        task.stop.store(true, Ordering::Release);

        match task.handle.join() {
            Ok(result) => result,
            Err(_)     => Err(anyhow!("capture thread panicked")),
        }
    }

    /// Collect the outcome of a session that ended on its own.
    pub fn check(&mut self) -> Result<()> {
        match self.state() {
            State::Idle      => self.stop(),
            State::Capturing => Ok(()),
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("capture stop failed: {:?}", e);
        }
    }
}

struct Task {
    session: Box<dyn Session>,
    queue:   Queue,
    stop:    Arc<AtomicBool>,
}

impl Task {
    fn poll(&mut self) -> Result<()> {
        while !self.stop.load(Ordering::Acquire) && !self.queue.done() {
            match self.session.next()? {
                Next::Frame(frame) => self.queue.record(&frame),
                Next::Timeout      => (),
                Next::Done         => break,
            }
        }
        Ok(())
    }
}
