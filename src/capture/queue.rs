use crossbeam_channel::Sender;
use log::warn;
use crate::flow::Event;
use super::{Classifier, Frame};
use crossbeam_channel::TrySendError::*;

/// Hands classified frames to the updater without ever blocking capture.
pub struct Queue {
    classifier: Classifier,
    tx:         Sender<Event>,
    dropped:    u64,
    done:       bool,
}

impl Queue {
    pub fn new(classifier: Classifier, tx: Sender<Event>) -> Self {
        Self {
            classifier: classifier,
            tx:         tx,
            dropped:    0,
            done:       false,
        }
    }

    pub fn record(&mut self, frame: &Frame) {
        if let Some(event) = self.classifier.classify(frame) {
            match self.tx.try_send(event) {
                Ok(_)                => (),
                Err(Full(_))         => self.overflow(),
                Err(Disconnected(_)) => self.done = true,
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn done(&self) -> bool {
        self.done
    }

    fn overflow(&mut self) {
        self.dropped += 1;
        if self.dropped.is_power_of_two() {
            warn!("update channel full, {} packets dropped", self.dropped);
        }
    }
}
