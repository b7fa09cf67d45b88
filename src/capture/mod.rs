pub use classify::Classifier;
pub use config::{Config, FILTER};
pub use controller::{Controller, State};
pub use queue::Queue;
pub use session::{Device, File, Frame, Next, Pcap, Session};

mod classify;
mod config;
mod controller;
mod queue;
mod session;


#[cfg(test)]
pub(crate) mod script;
