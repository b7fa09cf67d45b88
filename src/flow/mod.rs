use serde::{Serialize, Deserialize};

/// A classified packet, ready to be applied to the flow table.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub signature: Signature,
    pub direction: Direction,
    pub local:     Addr,
    pub remote:    Addr,
    pub bytes:     usize,
}

pub use key::{Addr, Direction, Protocol, Signature};
pub use record::Record;
pub use table::Table;

mod key;
mod record;
mod table;
