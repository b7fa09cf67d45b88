pub mod args;
pub mod capture;
pub mod flow;
pub mod link;
pub mod packet;
pub mod process;
pub mod resolve;
pub mod show;
pub mod sockets;
pub mod store;
pub mod track;
pub mod watch;
