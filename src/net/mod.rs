//! Peer messaging
//!
//! Wire format, the transport boundary and the double-buffered network
//! component that sits between them and the simulation.

pub mod network;
pub mod protocol;
pub mod transport;

pub use network::{Inbox, Network, NetworkStats};
pub use protocol::Message;
pub use transport::{HubEndpoint, LoopbackHub, Offline, Transport};
