//! Network component
//!
//! Owns the transport and a double-buffered inbox. Frames drained during a
//! tick's sync phase become the committed inbox read by the next tick, and
//! are replaced wholesale at the following sync, so each message is seen by
//! exactly one tick.

use super::protocol::Message;
use super::transport::Transport;
use crate::sim::buffer::DoubleBuffer;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inbox {
    pub messages: Vec<Message>,
}

/// Running totals, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStats {
    pub sent: u64,
    pub dropped: u64,
    pub received: u64,
    pub malformed: u64,
}

#[derive(Debug)]
pub struct Network<T> {
    transport: T,
    inbox: DoubleBuffer<Inbox>,
    stats: NetworkStats,
    was_connected: bool,
}

impl<T: Transport> Network<T> {
    pub fn new(transport: T) -> Self {
        let was_connected = transport.is_connected();
        if !was_connected {
            log::warn!("Transport not connected, running without peers");
        }
        Self {
            transport,
            inbox: DoubleBuffer::from_fn(Inbox::default),
            stats: NetworkStats::default(),
            was_connected,
        }
    }

    /// Messages visible to the current tick
    pub fn incoming(&self) -> &[Message] {
        &self.inbox.current().messages
    }

    pub fn stats(&self) -> NetworkStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Broadcast outgoing messages. Counted as dropped when disconnected.
    pub fn send_all<'a>(&mut self, outgoing: impl IntoIterator<Item = &'a Message>) {
        let connected = self.transport.is_connected();
        if connected != self.was_connected {
            log::info!("Transport {}", if connected { "connected" } else { "disconnected" });
            self.was_connected = connected;
        }

        for msg in outgoing {
            if !connected {
                self.stats.dropped += 1;
                continue;
            }
            let text = match msg.encode() {
                Ok(text) => text,
                Err(err) => {
                    log::warn!("Failed to encode {msg:?}: {err}");
                    self.stats.dropped += 1;
                    continue;
                }
            };
            match self.transport.send(text) {
                Ok(()) => self.stats.sent += 1,
                Err(err) => {
                    log::debug!("Dropped outgoing message: {err}");
                    self.stats.dropped += 1;
                }
            }
        }
    }

    /// Drain the transport into the next inbox and commit it
    pub fn receive(&mut self) {
        let frames = self.transport.drain();
        let next = self.inbox.next_mut();
        next.messages.clear();
        for text in frames {
            match Message::decode(&text) {
                Ok(Message::Unknown) => {
                    log::debug!("Ignoring message of unknown type: {text}");
                }
                Ok(msg) => next.messages.push(msg),
                Err(err) => {
                    log::warn!("Ignoring malformed message: {err}");
                    self.stats.malformed += 1;
                }
            }
        }
        self.stats.received += next.messages.len() as u64;
        self.inbox.swap();
    }
}
