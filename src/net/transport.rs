//! Transport boundary
//!
//! A transport moves already-encoded text frames. Framing and connection
//! lifecycle belong to the implementation; the simulation only sends
//! fire-and-forget and drains whatever arrived since the last drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::TransportError;

pub trait Transport {
    fn is_connected(&self) -> bool;

    /// Queue one frame for broadcast. Fails when disconnected.
    fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Take every frame received since the previous call
    fn drain(&mut self) -> Vec<String>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        (**self).send(text)
    }

    fn drain(&mut self) -> Vec<String> {
        (**self).drain()
    }
}

/// A transport that never connects. The simulation runs single-player.
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

impl Transport for Offline {
    fn is_connected(&self) -> bool {
        false
    }

    fn send(&mut self, _text: String) -> Result<(), TransportError> {
        Err(TransportError::Disconnected)
    }

    fn drain(&mut self) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
struct HubInner {
    inboxes: Vec<VecDeque<String>>,
    online: Vec<bool>,
}

/// In-process relay that broadcasts every frame to every online endpoint,
/// the sender included, like an echo relay server would.
#[derive(Debug, Clone, Default)]
pub struct LoopbackHub {
    inner: Rc<RefCell<HubInner>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new endpoint
    pub fn endpoint(&self) -> HubEndpoint {
        let mut inner = self.inner.borrow_mut();
        inner.inboxes.push(VecDeque::new());
        inner.online.push(true);
        HubEndpoint {
            hub: Rc::clone(&self.inner),
            slot: inner.inboxes.len() - 1,
        }
    }

    /// Frames waiting across all inboxes
    pub fn pending(&self) -> usize {
        self.inner.borrow().inboxes.iter().map(VecDeque::len).sum()
    }
}

#[derive(Debug)]
pub struct HubEndpoint {
    hub: Rc<RefCell<HubInner>>,
    slot: usize,
}

impl HubEndpoint {
    /// Simulate the link going down or coming back. Offline endpoints
    /// neither send nor receive; frames broadcast meanwhile are lost to them.
    pub fn set_online(&self, online: bool) {
        let mut inner = self.hub.borrow_mut();
        inner.online[self.slot] = online;
        if !online {
            inner.inboxes[self.slot].clear();
        }
    }
}

impl Transport for HubEndpoint {
    fn is_connected(&self) -> bool {
        self.hub.borrow().online[self.slot]
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let mut inner = self.hub.borrow_mut();
        if !inner.online[self.slot] {
            return Err(TransportError::Disconnected);
        }
        let HubInner { inboxes, online } = &mut *inner;
        for (inbox, _) in inboxes.iter_mut().zip(online.iter()).filter(|(_, on)| **on) {
            inbox.push_back(text.clone());
        }
        Ok(())
    }

    fn drain(&mut self) -> Vec<String> {
        self.hub.borrow_mut().inboxes[self.slot].drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_broadcasts_to_everyone() {
        let hub = LoopbackHub::new();
        let mut a = hub.endpoint();
        let mut b = hub.endpoint();

        a.send("hello".to_string()).unwrap();
        assert_eq!(hub.pending(), 2);
        assert_eq!(a.drain(), vec!["hello".to_string()]);
        assert_eq!(b.drain(), vec!["hello".to_string()]);
        assert!(b.drain().is_empty());
    }

    #[test]
    fn test_offline_endpoint() {
        let hub = LoopbackHub::new();
        let mut a = hub.endpoint();
        let mut b = hub.endpoint();

        b.set_online(false);
        assert!(!b.is_connected());
        assert_eq!(b.send("x".to_string()), Err(TransportError::Disconnected));

        a.send("missed".to_string()).unwrap();
        assert!(b.drain().is_empty());

        b.set_online(true);
        a.send("seen".to_string()).unwrap();
        assert_eq!(b.drain(), vec!["seen".to_string()]);
    }

    #[test]
    fn test_offline_transport() {
        let mut t = Offline;
        assert!(!t.is_connected());
        assert!(t.send(String::new()).is_err());
        assert!(t.drain().is_empty());
    }
}
