//! Transport listener interface
//!
//! Defines the listener trait for connection and data events, and the
//! registry the transport uses to fan events out.

use parking_lot::RwLock;
use std::sync::mpsc;
use std::sync::Arc;
use uuid::Uuid;

/// Handle for a registered transport listener.
///
/// Returned by `add_listener` and used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(Uuid);

impl ListenerHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Listener trait for transport events
///
/// Callbacks run on the thread that produced the event: the caller's
/// thread for connection changes, the reader thread for incoming data.
pub trait TransportListener: Send + Sync {
    /// Called when the connection is established or lost
    fn on_connect(&self, _connected: bool) {}

    /// Called once per newline-delimited record, in arrival order
    fn on_data_read(&self, _data: &str) {}
}

/// Transport events as plain values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection state changed
    Connected(bool),
    /// A record was received
    DataRead(String),
}

/// Listener that forwards events onto a channel
pub struct ChannelListener {
    tx: mpsc::Sender<TransportEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel
    pub fn new() -> (Self, mpsc::Receiver<TransportEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl TransportListener for ChannelListener {
    fn on_connect(&self, connected: bool) {
        // receiver may be gone; nothing to do then
        let _ = self.tx.send(TransportEvent::Connected(connected));
    }

    fn on_data_read(&self, data: &str) {
        let _ = self.tx.send(TransportEvent::DataRead(data.to_string()));
    }
}

/// Shared, ordered set of listeners
#[derive(Clone, Default)]
pub(crate) struct ListenerSet {
    listeners: Arc<RwLock<Vec<(ListenerHandle, Arc<dyn TransportListener>)>>>,
}

impl ListenerSet {
    pub(crate) fn add(&self, listener: Arc<dyn TransportListener>) -> ListenerHandle {
        let handle = ListenerHandle::new();
        self.listeners.write().push((handle, listener));
        handle
    }

    pub(crate) fn remove(&self, handle: &ListenerHandle) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(h, _)| h != handle);
        listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.read().len()
    }

    // Callbacks run on a snapshot so a listener may unsubscribe itself.
    fn snapshot(&self) -> Vec<Arc<dyn TransportListener>> {
        self.listeners
            .read()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }

    pub(crate) fn notify_connect(&self, connected: bool) {
        for listener in self.snapshot() {
            listener.on_connect(connected);
        }
    }

    pub(crate) fn notify_data(&self, data: &str) {
        for listener in self.snapshot() {
            listener.on_data_read(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let set = ListenerSet::default();
        let (listener, rx) = ChannelListener::new();
        let handle = set.add(Arc::new(listener));
        assert_eq!(set.len(), 1);

        set.notify_connect(true);
        set.notify_data("hello");
        assert_eq!(rx.try_recv(), Ok(TransportEvent::Connected(true)));
        assert_eq!(rx.try_recv(), Ok(TransportEvent::DataRead("hello".into())));

        assert!(set.remove(&handle));
        assert!(!set.remove(&handle));
        set.notify_data("ignored");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_handles_are_unique() {
        let set = ListenerSet::default();
        let (a, _rx_a) = ChannelListener::new();
        let (b, _rx_b) = ChannelListener::new();
        assert_ne!(set.add(Arc::new(a)), set.add(Arc::new(b)));
    }
}
