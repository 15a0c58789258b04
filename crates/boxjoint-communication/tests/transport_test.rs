use boxjoint_communication::{
    ChannelListener, LineTransport, PortOpener, SerialPort, TransportEvent, TransportListener,
};
use boxjoint_core::{ConnectionError, Error};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(2);

// In-memory port shared between the test and the transport
#[derive(Clone, Default)]
struct MockLink {
    inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
    outbound: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
    broken: Arc<AtomicBool>,
}

impl MockLink {
    fn feed(&self, bytes: &[u8]) {
        self.inbound.lock().unwrap().push_back(bytes.to_vec());
    }

    fn written(&self) -> String {
        String::from_utf8_lossy(&self.outbound.lock().unwrap()).to_string()
    }
}

struct MockPort {
    link: MockLink,
}

impl SerialPort for MockPort {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.link.outbound.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.link.broken.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "link dropped"));
        }
        match self.link.inbound.lock().unwrap().pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
        }
    }

    fn name(&self) -> String {
        "mock".to_string()
    }

    fn close(&mut self) -> io::Result<()> {
        self.link.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MockOpener {
    device: String,
    link: MockLink,
}

impl PortOpener for MockOpener {
    fn open(&self, device: &str) -> boxjoint_core::Result<Box<dyn SerialPort>> {
        if device != self.device {
            return Err(ConnectionError::DeviceNotFound {
                name: device.to_string(),
            }
            .into());
        }
        self.link.closed.store(false, Ordering::SeqCst);
        Ok(Box::new(MockPort {
            link: self.link.clone(),
        }))
    }
}

fn transport() -> (LineTransport<MockOpener>, MockLink, Receiver<TransportEvent>) {
    let link = MockLink::default();
    let transport = LineTransport::new(MockOpener {
        device: "jig".to_string(),
        link: link.clone(),
    })
    .with_poll_interval(Duration::from_millis(1));
    let (listener, rx) = ChannelListener::new();
    transport.add_listener(Arc::new(listener));
    (transport, link, rx)
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

#[test]
fn test_connect_notifies_listeners() {
    let (mut transport, _link, rx) = transport();
    assert!(!transport.is_connected());

    transport.connect("jig").unwrap();
    assert!(transport.is_connected());
    assert_eq!(transport.device(), Some("jig"));
    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::Connected(true)));
}

#[test]
fn test_connect_unknown_device_fails() {
    let (mut transport, _link, rx) = transport();
    let err = transport.connect("nope").unwrap_err();
    assert!(err.is_connection_error());
    assert!(!transport.is_connected());
    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::Connected(false)));
}

#[test]
fn test_connect_twice_rejected() {
    let (mut transport, _link, _rx) = transport();
    transport.connect("jig").unwrap();
    assert!(matches!(
        transport.connect("jig"),
        Err(Error::Connection(ConnectionError::AlreadyConnected { .. }))
    ));
}

#[test]
fn test_records_delivered_in_order() {
    let (mut transport, link, rx) = transport();
    transport.connect("jig").unwrap();
    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::Connected(true)));

    link.feed(b"ok\nrea");
    link.feed(b"dy\r\n");
    link.feed(b"done\n");

    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::DataRead("ok".into())));
    assert_eq!(
        rx.recv_timeout(WAIT),
        Ok(TransportEvent::DataRead("ready".into()))
    );
    assert_eq!(
        rx.recv_timeout(WAIT),
        Ok(TransportEvent::DataRead("done".into()))
    );
}

#[test]
fn test_send_appends_newline() {
    let (mut transport, link, _rx) = transport();
    transport.connect("jig").unwrap();

    transport.send_data("hello").unwrap();
    transport.send_moves(&[50, 2, 398]).unwrap();
    assert_eq!(link.written(), "hello\n50,2,398,\n");
}

#[test]
fn test_send_when_disconnected_fails() {
    let (transport, link, _rx) = transport();
    assert!(matches!(
        transport.send_data("1,2,"),
        Err(Error::Connection(ConnectionError::NotConnected))
    ));
    assert_eq!(link.written(), "");
}

#[test]
fn test_disconnect_closes_port() {
    let (mut transport, link, rx) = transport();
    transport.connect("jig").unwrap();
    transport.disconnect().unwrap();

    assert!(!transport.is_connected());
    assert!(link.closed.load(Ordering::SeqCst));
    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::Connected(true)));
    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::Connected(false)));

    // idempotent, and reconnect works
    transport.disconnect().unwrap();
    assert!(rx.try_recv().is_err());
    transport.connect("jig").unwrap();
    assert!(transport.is_connected());
}

#[test]
fn test_read_error_drops_connection() {
    let (mut transport, link, rx) = transport();
    transport.connect("jig").unwrap();
    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::Connected(true)));

    link.broken.store(true, Ordering::SeqCst);
    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::Connected(false)));
    assert!(wait_until(|| !transport.is_connected()));
    assert!(transport.send_data("1,").is_err());

    link.broken.store(false, Ordering::SeqCst);
    transport.connect("jig").unwrap();
    assert!(transport.is_connected());
}

#[test]
fn test_removed_listener_gets_nothing() {
    struct Counter(Mutex<usize>);
    impl TransportListener for Counter {
        fn on_data_read(&self, _data: &str) {
            *self.0.lock().unwrap() += 1;
        }
    }

    let (mut transport, link, rx) = transport();
    let counter = Arc::new(Counter(Mutex::new(0)));
    let handle = transport.add_listener(counter.clone());
    assert_eq!(transport.listener_count(), 2);
    assert!(transport.remove_listener(&handle));
    assert_eq!(transport.listener_count(), 1);

    transport.connect("jig").unwrap();
    link.feed(b"ping\n");
    assert_eq!(rx.recv_timeout(WAIT), Ok(TransportEvent::Connected(true)));
    assert_eq!(
        rx.recv_timeout(WAIT),
        Ok(TransportEvent::DataRead("ping".into()))
    );
    assert_eq!(*counter.0.lock().unwrap(), 0);
}

#[test]
fn test_drop_disconnects() {
    let (mut transport, link, _rx) = transport();
    transport.connect("jig").unwrap();
    drop(transport);
    assert!(link.closed.load(Ordering::SeqCst));
}
