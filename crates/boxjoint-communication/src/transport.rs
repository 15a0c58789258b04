//! Line-delimited transport
//!
//! Owns one serial connection at a time. Outgoing text is sent as a single
//! newline-terminated line; incoming bytes are framed on newlines by a
//! background reader thread and handed to listeners in arrival order.

use crate::framer::LineFramer;
use crate::listener::{ListenerHandle, ListenerSet, TransportListener};
use crate::serial::{PortOpener, SerialPort};
use boxjoint_core::{encode_moves, ConnectionError, Result};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const READ_CHUNK: usize = 256;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

type SharedPort = Arc<Mutex<Box<dyn SerialPort>>>;

struct Connection {
    device: String,
    port: SharedPort,
    stop: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

/// Serial transport with an explicit connect/disconnect lifecycle
pub struct LineTransport<O: PortOpener> {
    opener: O,
    listeners: ListenerSet,
    connection: Option<Connection>,
    poll_interval: Duration,
}

impl<O: PortOpener> LineTransport<O> {
    /// Create a disconnected transport
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            listeners: ListenerSet::default(),
            connection: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set how long the reader sleeps when no data is available
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Register a listener for connection and data events
    pub fn add_listener(&self, listener: Arc<dyn TransportListener>) -> ListenerHandle {
        self.listeners.add(listener)
    }

    /// Unregister a listener; returns false if it was not registered
    pub fn remove_listener(&self, handle: &ListenerHandle) -> bool {
        self.listeners.remove(handle)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether a connection is open and its reader is still running
    pub fn is_connected(&self) -> bool {
        self.connection
            .as_ref()
            .is_some_and(|c| c.alive.load(Ordering::Acquire))
    }

    /// Name of the connected device
    pub fn device(&self) -> Option<&str> {
        self.connection
            .as_ref()
            .filter(|c| c.alive.load(Ordering::Acquire))
            .map(|c| c.device.as_str())
    }

    /// Open the named device and start reading from it.
    ///
    /// Listeners get `on_connect(true)` on success and `on_connect(false)`
    /// on failure.
    pub fn connect(&mut self, device: &str) -> Result<()> {
        if let Some(current) = self.device() {
            return Err(ConnectionError::AlreadyConnected {
                device: current.to_string(),
            }
            .into());
        }
        // reader may have died on an I/O error; reap it before reconnecting
        self.release_connection();

        let port = match self.opener.open(device) {
            Ok(port) => port,
            Err(e) => {
                tracing::warn!("Unable to connect to {}: {}", device, e);
                self.listeners.notify_connect(false);
                return Err(e);
            }
        };

        let port: SharedPort = Arc::new(Mutex::new(port));
        let stop = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));

        tracing::info!("Connected to {}", device);
        self.listeners.notify_connect(true);

        let worker = {
            let port = Arc::clone(&port);
            let stop = Arc::clone(&stop);
            let alive = Arc::clone(&alive);
            let listeners = self.listeners.clone();
            let poll_interval = self.poll_interval;
            thread::Builder::new()
                .name("boxjoint-serial-reader".to_string())
                .spawn(move || read_loop(port, stop, alive, listeners, poll_interval))
        };

        match worker {
            Ok(handle) => {
                self.connection = Some(Connection {
                    device: device.to_string(),
                    port,
                    stop,
                    alive,
                    worker: Some(handle),
                });
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to start serial reader: {}", e);
                if let Err(close_err) = port.lock().close() {
                    tracing::warn!("Failed to close {}: {}", device, close_err);
                }
                self.listeners.notify_connect(false);
                Err(e.into())
            }
        }
    }

    /// Stop the reader, close the port and notify listeners.
    ///
    /// Disconnecting while not connected does nothing.
    pub fn disconnect(&mut self) -> Result<()> {
        let was_alive = self.is_connected();
        if let Some(device) = self.release_connection() {
            tracing::info!("Disconnected from {}", device);
            if was_alive {
                self.listeners.notify_connect(false);
            }
        }
        Ok(())
    }

    /// Send one line of text; a newline is appended.
    pub fn send_data(&self, data: &str) -> Result<()> {
        let connection = match &self.connection {
            Some(c) if c.alive.load(Ordering::Acquire) => c,
            _ => {
                tracing::debug!("Not connected, dropping {} bytes", data.len());
                return Err(ConnectionError::NotConnected.into());
            }
        };

        let mut line = String::with_capacity(data.len() + 1);
        line.push_str(data);
        line.push('\n');

        connection
            .port
            .lock()
            .write(line.as_bytes())
            .map_err(|e| {
                tracing::warn!("Can't send data to {}: {}", connection.device, e);
                ConnectionError::WriteFailed {
                    reason: e.to_string(),
                }
            })?;

        tracing::debug!("Sent {} bytes to {}", line.len(), connection.device);
        Ok(())
    }

    /// Send a move list in the jig's wire format (`a,b,c,\n`)
    pub fn send_moves(&self, moves: &[i32]) -> Result<()> {
        self.send_data(&encode_moves(moves))
    }

    fn release_connection(&mut self) -> Option<String> {
        let mut connection = self.connection.take()?;
        connection.stop.store(true, Ordering::Release);
        if let Some(worker) = connection.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Serial reader for {} panicked", connection.device);
            }
        }
        if let Err(e) = connection.port.lock().close() {
            tracing::warn!("Can't close {} properly: {}", connection.device, e);
        }
        Some(connection.device)
    }
}

impl<O: PortOpener> Drop for LineTransport<O> {
    fn drop(&mut self) {
        if self.connection.is_some() {
            let _ = self.disconnect();
        }
    }
}

fn read_loop(
    port: SharedPort,
    stop: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    listeners: ListenerSet,
    poll_interval: Duration,
) {
    let mut framer = LineFramer::new();
    let mut buf = [0u8; READ_CHUNK];

    while !stop.load(Ordering::Acquire) {
        // lock only for the read so senders can interleave
        let result = port.lock().read(&mut buf);
        match result {
            Ok(0) => thread::sleep(poll_interval),
            Ok(n) => {
                for record in framer.push(&buf[..n]) {
                    listeners.notify_data(&record);
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                thread::sleep(poll_interval)
            }
            Err(e) => {
                tracing::warn!("Serial read failed, stopping reader: {}", e);
                break;
            }
        }
    }

    alive.store(false, Ordering::Release);
    if !stop.load(Ordering::Acquire) {
        listeners.notify_connect(false);
    }
}
