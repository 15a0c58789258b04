//! # Box Joint Communication
//!
//! Line-delimited serial transport between the companion and the jig.
//! Move lists go out as newline-terminated comma-separated integers;
//! replies come back as newline-delimited ASCII records delivered to
//! registered listeners in arrival order.

pub mod framer;
pub mod listener;
pub mod serial;
pub mod transport;

pub use framer::{LineFramer, LINE_DELIMITER, MAX_RECORD_LEN};
pub use listener::{ChannelListener, ListenerHandle, TransportEvent, TransportListener};
pub use serial::{
    list_ports, PortOpener, RealSerialPort, SerialPort, SerialPortInfo, SerialPortOpener,
};
pub use transport::LineTransport;
