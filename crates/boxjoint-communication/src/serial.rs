//! Serial port communication implementation
//!
//! Provides low-level serial port operations for the jig's serial link,
//! either a USB adapter or a Bluetooth SPP (RFCOMM) port.
//!
//! Supports:
//! - Port enumeration and discovery
//! - Opening a port by device name with a baud rate and read timeout
//! - Blocking read/write operations behind the [`SerialPort`] trait

use boxjoint_core::{ConnectionError, Error, Result};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/rfcomm0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "Bluetooth Serial")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }
}

/// List serial ports the jig could be attached to
///
/// Filters ports to:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*, /dev/rfcomm*
/// - macOS: /dev/cu.* except the built-in Bluetooth incoming port
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    match serialport::available_ports() {
        Ok(ports) => {
            let port_infos: Vec<SerialPortInfo> = ports
                .iter()
                .filter(|port| is_valid_jig_port(&port.port_name))
                .map(|port| {
                    let info = SerialPortInfo::new(&port.port_name, get_port_description(port));

                    match &port.port_type {
                        serialport::SerialPortType::UsbPort(usb_info) => {
                            let info = info.with_usb_ids(usb_info.vid, usb_info.pid);
                            match &usb_info.manufacturer {
                                Some(mfg) => info.with_manufacturer(mfg),
                                None => info,
                            }
                        }
                        _ => info,
                    }
                })
                .collect();

            Ok(port_infos)
        }
        Err(e) => {
            tracing::error!("Failed to enumerate serial ports: {}", e);
            Err(Error::other(format!("Failed to enumerate ports: {}", e)))
        }
    }
}

fn is_valid_jig_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    if port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/rfcomm")
    {
        return true;
    }

    port_name.starts_with("/dev/cu.") && port_name != "/dev/cu.Bluetooth-Incoming-Port"
}

fn get_port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Low-level serial port interface
pub trait SerialPort: Send {
    /// Write data to the port
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Read available data from the port.
    ///
    /// Returns `Ok(0)`, or an error of kind `TimedOut`/`WouldBlock`, when
    /// nothing arrived within the port's timeout.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the port name
    fn name(&self) -> String;

    /// Close the port
    fn close(&mut self) -> io::Result<()>;
}

/// Opens ports by device name
///
/// The transport holds one of these so tests can substitute in-memory
/// ports for hardware.
pub trait PortOpener: Send + Sync {
    /// Open the named device
    fn open(&self, device: &str) -> Result<Box<dyn SerialPort>>;
}

/// Real serial port implementation using the serialport crate
pub struct RealSerialPort {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl RealSerialPort {
    /// Open a serial port, 8N1 without flow control
    pub fn open(device: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let builder = serialport::new(device, baud_rate)
            .timeout(timeout)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None);

        match builder.open() {
            Ok(port) => Ok(RealSerialPort {
                port,
                name: device.to_string(),
            }),
            Err(e) => {
                tracing::warn!("Failed to open serial port {}: {}", device, e);
                let err = match e.kind() {
                    serialport::ErrorKind::NoDevice
                    | serialport::ErrorKind::Io(io::ErrorKind::NotFound) => {
                        ConnectionError::DeviceNotFound {
                            name: device.to_string(),
                        }
                    }
                    _ => ConnectionError::PortOpenFailed {
                        port: device.to_string(),
                        reason: e.to_string(),
                    },
                };
                Err(err.into())
            }
        }
    }
}

impl SerialPort for RealSerialPort {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn close(&mut self) -> io::Result<()> {
        // the OS handle is released on drop
        self.port.flush()
    }
}

/// Opens [`RealSerialPort`]s with fixed line settings
#[derive(Debug, Clone)]
pub struct SerialPortOpener {
    /// Baud rate (the jig's Bluetooth module defaults to 9600)
    pub baud_rate: u32,
    /// Read timeout; also bounds how long a send waits on the reader
    pub timeout: Duration,
}

impl Default for SerialPortOpener {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            timeout: Duration::from_millis(10),
        }
    }
}

impl PortOpener for SerialPortOpener {
    fn open(&self, device: &str) -> Result<Box<dyn SerialPort>> {
        let port = RealSerialPort::open(device, self.baud_rate, self.timeout)?;
        Ok(Box::new(port))
    }
}
