use crate::error::RadarError;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

/// Baud rate the chip ships with.
pub const DEFAULT_BAUD: u32 = 115_200;

// Short enough that the ack deadline gets checked between reads.
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Byte-oriented duplex channel to the chip.
///
/// `read` must not block past its poll window; the driver's ack loop
/// relies on regularly getting control back to check its deadline.
pub trait Transport: Send {
    /// Read into `buffer`, returning the byte count. Zero means
    /// nothing arrived within the poll window.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RadarError>;

    /// Write `data` to the chip, returning the byte count.
    fn write(&mut self, data: &[u8]) -> Result<usize, RadarError>;

    /// Block until every pending write has left the channel.
    fn flush(&mut self) -> Result<(), RadarError>;

    /// Number of bytes that can be read without waiting.
    fn available(&mut self) -> Result<usize, RadarError>;
}

/// A [`Transport`] over a UART serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `path` (e.g. "/dev/ttyUSB0") in the 8N1 framing the chip
    /// uses, at the given baud rate.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, RadarError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(POLL_TIMEOUT)
            .open()?;

        info!("Opened serial port {} at {} baud", path, baud_rate);

        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RadarError> {
        match self.port.read(buffer) {
            Ok(count) => Ok(count),
            // An empty poll window is not an error, just no bytes yet.
            Err(err) if err.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, RadarError> {
        Ok(self.port.write(data)?)
    }

    fn flush(&mut self) -> Result<(), RadarError> {
        self.port.flush()?;
        Ok(())
    }

    fn available(&mut self) -> Result<usize, RadarError> {
        Ok(self.port.bytes_to_read()? as usize)
    }
}

/// In-memory [`Transport`] for tests.
///
/// Bytes queued with [`inject_read`](Self::inject_read) come back out
/// of `read`; everything the driver writes accumulates for inspection
/// via [`written`](Self::written). Clones share both buffers, so a test
/// can keep a handle after moving the transport into the driver.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockChannel>>,
}

#[derive(Default)]
struct MockChannel {
    incoming: VecDeque<u8>,
    outgoing: Vec<u8>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the driver to read.
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().unwrap().incoming.extend(data);
    }

    /// Everything the driver has written so far.
    pub fn written(&self) -> Vec<u8> {
        self.inner.lock().unwrap().outgoing.clone()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RadarError> {
        let mut channel = self.inner.lock().unwrap();
        let mut count = 0;
        while count < buffer.len() {
            match channel.incoming.pop_front() {
                Some(byte) => {
                    buffer[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, RadarError> {
        self.inner.lock().unwrap().outgoing.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), RadarError> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize, RadarError> {
        Ok(self.inner.lock().unwrap().incoming.len())
    }
}
