use crate::error::RadarError;
use crate::frame::{COMMAND_FRAME_END, COMMAND_FRAME_START, Frame, FrameKind};
use bytes::{Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

/// Command words understood by the chip. The word travels as a 16-bit
/// little-endian field whose high byte is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    ReadFirmwareVersion = 0x00,
    WriteRegister = 0x01,
    ReadRegister = 0x02,
    SetConfig = 0x07,
    ReadConfig = 0x08,
    AutoThresholdGen = 0x09,
    ReadSerialNumber = 0x11,
    SetMode = 0x12,
    ReadMode = 0x13,
    EnterFactoryTestMode = 0x24,
    ExitFactoryTestMode = 0x25,
    SendFactoryTestResult = 0x26,
    CloseCommandMode = 0xFE,
    OpenCommandMode = 0xFF,
    #[num_enum(catch_all)]
    Unknown(u8) = 0x03,
}

/// Configuration parameter ids shared by `ReadConfig` and `SetConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive)]
#[repr(u16)]
pub enum ConfigParam {
    MinDistance = 0x00,
    MaxDistance = 0x01,
    ActiveFrames = 0x02,
    InactiveFrames = 0x03,
    DisappearanceDelay = 0x04,
    PowerSupplyAlarm = 0x05,
}

/// Operating modes selectable through `SetMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive)]
#[repr(u32)]
pub enum RadarMode {
    #[strum(to_string = "debug")]
    Debug = 0x00,
    #[strum(to_string = "report")]
    Report = 0x04,
    #[strum(to_string = "running")]
    Running = 0x64,
}

/// `OpenCommandMode` carries this fixed payload.
pub const OPEN_COMMAND_MODE_PAYLOAD: [u8; 2] = [0x01, 0x00];

const COMMAND_WORD_LEN: usize = 2;

// Field offsets inside a completed command frame.
const OPCODE_OFFSET: usize = 6;
const STATUS_OFFSET: usize = 8;
const PAYLOAD_OFFSET: usize = 10;
// Firmware and serial-number acks insert a 2-byte payload length here.
const SIZED_PAYLOAD_OFFSET: usize = 12;
// Start, length, command word, status, end.
const MIN_ACK_LEN: usize = 14;

/// Serialize one outgoing command frame.
///
/// `sub_command` and `payload` are already little-endian serialized;
/// their widths vary per command and both may be empty.
pub fn encode_command(opcode: Opcode, sub_command: &[u8], payload: &[u8]) -> Bytes {
    let body_len = (COMMAND_WORD_LEN + sub_command.len() + payload.len()) as u16;
    let mut frame = BytesMut::with_capacity(10 + body_len as usize);
    frame.extend_from_slice(&COMMAND_FRAME_START);
    frame.extend_from_slice(&body_len.to_le_bytes());
    frame.extend_from_slice(&(u8::from(opcode) as u16).to_le_bytes());
    frame.extend_from_slice(sub_command);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&COMMAND_FRAME_END);
    frame.freeze()
}

/// A decoded command ack.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandAck {
    pub opcode: Opcode,
    /// Zero means the chip accepted the command.
    pub status: u16,
    pub payload: Bytes,
}

impl CommandAck {
    /// Pull opcode, status and payload out of a completed command frame.
    ///
    /// Firmware and serial-number acks carry an extra 2-byte length
    /// sub-field ahead of their payload; every other ack's payload
    /// starts right after the status word.
    pub fn from_frame(frame: &Frame) -> Result<Self, RadarError> {
        if frame.kind != FrameKind::Command {
            return Err(RadarError::InvalidFrame("not a command frame".to_string()));
        }
        let bytes = frame.bytes.as_ref();
        if bytes.len() < MIN_ACK_LEN {
            return Err(RadarError::InsufficientData {
                expected: MIN_ACK_LEN,
                actual: bytes.len(),
            });
        }
        let opcode = Opcode::from_primitive(bytes[OPCODE_OFFSET]);
        let status = u16::from_le_bytes([bytes[STATUS_OFFSET], bytes[STATUS_OFFSET + 1]]);
        let payload_start = match opcode {
            Opcode::ReadFirmwareVersion | Opcode::ReadSerialNumber => SIZED_PAYLOAD_OFFSET,
            _ => PAYLOAD_OFFSET,
        };
        let payload_end = bytes.len() - COMMAND_FRAME_END.len();
        let payload = if payload_start < payload_end {
            frame.bytes.slice(payload_start..payload_end)
        } else {
            Bytes::new()
        };
        Ok(Self {
            opcode,
            status,
            payload,
        })
    }

    /// Whether the chip accepted the command.
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Firmware and serial-number payloads are ASCII text. An empty
    /// payload means the chip did not answer the query and the ack
    /// cannot satisfy the read.
    pub fn payload_text(&self) -> Result<String, RadarError> {
        if self.payload.is_empty() {
            return Err(RadarError::InvalidFrame(format!(
                "empty {:?} payload",
                self.opcode
            )));
        }
        let end = self
            .payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.payload.len());
        Ok(String::from_utf8_lossy(&self.payload[..end]).to_string())
    }

    /// Configuration replies are exactly one little-endian u32.
    pub fn config_value(&self) -> Result<u32, RadarError> {
        if self.payload.len() != 4 {
            return Err(RadarError::InvalidFrame(format!(
                "config payload must be 4 bytes, got {}",
                self.payload.len()
            )));
        }
        Ok(u32::from_le_bytes([
            self.payload[0],
            self.payload[1],
            self.payload[2],
            self.payload[3],
        ]))
    }
}
