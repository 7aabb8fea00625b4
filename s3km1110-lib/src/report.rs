use crate::error::RadarError;
use crate::frame::{DATA_FRAME_END, DATA_FRAME_START, Frame, FrameKind};
use std::fmt;
use zerocopy::byteorder::little_endian::{I16, U16};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Number of distance gates the chip reports energy for.
pub const GATE_COUNT: usize = 16;

/// Body length of every telemetry frame: detection flag, distance, and
/// one 16-bit energy per gate.
pub const REPORT_BODY_LEN: usize = 1 + 2 + GATE_COUNT * 2;

/// A full telemetry frame on the wire, markers included.
pub const REPORT_FRAME_LEN: usize =
    DATA_FRAME_START.len() + 2 + REPORT_BODY_LEN + DATA_FRAME_END.len();

/// Telemetry frame body exactly as it appears on the wire.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ReportBodyRaw {
    pub detected: u8,                   // 0x01 when a target is present
    pub distance_cm: I16,               // -1 when unknown
    pub gate_energy: [U16; GATE_COUNT], // gate 0 first
}

/// One decoded telemetry report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub detected: bool,
    /// Distance to the detected target in centimetres, -1 when unknown.
    pub distance_cm: i16,
    /// Reflected energy per distance gate, gate 0 first.
    pub gate_energy: [u16; GATE_COUNT],
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            detected: false,
            distance_cm: -1,
            gate_energy: [0; GATE_COUNT],
        }
    }
}

impl From<&ReportBodyRaw> for SensorReading {
    fn from(raw: &ReportBodyRaw) -> Self {
        Self {
            detected: raw.detected == 0x01,
            distance_cm: raw.distance_cm.get(),
            gate_energy: raw.gate_energy.map(|energy| energy.get()),
        }
    }
}

impl SensorReading {
    /// Decode a completed telemetry frame.
    ///
    /// The declared body length must be exactly the 35-byte report
    /// layout. The chip emits nothing else on the data channel, so any
    /// other length means a corrupt or truncated frame.
    pub fn from_frame(frame: &Frame) -> Result<Self, RadarError> {
        if frame.kind != FrameKind::Data {
            return Err(RadarError::InvalidFrame("not a telemetry frame".to_string()));
        }
        let bytes = frame.bytes.as_ref();
        if bytes.len() < 6 {
            return Err(RadarError::InsufficientData {
                expected: 6,
                actual: bytes.len(),
            });
        }
        let declared = u16::from_le_bytes([bytes[4], bytes[5]]);
        if declared as usize != REPORT_BODY_LEN {
            return Err(RadarError::ReportBodyLength(declared));
        }
        if bytes.len() != REPORT_FRAME_LEN {
            return Err(RadarError::InvalidFrame(format!(
                "telemetry frame must be {} bytes, got {}",
                REPORT_FRAME_LEN,
                bytes.len()
            )));
        }
        let body = &bytes[6..6 + REPORT_BODY_LEN];
        let raw = ReportBodyRaw::ref_from_bytes(body).map_err(|_| {
            RadarError::InvalidFrame("Failed to parse report body: incorrect size".to_string())
        })?;
        Ok(Self::from(raw))
    }

    /// Index of the gate with the strongest return, with its energy.
    pub fn peak_gate(&self) -> (usize, u16) {
        let mut peak = (0, self.gate_energy[0]);
        for (gate, &energy) in self.gate_energy.iter().enumerate() {
            if energy > peak.1 {
                peak = (gate, energy);
            }
        }
        peak
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detected {
            write!(f, "Target at {} cm", self.distance_cm)
        } else {
            write!(f, "No target")
        }
    }
}
