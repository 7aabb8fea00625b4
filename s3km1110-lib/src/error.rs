use crate::command::Opcode;
use std::time::Duration;
use thiserror::Error;

/// The primary error type for radar operations.
#[derive(Error, Debug)]
pub enum RadarError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No ack for {opcode:?} within {timeout:?}")]
    AckTimeout { opcode: Opcode, timeout: Duration },

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Unexpected report body length {0}")]
    ReportBodyLength(u16),

    #[error("Insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("No decode path for opcode {0:?}")]
    UnsupportedOpcode(Opcode),

    #[error("Protocol error: {0}")]
    Protocol(String),
}
