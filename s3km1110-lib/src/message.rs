use crate::command::CommandAck;
use crate::error::RadarError;
use crate::frame::{Frame, FrameKind};
use crate::report::SensorReading;

/// A fully decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RadarMessage {
    /// Telemetry from the chip's reporting stream.
    Report(SensorReading),
    /// Reply to a previously sent command.
    Ack(CommandAck),
}

impl TryFrom<Frame> for RadarMessage {
    type Error = RadarError;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        match frame.kind {
            FrameKind::Data => SensorReading::from_frame(&frame).map(RadarMessage::Report),
            FrameKind::Command => CommandAck::from_frame(&frame).map(RadarMessage::Ack),
        }
    }
}
