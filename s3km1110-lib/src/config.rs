use crate::command::ConfigParam;
use crate::error::RadarError;
use crate::report::GATE_COUNT;

/// Highest distance gate index the chip accepts for the detection range.
pub const GATE_INDEX_MAX: u8 = (GATE_COUNT - 1) as u8;

/// Last-known chip configuration.
///
/// Fields stay `None` until a read or a successful write populates
/// them, so a caller can always tell "never fetched" from a real value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadarConfigParameters {
    /// Closest gate the chip reports targets in, 0..=15.
    pub detection_gates_min: Option<u8>,
    /// Farthest gate the chip reports targets in, 0..=15.
    pub detection_gates_max: Option<u8>,
    /// Frames a target must be present before it counts as detected.
    pub active_frames: Option<u8>,
    /// Frames a target must be absent before it counts as gone.
    pub inactive_frames: Option<u8>,
    /// Target disappearance delay in seconds.
    pub disappearance_delay_s: Option<u16>,
}

impl RadarConfigParameters {
    /// Store a configuration value under the parameter it was requested
    /// for. The wire value is a u32 regardless of the field it lands in;
    /// values are narrowed to the width the chip documents.
    pub(crate) fn apply(&mut self, param: ConfigParam, value: u32) -> Result<(), RadarError> {
        match param {
            ConfigParam::MinDistance => self.detection_gates_min = Some(value as u8),
            ConfigParam::MaxDistance => self.detection_gates_max = Some(value as u8),
            ConfigParam::ActiveFrames => self.active_frames = Some(value as u8),
            ConfigParam::InactiveFrames => self.inactive_frames = Some(value as u8),
            ConfigParam::DisappearanceDelay => self.disappearance_delay_s = Some(value as u16),
            other => {
                return Err(RadarError::Protocol(format!(
                    "no stored field for configuration parameter {other}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration values plus the identity of the most recent
/// configuration read.
///
/// A `ReadConfig` ack does not echo the parameter id, so whatever read
/// was issued last claims the next 4-byte reply. The pending id stays
/// on record until the next read replaces it, which means a late ack
/// from a timed-out read can be attributed to that stale id.
#[derive(Debug, Default)]
pub(crate) struct ConfigStore {
    pub params: RadarConfigParameters,
    pub pending_read: Option<ConfigParam>,
}

impl ConfigStore {
    /// Attribute a 4-byte configuration reply to the pending read.
    pub(crate) fn commit(&mut self, value: u32) -> Result<ConfigParam, RadarError> {
        let param = self.pending_read.ok_or_else(|| {
            RadarError::Protocol("configuration reply with no read outstanding".to_string())
        })?;
        self.params.apply(param, value)?;
        Ok(param)
    }
}
