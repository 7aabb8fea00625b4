use crate::clock::{Clock, SystemClock};
use crate::command::{
    CommandAck, ConfigParam, OPEN_COMMAND_MODE_PAYLOAD, Opcode, RadarMode, encode_command,
};
use crate::config::{ConfigStore, GATE_INDEX_MAX, RadarConfigParameters};
use crate::error::RadarError;
use crate::frame::{FrameReceiver, FrameResult, MAX_FRAME_LEN};
use crate::message::RadarMessage;
use crate::report::SensorReading;
use crate::transport::Transport;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long to wait for the chip to ack a command.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(100);
/// Pause the chip needs before each command write.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Driver tunables. The defaults match the chip's documented timings.
#[derive(Debug, Clone, Copy)]
pub struct RadarOptions {
    pub ack_timeout: Duration,
    pub settle_delay: Duration,
    /// Fetch the full configuration as part of [`S3KM1110::begin`].
    pub read_config_on_begin: bool,
}

impl Default for RadarOptions {
    fn default() -> Self {
        Self {
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            read_config_on_begin: true,
        }
    }
}

/// High-level interface to the S3KM1110 radar.
///
/// Commands run as one transaction at a time: open command mode, send,
/// poll for the ack, close command mode. The protocol carries no
/// correlation id, so an ack that arrives after its transaction timed
/// out is indistinguishable from the answer to the next command with
/// the same opcode. Nothing here guards against that.
pub struct S3KM1110<T, C = SystemClock> {
    transport: T,
    clock: C,
    options: RadarOptions,
    receiver: FrameReceiver,
    store: ConfigStore,
    reading: SensorReading,
    firmware_version: Option<String>,
    serial_number: Option<String>,
    last_report_at: Option<Instant>,
}

impl<T: Transport> S3KM1110<T> {
    pub fn new(transport: T) -> Self {
        Self::with_clock(transport, SystemClock)
    }
}

impl<T: Transport, C: Clock> S3KM1110<T, C> {
    pub fn with_clock(transport: T, clock: C) -> Self {
        Self::with_options(transport, clock, RadarOptions::default())
    }

    pub fn with_options(transport: T, clock: C, options: RadarOptions) -> Self {
        Self {
            transport,
            clock,
            options,
            receiver: FrameReceiver::new(),
            store: ConfigStore::default(),
            reading: SensorReading::default(),
            firmware_version: None,
            serial_number: None,
            last_report_at: None,
        }
    }

    /// Switch the chip into report mode and prefetch its configuration.
    ///
    /// Activation failure fails `begin`. A failed configuration
    /// prefetch is logged and tolerated; those fields simply stay
    /// `None` until read again.
    pub fn begin(&mut self) -> Result<(), RadarError> {
        self.set_mode(RadarMode::Report)?;
        if self.options.read_config_on_begin {
            if let Err(err) = self.read_all_radar_configs() {
                warn!(%err, "initial configuration read failed");
            }
        }
        Ok(())
    }

    /// Drain whatever bytes the channel holds right now.
    ///
    /// Telemetry frames are committed as they complete; the freshest
    /// reading of this drain is returned, `None` when no telemetry
    /// frame completed. Acks arriving outside a transaction are
    /// dropped.
    pub fn read(&mut self) -> Result<Option<SensorReading>, RadarError> {
        let mut fresh = None;
        let mut chunk = [0u8; 64];
        loop {
            if self.transport.available()? == 0 {
                break;
            }
            let count = self.transport.read(&mut chunk)?;
            if count == 0 {
                break;
            }
            for &byte in &chunk[..count] {
                match self.pump(byte) {
                    Some(RadarMessage::Report(reading)) => fresh = Some(reading),
                    Some(RadarMessage::Ack(ack)) => {
                        debug!(opcode = ?ack.opcode, "ignoring ack outside a transaction");
                    }
                    None => {}
                }
            }
        }
        Ok(fresh)
    }

    /// Whether the chip is talking to us.
    ///
    /// True when a telemetry frame was committed recently enough;
    /// otherwise one passive drain decides.
    pub fn is_connected(&mut self) -> Result<bool, RadarError> {
        if let Some(at) = self.last_report_at {
            if self.clock.now().duration_since(at) < self.options.ack_timeout {
                return Ok(true);
            }
        }
        Ok(self.read()?.is_some())
    }

    /// Select the chip's operating mode.
    pub fn set_mode(&mut self, mode: RadarMode) -> Result<(), RadarError> {
        debug!(%mode, "switching radar mode");
        let mode_word: u32 = mode.into();
        self.transact(Opcode::SetMode, &0u16.to_le_bytes(), &mode_word.to_le_bytes())
    }

    /// Ask the chip for its firmware version string.
    pub fn read_firmware_version(&mut self) -> Result<String, RadarError> {
        self.transact(Opcode::ReadFirmwareVersion, &[], &[])?;
        self.firmware_version.clone().ok_or_else(|| {
            RadarError::Protocol("firmware version missing after successful read".to_string())
        })
    }

    /// Ask the chip for its serial number string.
    pub fn read_serial_number(&mut self) -> Result<String, RadarError> {
        self.transact(Opcode::ReadSerialNumber, &[], &[])?;
        self.serial_number.clone().ok_or_else(|| {
            RadarError::Protocol("serial number missing after successful read".to_string())
        })
    }

    /// Fetch one configuration parameter into the local store.
    ///
    /// The reply does not echo the parameter id, so the id is recorded
    /// before the command goes out and the next 4-byte reply is
    /// attributed to it.
    pub fn read_config(&mut self, param: ConfigParam) -> Result<(), RadarError> {
        self.store.pending_read = Some(param);
        let id: u16 = param.into();
        self.transact(Opcode::ReadConfig, &[], &id.to_le_bytes())
    }

    /// Fetch every stored configuration parameter, stopping at the
    /// first failure. Parameters read before the failure keep their
    /// fresh values.
    pub fn read_all_radar_configs(&mut self) -> Result<(), RadarError> {
        self.read_config(ConfigParam::MinDistance)?;
        self.read_config(ConfigParam::MaxDistance)?;
        self.read_config(ConfigParam::ActiveFrames)?;
        self.read_config(ConfigParam::InactiveFrames)?;
        self.read_config(ConfigParam::DisappearanceDelay)?;
        Ok(())
    }

    /// Set the closest gate targets are reported in. Values above 15
    /// are clamped.
    pub fn set_minimum_gates(&mut self, gates: u8) -> Result<(), RadarError> {
        let gates = gates.min(GATE_INDEX_MAX);
        self.set_config(ConfigParam::MinDistance, gates as u32)?;
        self.store.params.detection_gates_min = Some(gates);
        Ok(())
    }

    /// Set the farthest gate targets are reported in. Values above 15
    /// are clamped.
    pub fn set_maximum_gates(&mut self, gates: u8) -> Result<(), RadarError> {
        let gates = gates.min(GATE_INDEX_MAX);
        self.set_config(ConfigParam::MaxDistance, gates as u32)?;
        self.store.params.detection_gates_max = Some(gates);
        Ok(())
    }

    /// Frames a target must be present before it counts as detected.
    pub fn set_active_frames(&mut self, frames: u8) -> Result<(), RadarError> {
        self.set_config(ConfigParam::ActiveFrames, frames as u32)?;
        self.store.params.active_frames = Some(frames);
        Ok(())
    }

    /// Frames a target must be absent before it counts as gone.
    pub fn set_inactive_frames(&mut self, frames: u8) -> Result<(), RadarError> {
        self.set_config(ConfigParam::InactiveFrames, frames as u32)?;
        self.store.params.inactive_frames = Some(frames);
        Ok(())
    }

    /// Target disappearance delay in seconds.
    pub fn set_disappearance_delay(&mut self, seconds: u16) -> Result<(), RadarError> {
        self.set_config(ConfigParam::DisappearanceDelay, seconds as u32)?;
        self.store.params.disappearance_delay_s = Some(seconds);
        Ok(())
    }

    /// The most recent telemetry report.
    pub fn last_reading(&self) -> SensorReading {
        self.reading
    }

    /// Firmware version, if one has been read.
    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    /// Serial number, if one has been read.
    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    /// Last-known configuration parameters.
    pub fn configuration(&self) -> RadarConfigParameters {
        self.store.params
    }

    fn set_config(&mut self, param: ConfigParam, value: u32) -> Result<(), RadarError> {
        let id: u16 = param.into();
        self.transact(Opcode::SetConfig, &id.to_le_bytes(), &value.to_le_bytes())
    }

    /// Run one bracketed command transaction: open command mode, send
    /// the command, close command mode. Close is best-effort in every
    /// path; the command's own outcome stands.
    fn transact(
        &mut self,
        opcode: Opcode,
        sub_command: &[u8],
        payload: &[u8],
    ) -> Result<(), RadarError> {
        let mut result =
            self.send_and_await(Opcode::OpenCommandMode, &[], &OPEN_COMMAND_MODE_PAYLOAD);
        if result.is_ok() {
            result = self.send_and_await(opcode, sub_command, payload);
        }
        if let Err(err) = self.send_and_await(Opcode::CloseCommandMode, &[], &[]) {
            debug!(%err, "close command mode failed");
        }
        result
    }

    /// Pause for the settle delay, write one command frame, then poll
    /// for its ack.
    fn send_and_await(
        &mut self,
        opcode: Opcode,
        sub_command: &[u8],
        payload: &[u8],
    ) -> Result<(), RadarError> {
        self.clock.sleep(self.options.settle_delay);
        let frame = encode_command(opcode, sub_command, payload);
        debug!(bytes = hex::encode(&frame), "Serial Write");
        self.transport.write(&frame)?;
        self.transport.flush()?;
        self.await_ack(opcode)
    }

    /// Poll the channel until a satisfying ack arrives or the deadline
    /// passes. Telemetry keeps flowing during the wait and is committed
    /// as usual.
    ///
    /// Reads go one byte at a time: the ack ends the wait mid-stream,
    /// and anything queued behind it must stay on the channel.
    fn await_ack(&mut self, expected: Opcode) -> Result<(), RadarError> {
        let deadline = self.clock.now() + self.options.ack_timeout;
        let mut byte = [0u8; 1];
        loop {
            if self.transport.read(&mut byte)? == 1 {
                if let Some(RadarMessage::Ack(ack)) = self.pump(byte[0]) {
                    if self.accept_ack(expected, ack) {
                        return Ok(());
                    }
                }
            }
            if self.clock.now() >= deadline {
                return Err(RadarError::AckTimeout {
                    opcode: expected,
                    timeout: self.options.ack_timeout,
                });
            }
        }
    }

    /// An ack satisfies the wait only when it matches the awaited
    /// opcode, reports success, and its payload commits cleanly.
    /// Anything else is dropped; the chip may still answer within the
    /// window.
    fn accept_ack(&mut self, expected: Opcode, ack: CommandAck) -> bool {
        if ack.opcode != expected {
            warn!(got = ?ack.opcode, want = ?expected, "ignoring ack for a different command");
            return false;
        }
        if !ack.success() {
            warn!(opcode = ?ack.opcode, status = ack.status, "chip rejected command");
            return false;
        }
        match self.commit_ack(&ack) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, opcode = ?ack.opcode, "ack payload did not commit");
                false
            }
        }
    }

    /// Per-opcode payload interpretation. Mode and bracket acks carry
    /// nothing to store.
    fn commit_ack(&mut self, ack: &CommandAck) -> Result<(), RadarError> {
        match ack.opcode {
            Opcode::OpenCommandMode
            | Opcode::CloseCommandMode
            | Opcode::SetMode
            | Opcode::SetConfig => Ok(()),
            Opcode::ReadFirmwareVersion => {
                self.firmware_version = Some(ack.payload_text()?);
                Ok(())
            }
            Opcode::ReadSerialNumber => {
                self.serial_number = Some(ack.payload_text()?);
                Ok(())
            }
            Opcode::ReadConfig => {
                let value = ack.config_value()?;
                let param = self.store.commit(value)?;
                debug!(%param, value, "configuration parameter updated");
                Ok(())
            }
            other => Err(RadarError::UnsupportedOpcode(other)),
        }
    }

    /// Feed one byte through the frame receiver. Telemetry is committed
    /// on the spot; completed acks are handed back to whoever is
    /// waiting for them.
    fn pump(&mut self, byte: u8) -> Option<RadarMessage> {
        match self.receiver.feed(byte) {
            FrameResult::Incomplete => None,
            FrameResult::Overflow => {
                warn!("frame exceeded {MAX_FRAME_LEN} bytes, resynchronizing");
                None
            }
            FrameResult::Ready(frame) => match RadarMessage::try_from(frame) {
                Ok(RadarMessage::Report(reading)) => {
                    self.commit_reading(reading);
                    Some(RadarMessage::Report(reading))
                }
                Ok(message) => Some(message),
                Err(err) => {
                    warn!(%err, "dropping undecodable frame");
                    None
                }
            },
        }
    }

    fn commit_reading(&mut self, reading: SensorReading) {
        self.reading = reading;
        self.last_report_at = Some(self.clock.now());
    }
}
