use bytes::Bytes;

/// Start marker of a telemetry frame.
pub const DATA_FRAME_START: [u8; 4] = [0xF4, 0xF3, 0xF2, 0xF1];
/// End marker of a telemetry frame.
pub const DATA_FRAME_END: [u8; 4] = [0xF8, 0xF7, 0xF6, 0xF5];
/// Start marker of a command/ack frame.
pub const COMMAND_FRAME_START: [u8; 4] = [0xFD, 0xFC, 0xFB, 0xFA];
/// End marker of a command/ack frame.
pub const COMMAND_FRAME_END: [u8; 4] = [0x04, 0x03, 0x02, 0x01];

/// Largest frame the chip emits: a full telemetry frame
/// (4 start + 2 length + 35 body + 4 end).
pub const MAX_FRAME_LEN: usize = 45;

/// Both markers and the length field must fit before the trailer check
/// is meaningful.
const MIN_COMPLETE_LEN: usize = 8;

/// Which marker pair a frame is delimited by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Telemetry stream, `F4 F3 F2 F1 .. F8 F7 F6 F5`.
    Data,
    /// Command ack, `FD FC FB FA .. 04 03 02 01`.
    Command,
}

/// A completed, marker-delimited frame as pulled off the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: FrameKind,
    /// The whole frame, markers included.
    pub bytes: Bytes,
}

/// Outcome of feeding one byte to the receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameResult {
    /// Byte consumed, or discarded while idle. No frame yet.
    Incomplete,
    /// A full frame was assembled and the receiver is idle again.
    Ready(Frame),
    /// The in-flight frame outgrew the buffer and was abandoned. The
    /// overflowing byte is dropped with it.
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiverState {
    Idle,
    Collecting(FrameKind),
}

/// Byte-at-a-time frame assembler.
///
/// While idle, every byte that does not open one of the two marker
/// sequences is discarded. That is also how the receiver resynchronizes
/// after garbage or an abandoned frame: it simply waits for the next
/// plausible start byte.
#[derive(Debug)]
pub struct FrameReceiver {
    state: ReceiverState,
    buf: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl FrameReceiver {
    pub fn new() -> Self {
        Self {
            state: ReceiverState::Idle,
            buf: [0; MAX_FRAME_LEN],
            len: 0,
        }
    }

    /// Consume one byte from the wire.
    pub fn feed(&mut self, byte: u8) -> FrameResult {
        match self.state {
            ReceiverState::Idle => {
                let kind = if byte == DATA_FRAME_START[0] {
                    FrameKind::Data
                } else if byte == COMMAND_FRAME_START[0] {
                    FrameKind::Command
                } else {
                    return FrameResult::Incomplete;
                };
                self.buf[0] = byte;
                self.len = 1;
                self.state = ReceiverState::Collecting(kind);
                FrameResult::Incomplete
            }
            ReceiverState::Collecting(kind) => {
                if self.len >= MAX_FRAME_LEN {
                    self.reset();
                    return FrameResult::Overflow;
                }
                self.buf[self.len] = byte;
                self.len += 1;
                if self.len >= MIN_COMPLETE_LEN && self.is_complete(kind) {
                    let frame = Frame {
                        kind,
                        bytes: Bytes::copy_from_slice(&self.buf[..self.len]),
                    };
                    self.reset();
                    return FrameResult::Ready(frame);
                }
                FrameResult::Incomplete
            }
        }
    }

    /// Drop any partial frame and return to idle.
    pub fn reset(&mut self) {
        self.state = ReceiverState::Idle;
        self.len = 0;
    }

    fn is_complete(&self, kind: FrameKind) -> bool {
        let (start, end) = match kind {
            FrameKind::Data => (&DATA_FRAME_START, &DATA_FRAME_END),
            FrameKind::Command => (&COMMAND_FRAME_START, &COMMAND_FRAME_END),
        };
        self.buf[..4] == start[..] && self.buf[self.len - 4..self.len] == end[..]
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}
