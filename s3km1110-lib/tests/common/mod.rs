//! Shared fixtures for driver-level tests

// Allow dead code since this module is shared across multiple test
// files and not every helper is used in every file
#[allow(unused_imports)]
pub use s3km1110_lib::S3KM1110;
#[allow(unused_imports)]
pub use s3km1110_lib::clock::MockClock;
#[allow(unused_imports)]
pub use s3km1110_lib::transport::MockTransport;

/// Telemetry frame carrying the given detection state, with every gate
/// at the same energy.
#[allow(dead_code)]
pub fn report_frame(detected: bool, distance_cm: i16, energy: u16) -> Vec<u8> {
    let mut frame = vec![0xF4, 0xF3, 0xF2, 0xF1];
    frame.extend_from_slice(&35u16.to_le_bytes());
    frame.push(if detected { 0x01 } else { 0x00 });
    frame.extend_from_slice(&distance_cm.to_le_bytes());
    for _ in 0..16 {
        frame.extend_from_slice(&energy.to_le_bytes());
    }
    frame.extend_from_slice(&[0xF8, 0xF7, 0xF6, 0xF5]);
    frame
}

/// Ack frame with the payload right after the status word.
#[allow(dead_code)]
pub fn ack_frame(opcode: u8, status: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xFD, 0xFC, 0xFB, 0xFA];
    frame.extend_from_slice(&((4 + payload.len()) as u16).to_le_bytes());
    frame.extend_from_slice(&[opcode, 0x01]);
    frame.extend_from_slice(&status.to_le_bytes());
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&[0x04, 0x03, 0x02, 0x01]);
    frame
}

/// Firmware/serial-number ack, which carries a 2-byte payload length
/// ahead of the ASCII text.
#[allow(dead_code)]
pub fn sized_ack_frame(opcode: u8, text: &str) -> Vec<u8> {
    let mut frame = vec![0xFD, 0xFC, 0xFB, 0xFA];
    frame.extend_from_slice(&((6 + text.len()) as u16).to_le_bytes());
    frame.extend_from_slice(&[opcode, 0x01]);
    frame.extend_from_slice(&0u16.to_le_bytes());
    frame.extend_from_slice(&(text.len() as u16).to_le_bytes());
    frame.extend_from_slice(text.as_bytes());
    frame.extend_from_slice(&[0x04, 0x03, 0x02, 0x01]);
    frame
}

/// Driver wired to mock transport and clock, with handles the test
/// keeps for injecting bytes and advancing time.
#[allow(dead_code)]
pub fn mock_radar() -> (S3KM1110<MockTransport, MockClock>, MockTransport, MockClock) {
    let transport = MockTransport::new();
    let clock = MockClock::new();
    let radar = S3KM1110::with_clock(transport.clone(), clock.clone());
    (radar, transport, clock)
}
