use std::io;
use thiserror::Error;

/// Failures that stop the driver. These are surfaced to the caller.
#[derive(Debug, Error)]
pub enum Ld19Error {
    #[error("Failed to open \"{port}\". Error: {source}")]
    Connection {
        port: String,
        #[source]
        source: serialport::Error,
    },
    #[error("Serial device disconnected: {0}")]
    Disconnected(#[source] io::Error),
    #[error("Serial device reached the end of its stream")]
    EndOfStream,
    #[error("A driver thread panicked")]
    ThreadPanicked,
}

/// Reasons a single frame is dropped. Recovered locally by resynchronizing.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame must be always {expected} bytes. Actually {actual} bytes.")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Frame must start with 0x54. Observed = {0:#04X}.")]
    InvalidStartMarker(u8),
    #[error("Unexpected packet type in VerLen byte {0:#04X}.")]
    MarkerMismatch(u8),
    #[error("Checksum mismatched. Calculated = {calculated:02X}, expected = {expected:02X}.")]
    ChecksumMismatch { expected: u8, calculated: u8 },
    #[error("Expected {expected} points per frame but the frame declares {actual}.")]
    UnexpectedPointCount { expected: usize, actual: usize },
    #[error("Angle {0} is out of range. Angles are given in 0.01 degree below 36000.")]
    AngleOutOfRange(u16),
}

impl FrameError {
    /// Whether the frame failed structural validation rather than decoding.
    pub fn is_validation_error(&self) -> bool {
        !matches!(
            self,
            FrameError::UnexpectedPointCount { .. } | FrameError::AngleOutOfRange(_)
        )
    }
}
