use crate::assembler::ScanAssembler;
use crate::constants::{DECODE_ERROR_STREAK, REJECTION_WINDOW};
use crate::decode::decode;
use crate::error::FrameError;
use crate::numeric::to_string;
use crate::packet::validate;
use crate::sync::FrameSynchronizer;
use ld19_data::Scan;
use log::{debug, warn};

/// Counters describing the health of the byte stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_accepted: u64,
    pub checksum_failures: u64,
    /// Frames with a wrong start marker or packet type.
    pub marker_mismatches: u64,
    pub decode_errors: u64,
    pub sync_losses: u64,
    /// Read stalls that discarded a partially received frame.
    pub stream_gaps: u64,
    pub scans_emitted: u64,
    /// Scans replaced before the consumer picked them up.
    pub scans_dropped: u64,
    /// Rejection-rate and decode-streak warnings logged so far.
    pub health_warnings: u64,
}

impl PipelineStats {
    pub fn frames_rejected(&self) -> u64 {
        self.checksum_failures + self.marker_mismatches + self.decode_errors
    }
}

#[derive(Debug, Default)]
struct RejectionMonitor {
    seen: usize,
    rejected: usize,
    decode_streak: usize,
    warnings: usize,
}

impl RejectionMonitor {
    fn record(&mut self, result: &Result<(), FrameError>) {
        self.seen += 1;
        match result {
            Ok(()) => self.decode_streak = 0,
            Err(e) => {
                self.rejected += 1;
                if !e.is_validation_error() {
                    self.decode_streak += 1;
                    if self.decode_streak == DECODE_ERROR_STREAK {
                        self.warnings += 1;
                        warn!(
                            "{} frames in a row could not be decoded ({}). \
                             The sensor may speak another protocol version.",
                            DECODE_ERROR_STREAK, e
                        );
                    }
                }
            }
        }
        if self.seen == REJECTION_WINDOW {
            if self.rejected * 2 > self.seen {
                self.warnings += 1;
                warn!(
                    "High frame rejection rate: {} of the last {} frames were dropped",
                    self.rejected, self.seen
                );
            }
            self.seen = 0;
            self.rejected = 0;
        }
    }
}

/// Decoding context that turns serial bytes into completed scans.
///
/// Owns the synchronizer buffer and the lap in progress. Frames are handled
/// strictly in the order their bytes arrive.
#[derive(Debug, Default)]
pub struct Pipeline {
    synchronizer: FrameSynchronizer,
    assembler: ScanAssembler,
    stats: PipelineStats,
    monitor: RejectionMonitor,
}

impl Pipeline {
    pub fn new() -> Pipeline {
        Pipeline::default()
    }

    /// Consumes `bytes` and calls `emit` for every lap completed by them.
    pub fn feed<F: FnMut(Scan)>(&mut self, bytes: &[u8], mut emit: F) {
        self.synchronizer.push(bytes);
        while let Some(candidate) = self.synchronizer.candidate() {
            let frame = match validate(&candidate) {
                Ok(frame) => frame,
                Err(e) => {
                    debug!("Rejected frame [{} ..]: {}", to_string(&candidate[..4]), e);
                    // markers inside an already rejected frame are not counted again
                    let repeated = self.synchronizer.inside_rejected();
                    self.synchronizer.reject();
                    if !repeated {
                        self.record(Err(e));
                    }
                    continue;
                }
            };
            // A checksum-valid frame is consumed whole even if it cannot be decoded
            self.synchronizer.accept();
            match decode(&frame) {
                Ok(decoded) => {
                    self.record(Ok(()));
                    let stats = &mut self.stats;
                    self.assembler.push(decoded, |scan| {
                        stats.scans_emitted += 1;
                        emit(scan)
                    });
                }
                Err(e) => {
                    debug!("Dropped frame: {}", e);
                    self.record(Err(e));
                }
            }
        }
        self.stats.sync_losses = self.synchronizer.sync_losses();
    }

    /// The byte stream stalled. A partially received frame is dropped.
    pub fn stream_gap(&mut self) {
        let n = self.synchronizer.reset();
        if n > 0 {
            debug!("Discarded {} bytes of an incomplete frame", n);
            self.stats.stream_gaps += 1;
        }
    }

    pub fn note_scan_dropped(&mut self) {
        self.stats.scans_dropped += 1;
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// The lap being assembled.
    pub fn partial_scan(&self) -> &Scan {
        self.assembler.partial()
    }

    fn record(&mut self, result: Result<(), FrameError>) {
        match &result {
            Ok(()) => self.stats.frames_accepted += 1,
            Err(FrameError::ChecksumMismatch { .. }) => self.stats.checksum_failures += 1,
            Err(FrameError::UnexpectedPointCount { .. } | FrameError::AngleOutOfRange(_)) => {
                self.stats.decode_errors += 1
            }
            Err(_) => self.stats.marker_mismatches += 1,
        }
        if result.is_err() {
            self.assembler.note_rejected();
        }
        self.monitor.record(&result);
        self.stats.health_warnings = self.monitor.warnings as u64;
    }
}
