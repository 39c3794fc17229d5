use crate::constants::{FRAME_LENGTH, START_MARKER, SYNC_WINDOW};
use log::debug;
use std::collections::VecDeque;

/// Locates frame boundaries in the raw byte stream.
///
/// The synchronizer looks for a start marker only between frames. Once a
/// marker is found, the following bytes are taken as a frame no matter
/// what they contain, until the caller accepts or rejects the candidate.
#[derive(Debug, Default)]
pub struct FrameSynchronizer {
    buffer: VecDeque<u8>,
    skipped: usize,
    sync_losses: u64,
    /// Bytes of the last counted rejected candidate still in the buffer.
    rejected_span: usize,
}

impl FrameSynchronizer {
    pub fn new() -> FrameSynchronizer {
        FrameSynchronizer::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Returns the next candidate frame, or `None` if more bytes are needed.
    ///
    /// The candidate stays buffered until [`accept`](Self::accept) or
    /// [`reject`](Self::reject) is called.
    pub fn candidate(&mut self) -> Option<[u8; FRAME_LENGTH]> {
        match self.buffer.iter().position(|&b| b == START_MARKER) {
            Some(start_index) => self.discard(start_index),
            None => {
                self.discard(self.buffer.len());
                return None;
            }
        }
        if self.buffer.len() < FRAME_LENGTH {
            // insufficient buffer size to extract a frame
            return None;
        }
        let mut frame = [0u8; FRAME_LENGTH];
        frame
            .iter_mut()
            .zip(self.buffer.iter())
            .for_each(|(dst, src)| *dst = *src);
        Some(frame)
    }

    /// Consumes the current candidate as a whole.
    pub fn accept(&mut self) {
        let n = FRAME_LENGTH.min(self.buffer.len());
        self.buffer.drain(..n);
        self.skipped = 0;
        self.rejected_span = 0;
    }

    /// Drops only the start marker of the current candidate, so the search
    /// resumes at the byte right after it.
    pub fn reject(&mut self) {
        let inside = self.inside_rejected();
        self.discard(1.min(self.buffer.len()));
        if !inside {
            self.rejected_span = FRAME_LENGTH - 1;
        }
    }

    /// Whether the current candidate starts within the bytes of an earlier
    /// rejected candidate, i.e. its marker is most likely payload of that frame.
    pub fn inside_rejected(&self) -> bool {
        self.rejected_span > 0
    }

    /// Forgets all buffered bytes. Returns how many were discarded.
    pub fn reset(&mut self) -> usize {
        let n = self.buffer.len();
        self.buffer.clear();
        self.skipped = 0;
        self.rejected_span = 0;
        n
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of times a whole sync window passed without a usable frame.
    pub fn sync_losses(&self) -> u64 {
        self.sync_losses
    }

    fn discard(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.buffer.drain(..n);
        self.rejected_span = self.rejected_span.saturating_sub(n);
        self.skipped += n;
        while self.skipped >= SYNC_WINDOW {
            self.skipped -= SYNC_WINDOW;
            self.sync_losses += 1;
            debug!("No frame found in the last {} bytes", SYNC_WINDOW);
        }
    }
}
