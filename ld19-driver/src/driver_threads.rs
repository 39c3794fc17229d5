use crate::constants::READ_BUFFER_SIZE;
use crate::error::Ld19Error;
use crate::pipeline::{Pipeline, PipelineStats};
use crate::serial::{read_chunk, ReadOutcome};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use crossbeam_utils::atomic::AtomicCell;
use ld19_data::Scan;
use log::{debug, error, info};
use std::io::Read;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Unit of work passed from the reader to the parser, in wire order.
pub(crate) enum SerialChunk {
    Bytes(Vec<u8>),
    /// The line stalled after some bytes were received.
    Gap,
}

/// Struct that contains driver threads.
///
/// Dropping it stops the driver. Use [`join`](DriverThreads::join) to also
/// learn why the reader stopped.
pub struct DriverThreads {
    pub(crate) reader_terminator_tx: Sender<bool>,
    pub(crate) reader_thread: Option<JoinHandle<Result<(), Ld19Error>>>,
    pub(crate) parser_thread: Option<JoinHandle<()>>,
    pub(crate) stats: Arc<AtomicCell<PipelineStats>>,
}

impl DriverThreads {
    /// Latest counters published by the parser thread.
    pub fn stats(&self) -> PipelineStats {
        self.stats.load()
    }

    /// Stops both threads and returns the error that ended the reader, if any.
    pub fn join(mut self) -> Result<(), Ld19Error> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), Ld19Error> {
        // The reader may already be gone
        let _ = self.reader_terminator_tx.try_send(true);

        let mut result = Ok(());
        if let Some(thread) = self.reader_thread.take() {
            result = thread.join().unwrap_or(Err(Ld19Error::ThreadPanicked));
        }
        if let Some(thread) = self.parser_thread.take() {
            if thread.join().is_err() && result.is_ok() {
                result = Err(Ld19Error::ThreadPanicked);
            }
        }
        result
    }
}

impl Drop for DriverThreads {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("{e}");
        }
    }
}

pub(crate) fn read_device_signal<R: Read + ?Sized>(
    source: &mut R,
    chunk_tx: Sender<SerialChunk>,
    reader_terminator_rx: Receiver<bool>,
) -> Result<(), Ld19Error> {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut received_since_gap = false;
    loop {
        if do_terminate(&reader_terminator_rx) {
            info!("Stopping the serial reader");
            return Ok(());
        }

        let chunk = match read_chunk(source, &mut buffer) {
            Ok(ReadOutcome::Data(0)) => continue,
            Ok(ReadOutcome::Data(n)) => {
                received_since_gap = true;
                SerialChunk::Bytes(buffer[..n].to_vec())
            }
            Ok(ReadOutcome::Stalled) => {
                if !received_since_gap {
                    continue;
                }
                received_since_gap = false;
                SerialChunk::Gap
            }
            Err(e) => {
                error!("{e}");
                return Err(e);
            }
        };

        if chunk_tx.send(chunk).is_err() {
            debug!("Parser thread is gone, stopping the serial reader");
            return Ok(());
        }
    }
}

pub(crate) fn parse_packets(
    chunk_rx: Receiver<SerialChunk>,
    scan_tx: Sender<Scan>,
    stale_scan_rx: Receiver<Scan>,
    stats: Arc<AtomicCell<PipelineStats>>,
) {
    let mut pipeline = Pipeline::new();
    let mut completed = Vec::new();
    for chunk in chunk_rx.iter() {
        match chunk {
            SerialChunk::Bytes(data) => pipeline.feed(&data, |scan| completed.push(scan)),
            SerialChunk::Gap => pipeline.stream_gap(),
        }
        for scan in completed.drain(..) {
            if !hand_off(scan, &scan_tx, &stale_scan_rx) {
                pipeline.note_scan_dropped();
            }
        }
        stats.store(pipeline.stats());
    }
    debug!(
        "Serial reader stopped, discarding a partial scan of {} points",
        pipeline.partial_scan().len()
    );
}

/// Passes `scan` to the consumer without blocking. A scan the consumer has
/// not picked up yet is replaced. Returns false if one was replaced.
fn hand_off(scan: Scan, scan_tx: &Sender<Scan>, stale_scan_rx: &Receiver<Scan>) -> bool {
    match scan_tx.try_send(scan) {
        Ok(()) => true,
        Err(TrySendError::Full(scan)) => {
            let replaced = stale_scan_rx.try_recv().is_ok();
            // Only this thread sends, so there is room now
            let _ = scan_tx.try_send(scan);
            !replaced
        }
        Err(TrySendError::Disconnected(_)) => true,
    }
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    terminator_rx.try_recv().unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::frame;
    use crossbeam_channel::bounded;

    fn scan_with(n: usize) -> Scan {
        Scan {
            n_frames: n,
            ..Scan::default()
        }
    }

    #[test]
    fn test_hand_off_keeps_latest() {
        let (scan_tx, scan_rx) = bounded::<Scan>(1);
        assert!(hand_off(scan_with(1), &scan_tx, &scan_rx));
        assert!(!hand_off(scan_with(2), &scan_tx, &scan_rx));
        assert!(!hand_off(scan_with(3), &scan_tx, &scan_rx));

        assert_eq!(scan_rx.try_recv().unwrap().n_frames, 3);
        assert!(scan_rx.try_recv().is_err());
    }

    #[test]
    fn test_parse_packets_in_order() {
        let (chunk_tx, chunk_rx) = bounded(16);
        let (scan_tx, scan_rx) = bounded(1);
        let stats = Arc::new(AtomicCell::new(PipelineStats::default()));

        let first = frame(350., 358.).to_bytes();
        let second = frame(358.5, 4.).to_bytes();
        chunk_tx.send(SerialChunk::Bytes(first[..10].to_vec())).unwrap();
        chunk_tx.send(SerialChunk::Bytes(first[10..].to_vec())).unwrap();
        // a stall in the middle of a frame drops it
        chunk_tx.send(SerialChunk::Bytes(second[..30].to_vec())).unwrap();
        chunk_tx.send(SerialChunk::Gap).unwrap();
        chunk_tx.send(SerialChunk::Bytes(second.to_vec())).unwrap();
        drop(chunk_tx);

        parse_packets(chunk_rx, scan_tx, scan_rx.clone(), stats.clone());

        let scan = scan_rx.try_recv().unwrap();
        assert_eq!(scan.len(), 15);
        let stats = stats.load();
        assert_eq!(stats.frames_accepted, 2);
        assert_eq!(stats.stream_gaps, 1);
        assert_eq!(stats.scans_emitted, 1);
        assert_eq!(stats.scans_dropped, 0);
    }
}
