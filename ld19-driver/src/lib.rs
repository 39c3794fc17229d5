mod assembler;
mod config;
mod constants;
mod decode;
mod driver_threads;
mod error;
mod numeric;
mod packet;
mod pipeline;
mod serial;
mod sync;
#[cfg(test)]
mod testing;

use crate::constants::CHUNK_CHANNEL_CAPACITY;
use crate::driver_threads::{parse_packets, read_device_signal};
use crossbeam_channel::{bounded, Receiver};
use crossbeam_utils::atomic::AtomicCell;
use log::info;
use std::io::Read;
use std::sync::Arc;

pub use crate::assembler::ScanAssembler;
pub use crate::config::{default_port_name, DriverConfig};
pub use crate::constants::{BAUD_RATE, FRAME_LENGTH, POINTS_PER_FRAME, START_MARKER};
pub use crate::decode::{decode, DecodedFrame};
pub use crate::driver_threads::DriverThreads;
pub use crate::error::{FrameError, Ld19Error};
pub use crate::packet::{validate, Frame, Sample};
pub use crate::pipeline::{Pipeline, PipelineStats};
pub use crate::serial::open_port;
pub use crate::sync::FrameSynchronizer;
pub use ld19_data::{Point, Scan};

/// Function to launch the LD19 driver.
/// # Arguments
///
/// * `config` - Serial port name and read timeout.
///
/// Completed scans arrive on the returned receiver. At most one scan is
/// kept pending. The channel disconnects when the device fails, and
/// [`DriverThreads::join`] then reports the error.
pub fn run_driver(config: &DriverConfig) -> Result<(DriverThreads, Receiver<Scan>), Ld19Error> {
    let port = open_port(config)?;
    info!("Opened \"{}\" at {} baud", config.port_name, BAUD_RATE);
    Ok(spawn_driver(port))
}

/// Starts the driver threads on an already opened byte source.
///
/// The source is owned by the reader thread and dropped when it exits.
pub fn spawn_driver<R>(mut source: R) -> (DriverThreads, Receiver<Scan>)
where
    R: Read + Send + 'static,
{
    let (reader_terminator_tx, reader_terminator_rx) = bounded(1);
    let (chunk_tx, chunk_rx) = bounded(CHUNK_CHANNEL_CAPACITY);
    let (scan_tx, scan_rx) = bounded::<Scan>(1);
    let stats = Arc::new(AtomicCell::new(PipelineStats::default()));

    let reader_thread = Some(std::thread::spawn(move || {
        read_device_signal(&mut source, chunk_tx, reader_terminator_rx)
    }));

    let stale_scan_rx = scan_rx.clone();
    let parser_stats = stats.clone();
    let parser_thread = Some(std::thread::spawn(move || {
        parse_packets(chunk_rx, scan_tx, stale_scan_rx, parser_stats);
    }));

    let driver_threads = DriverThreads {
        reader_terminator_tx,
        reader_thread,
        parser_thread,
        stats,
    };

    (driver_threads, scan_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{frame, lap_bytes, ScriptedSource, TrackedSource};
    use std::io;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[test]
    fn test_spawn_driver_disconnect() {
        let mut first = lap_bytes(0, 360);
        // the device goes away in the middle of the next lap
        let mut second = lap_bytes(0, 20);
        second.extend_from_slice(&frame(20., 28.).to_bytes()[..30]);
        first.extend(second);

        let (source, source_dropped) = TrackedSource::new(ScriptedSource::new(vec![
            Ok(first),
            Err(io::Error::from(io::ErrorKind::BrokenPipe)),
        ]));
        let (threads, scan_rx) = spawn_driver(source);

        let scans: Vec<Scan> = scan_rx.iter().collect();
        assert_eq!(scans.len(), 1);
        assert_eq!(scans[0].len(), 36 * 12);

        let stats = threads.stats();
        assert_eq!(stats.frames_accepted, 38);
        assert_eq!(stats.frames_rejected(), 0);

        assert!(matches!(threads.join(), Err(Ld19Error::Disconnected(_))));
        // the reader thread released the device
        assert!(source_dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_spawn_driver_end_of_stream() {
        let (threads, scan_rx) = spawn_driver(ScriptedSource::new(vec![Ok(lap_bytes(0, 90))]));
        assert!(scan_rx.iter().next().is_none());
        assert!(matches!(threads.join(), Err(Ld19Error::EndOfStream)));
    }

    #[test]
    fn test_run_driver_missing_port() {
        let config = DriverConfig::new("/dev/this-port-does-not-exist");
        assert!(matches!(
            run_driver(&config),
            Err(Ld19Error::Connection { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_driver_normal_data() {
        use serialport::{SerialPort, TTYPort};
        use std::io::Write;

        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let name = slave.name().unwrap();
        let config = DriverConfig {
            port_name: name,
            read_timeout: Duration::from_millis(50),
        };
        let (threads, scan_rx) = run_driver(&config).unwrap();

        let mut packet = Vec::new();
        // garbage before the first frame
        packet.extend_from_slice(&[0x00, 0x54, 0x02, 0x37]);
        packet.extend_from_slice(&frame(300., 308.).to_bytes());
        packet.extend_from_slice(&frame(350., 358.).to_bytes());
        // beginning of a new lap
        packet.extend_from_slice(&frame(358.5, 4.).to_bytes());
        master.write_all(&packet).unwrap();

        let scan = scan_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(scan.len(), 27);
        assert_eq!(scan.n_frames, 3);
        assert_eq!(scan.points[0].angle_degree, 300.);
        assert!(scan
            .points
            .windows(2)
            .all(|w| w[0].angle_degree <= w[1].angle_degree));
        assert!(scan.points.iter().all(|p| p.distance >= 1000));

        drop(threads);
    }
}
