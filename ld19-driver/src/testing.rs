use crate::constants::POINTS_PER_FRAME;
use crate::packet::{Frame, Sample};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Converts degrees to the 0.01 degree units of the wire format.
pub(crate) fn from_angle(degree: f64) -> u16 {
    (degree * 100.).round() as u16
}

pub(crate) fn distance_at(idx: usize) -> u16 {
    1000 + (idx as u16) * 10
}

pub(crate) fn intensity_at(idx: usize) -> u8 {
    100 + idx as u8
}

/// A well-formed frame spanning `start` to `end` degrees.
pub(crate) fn frame(start: f64, end: f64) -> Frame {
    let mut samples = [Sample::default(); POINTS_PER_FRAME];
    for (i, sample) in samples.iter_mut().enumerate() {
        *sample = Sample {
            distance: distance_at(i),
            intensity: intensity_at(i),
        };
    }
    Frame {
        ver_len: 0x2C,
        speed: 3600,
        start_angle: from_angle(start),
        samples,
        end_angle: from_angle(end),
        timestamp: 1200,
    }
}

/// Wire bytes of consecutive frames covering `from..to` degrees in 10 degree steps.
pub(crate) fn lap_bytes(from: u32, to: u32) -> Vec<u8> {
    (from..to)
        .step_by(10)
        .flat_map(|a| frame(a as f64, a as f64 + 8.).to_bytes())
        .collect()
}

/// Byte source that replays scripted reads, then reports end of stream.
pub(crate) struct ScriptedSource {
    reads: VecDeque<io::Result<Vec<u8>>>,
}

impl ScriptedSource {
    pub(crate) fn new(reads: Vec<io::Result<Vec<u8>>>) -> ScriptedSource {
        ScriptedSource {
            reads: reads.into(),
        }
    }
}

impl Read for ScriptedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reads.pop_front() {
            None => Ok(0),
            Some(Err(e)) => Err(e),
            Some(Ok(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.reads.push_front(Ok(data[n..].to_vec()));
                }
                Ok(n)
            }
        }
    }
}

/// Wraps a [`ScriptedSource`] and raises a flag once the source is dropped.
pub(crate) struct TrackedSource {
    inner: ScriptedSource,
    dropped: Arc<AtomicBool>,
}

impl TrackedSource {
    pub(crate) fn new(inner: ScriptedSource) -> (TrackedSource, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let source = TrackedSource {
            inner,
            dropped: dropped.clone(),
        };
        (source, dropped)
    }
}

impl Read for TrackedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for TrackedSource {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}
