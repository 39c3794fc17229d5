use crate::decode::DecodedFrame;
use ld19_data::{Point, Scan};

/// Groups decoded points into laps.
///
/// A lap ends where the angle steps backwards. Points before that seam stay
/// in the finished scan and the rest start the next one, so angles within an
/// emitted scan never decrease.
#[derive(Debug, Default)]
pub struct ScanAssembler {
    scan: Scan,
    speed_sum: f64,
}

impl ScanAssembler {
    pub fn new() -> ScanAssembler {
        ScanAssembler::default()
    }

    /// Appends the points of `frame`, calling `emit` for every lap it completes.
    pub fn push<F: FnMut(Scan)>(&mut self, frame: DecodedFrame, mut emit: F) {
        let DecodedFrame {
            points,
            speed,
            timestamp,
            ..
        } = frame;

        let mut counted = false;
        for point in points {
            if self.is_beginning_of_cycle(&point) {
                emit(self.seal());
                counted = false;
            }
            if !counted {
                self.count_frame(speed, timestamp);
                counted = true;
            }
            self.scan.points.push(point);
        }
    }

    /// Records a frame lost to validation or decoding in the current lap.
    pub fn note_rejected(&mut self) {
        self.scan.n_rejected_frames += 1;
    }

    /// The lap being assembled.
    pub fn partial(&self) -> &Scan {
        &self.scan
    }

    fn is_beginning_of_cycle(&self, point: &Point) -> bool {
        self.scan
            .points
            .last()
            .is_some_and(|last| point.angle_degree < last.angle_degree)
    }

    fn count_frame(&mut self, speed: u16, timestamp: u16) {
        if self.scan.n_frames == 0 {
            self.scan.timestamp = timestamp;
        }
        self.scan.n_frames += 1;
        self.speed_sum += speed as f64;
        self.scan.rotation_speed = self.speed_sum / (self.scan.n_frames as f64);
    }

    fn seal(&mut self) -> Scan {
        self.speed_sum = 0.;
        std::mem::take(&mut self.scan)
    }
}
