use crate::constants::{MAX_ANGLE_VALUE, POINTS_PER_FRAME};
use crate::error::FrameError;
use crate::numeric::to_angle;
use crate::packet::Frame;
use ld19_data::Point;

/// Points of one frame together with the frame's metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    pub points: Vec<Point>,
    /// In degrees.
    pub start_angle: f64,
    /// In degrees.
    pub end_angle: f64,
    /// Rotation speed in degrees per second.
    pub speed: u16,
    pub timestamp: u16,
}

impl DecodedFrame {
    /// The frame crossed 360 degrees.
    pub fn wraps(&self) -> bool {
        self.end_angle < self.start_angle
    }
}

/// Expands a validated frame into points, interpolating the angle of each
/// sample between the start and end angle.
pub fn decode(frame: &Frame) -> Result<DecodedFrame, FrameError> {
    let n = frame.n_points();
    if n != POINTS_PER_FRAME {
        return Err(FrameError::UnexpectedPointCount {
            expected: POINTS_PER_FRAME,
            actual: n,
        });
    }
    for raw in [frame.start_angle, frame.end_angle] {
        if raw >= MAX_ANGLE_VALUE {
            return Err(FrameError::AngleOutOfRange(raw));
        }
    }

    let start_angle = to_angle(frame.start_angle);
    let end_angle = to_angle(frame.end_angle);
    let angle_shift = if start_angle <= end_angle { 0f64 } else { 360. };
    let angle_diff = end_angle - start_angle + angle_shift;
    let angle_rate: f64 = angle_diff / ((n - 1) as f64);

    let points = frame
        .samples
        .iter()
        .enumerate()
        .map(|(idx, sample)| {
            let angle_degree = if idx == 0 {
                start_angle
            } else if idx == n - 1 {
                end_angle
            } else {
                (start_angle + (idx as f64) * angle_rate) % 360.
            };
            Point::new(angle_degree, sample.distance, sample.intensity)
        })
        .collect();

    Ok(DecodedFrame {
        points,
        start_angle,
        end_angle,
        speed: frame.speed,
        timestamp: frame.timestamp,
    })
}
