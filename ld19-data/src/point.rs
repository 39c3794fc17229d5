#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One range measurement in the sensor's native polar form.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// Scan angle in degrees, within `[0, 360)`.
    pub angle_degree: f64,
    /// Distance to an object in mm. Zero means no return.
    pub distance: u16,
    /// Return strength of the laser pulse.
    pub intensity: u8,
}

impl Point {
    pub fn new(angle_degree: f64, distance: u16, intensity: u8) -> Point {
        Point {
            angle_degree,
            distance,
            intensity,
        }
    }

    /// The sensor reports a distance of zero when no echo came back.
    pub fn is_valid(&self) -> bool {
        self.distance > 0
    }

    pub fn angle_radian(&self) -> f64 {
        self.angle_degree.to_radians()
    }

    /// Projects the point onto the sensor plane, in mm.
    pub fn to_cartesian(&self) -> (f64, f64) {
        let d = self.distance as f64;
        let w = self.angle_radian();
        (d * w.cos(), d * w.sin())
    }
}
