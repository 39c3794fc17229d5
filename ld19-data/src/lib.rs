pub mod point;
pub mod scan;

pub use point::Point;
pub use scan::Scan;
