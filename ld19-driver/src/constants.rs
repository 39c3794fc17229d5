/// Size of one LD19 measurement frame on the wire.
pub const FRAME_LENGTH: usize = 47;
pub const START_MARKER: u8 = 0x54;
/// Packet type carried in the upper three bits of the `VerLen` byte.
pub const PACKET_TYPE: u8 = 0x01;
pub const POINTS_PER_FRAME: usize = 12;
pub const BAUD_RATE: u32 = 230400;

pub(crate) const SPEED_OFFSET: usize = 2;
pub(crate) const START_ANGLE_OFFSET: usize = 4;
pub(crate) const POINTS_OFFSET: usize = 6;
pub(crate) const POINT_SIZE: usize = 3;
pub(crate) const END_ANGLE_OFFSET: usize = 42;
pub(crate) const TIMESTAMP_OFFSET: usize = 44;
pub(crate) const CHECKSUM_OFFSET: usize = 46;

pub(crate) const CRC_POLYNOMIAL: u8 = 0x4D;
// Angles are sent in units of 0.01 degree
pub(crate) const MAX_ANGLE_VALUE: u16 = 36000;

pub(crate) const SYNC_WINDOW: usize = 2 * FRAME_LENGTH;
pub(crate) const REJECTION_WINDOW: usize = 100;
pub(crate) const DECODE_ERROR_STREAK: usize = 16;

pub(crate) const READ_BUFFER_SIZE: usize = 512;
pub(crate) const CHUNK_CHANNEL_CAPACITY: usize = 200;
