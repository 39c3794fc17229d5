use crate::constants::{
    CHECKSUM_OFFSET, CRC_POLYNOMIAL, END_ANGLE_OFFSET, FRAME_LENGTH, PACKET_TYPE,
    POINTS_OFFSET, POINTS_PER_FRAME, POINT_SIZE, SPEED_OFFSET, START_ANGLE_OFFSET,
    START_MARKER, TIMESTAMP_OFFSET,
};
use crate::error::FrameError;
use crate::numeric::to_u16;

const fn crc_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC_TABLE: [u8; 256] = crc_table();

/// One packed measurement as it appears in a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    /// Distance in mm.
    pub distance: u16,
    pub intensity: u8,
}

/// A frame that passed structural and checksum validation.
///
/// Angles are kept in the raw 0.01 degree units of the wire format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Packet type in bits 7..5, declared point count in bits 4..0.
    pub ver_len: u8,
    /// Rotation speed in degrees per second.
    pub speed: u16,
    pub start_angle: u16,
    pub samples: [Sample; POINTS_PER_FRAME],
    pub end_angle: u16,
    /// Sensor time in ms, wraps at 30000.
    pub timestamp: u16,
}

impl Frame {
    pub fn packet_type(&self) -> u8 {
        self.ver_len >> 5
    }

    pub fn n_points(&self) -> usize {
        (self.ver_len & 0x1F) as usize
    }

    /// Serializes the frame into its wire format, with a freshly computed checksum.
    pub fn to_bytes(&self) -> [u8; FRAME_LENGTH] {
        let mut bytes = [0u8; FRAME_LENGTH];
        bytes[0] = START_MARKER;
        bytes[1] = self.ver_len;
        put_u16(&mut bytes, SPEED_OFFSET, self.speed);
        put_u16(&mut bytes, START_ANGLE_OFFSET, self.start_angle);
        for (i, sample) in self.samples.iter().enumerate() {
            let offset = sample_index(i);
            put_u16(&mut bytes, offset, sample.distance);
            bytes[offset + 2] = sample.intensity;
        }
        put_u16(&mut bytes, END_ANGLE_OFFSET, self.end_angle);
        put_u16(&mut bytes, TIMESTAMP_OFFSET, self.timestamp);
        bytes[CHECKSUM_OFFSET] = calc_checksum(&bytes[..CHECKSUM_OFFSET]);
        bytes
    }

    fn parse(packet: &[u8]) -> Frame {
        let mut samples = [Sample::default(); POINTS_PER_FRAME];
        for (i, sample) in samples.iter_mut().enumerate() {
            let offset = sample_index(i);
            *sample = Sample {
                distance: get_u16(packet, offset),
                intensity: packet[offset + 2],
            };
        }
        Frame {
            ver_len: packet[1],
            speed: get_u16(packet, SPEED_OFFSET),
            start_angle: get_u16(packet, START_ANGLE_OFFSET),
            samples,
            end_angle: get_u16(packet, END_ANGLE_OFFSET),
            timestamp: get_u16(packet, TIMESTAMP_OFFSET),
        }
    }
}

fn get_u16(packet: &[u8], offset: usize) -> u16 {
    to_u16(packet[offset], packet[offset + 1])
}

fn put_u16(packet: &mut [u8], offset: usize, value: u16) {
    packet[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn sample_index(idx: usize) -> usize {
    POINTS_OFFSET + idx * POINT_SIZE
}

/// CRC-8 with polynomial 0x4D, as computed by the sensor.
pub(crate) fn calc_checksum(data: &[u8]) -> u8 {
    data.iter()
        .fold(0u8, |crc, byte| CRC_TABLE[(crc ^ byte) as usize])
}

/// Checks a candidate frame and parses it on success.
///
/// The check is pure: the same bytes always give the same result.
pub fn validate(packet: &[u8]) -> Result<Frame, FrameError> {
    if packet.len() != FRAME_LENGTH {
        return Err(FrameError::InvalidLength {
            expected: FRAME_LENGTH,
            actual: packet.len(),
        });
    }
    if packet[0] != START_MARKER {
        return Err(FrameError::InvalidStartMarker(packet[0]));
    }
    let frame = Frame::parse(packet);
    if frame.packet_type() != PACKET_TYPE {
        return Err(FrameError::MarkerMismatch(frame.ver_len));
    }
    err_if_checksum_mismatched(packet)?;
    Ok(frame)
}

pub(crate) fn err_if_checksum_mismatched(packet: &[u8]) -> Result<(), FrameError> {
    let calculated = calc_checksum(&packet[..CHECKSUM_OFFSET]);
    let expected = packet[CHECKSUM_OFFSET];
    match calculated != expected {
        true => Err(FrameError::ChecksumMismatch {
            expected,
            calculated,
        }),
        false => Ok(()),
    }
}
