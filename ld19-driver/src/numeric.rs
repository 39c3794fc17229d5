pub(crate) fn to_u16(lo: u8, hi: u8) -> u16 {
    ((hi as u16) << 8) + (lo as u16)
}

/// Converts a raw angle in 0.01 degree units to degrees.
pub(crate) fn to_angle(raw: u16) -> f64 {
    (raw as f64) / 100.
}

pub(crate) fn to_string(data: &[u8]) -> String {
    data.iter()
        .map(|e| format!("{:02X}", e))
        .collect::<Vec<_>>()
        .join(" ")
}
