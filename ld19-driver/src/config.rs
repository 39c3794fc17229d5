use std::time::Duration;

/// Serial port the sensor is usually enumerated as on this platform.
pub fn default_port_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "/dev/tty.usbserial-0001"
    } else if cfg!(windows) {
        "COM3"
    } else {
        "/dev/ttyUSB0"
    }
}

/// Settings for [`run_driver`](crate::run_driver).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Serial port name such as `/dev/ttyUSB0`.
    pub port_name: String,
    /// A read that waits longer than this is a stall. A partially received
    /// frame is dropped after a stall.
    pub read_timeout: Duration,
}

impl DriverConfig {
    pub fn new(port_name: impl Into<String>) -> DriverConfig {
        DriverConfig {
            port_name: port_name.into(),
            ..DriverConfig::default()
        }
    }
}

impl Default for DriverConfig {
    fn default() -> DriverConfig {
        DriverConfig {
            port_name: default_port_name().to_string(),
            read_timeout: Duration::from_millis(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_defaults() {
        let config = DriverConfig::new("/dev/ttyACM1");
        assert_eq!(config.port_name, "/dev/ttyACM1");
        assert_eq!(config.read_timeout, DriverConfig::default().read_timeout);
        assert_eq!(DriverConfig::default().port_name, default_port_name());
    }
}
