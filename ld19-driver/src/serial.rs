use crate::config::DriverConfig;
use crate::constants::BAUD_RATE;
use crate::error::Ld19Error;
use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read};

pub(crate) enum ReadOutcome {
    Data(usize),
    Stalled,
}

/// Opens the configured port at the sensor's fixed baud rate and drops
/// whatever the OS buffered before.
pub fn open_port(config: &DriverConfig) -> Result<Box<dyn SerialPort>, Ld19Error> {
    let connection_error = |source: serialport::Error| Ld19Error::Connection {
        port: config.port_name.clone(),
        source,
    };
    let port = serialport::new(&config.port_name, BAUD_RATE)
        .timeout(config.read_timeout)
        .open()
        .map_err(connection_error)?;
    port.clear(ClearBuffer::Input).map_err(connection_error)?;
    Ok(port)
}

pub(crate) fn read_chunk<R: Read + ?Sized>(
    source: &mut R,
    buffer: &mut [u8],
) -> Result<ReadOutcome, Ld19Error> {
    match source.read(buffer) {
        Ok(0) => Err(Ld19Error::EndOfStream),
        Ok(n) => Ok(ReadOutcome::Data(n)),
        Err(e) => match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Ok(ReadOutcome::Stalled),
            io::ErrorKind::Interrupted => Ok(ReadOutcome::Data(0)),
            _ => Err(Ld19Error::Disconnected(e)),
        },
    }
}
