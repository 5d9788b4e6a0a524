//! `embedded-io` adapter over a host serial port.

use crate::{
    config::Config,
    error::{Error, Result},
};

/// A host serial port opened with [`serialport`], usable as the engine's interface.
pub struct SerialPort(Box<dyn serialport::SerialPort>);

/// `std::io::Error` carried through the `embedded-io` traits.
#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Map a host I/O error kind onto its `embedded-io` counterpart.
pub(crate) fn kind(kind: std::io::ErrorKind) -> embedded_io::ErrorKind {
    use embedded_io::ErrorKind as E;
    use std::io::ErrorKind as S;
    match kind {
        S::NotFound => E::NotFound,
        S::PermissionDenied => E::PermissionDenied,
        S::ConnectionRefused => E::ConnectionRefused,
        S::ConnectionReset => E::ConnectionReset,
        S::ConnectionAborted => E::ConnectionAborted,
        S::NotConnected => E::NotConnected,
        S::AddrInUse => E::AddrInUse,
        S::AddrNotAvailable => E::AddrNotAvailable,
        S::BrokenPipe => E::BrokenPipe,
        S::AlreadyExists => E::AlreadyExists,
        S::InvalidInput => E::InvalidInput,
        S::InvalidData => E::InvalidData,
        S::TimedOut => E::TimedOut,
        S::Interrupted => E::Interrupted,
        S::Unsupported => E::Unsupported,
        S::OutOfMemory => E::OutOfMemory,
        _ => E::Other,
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        kind(self.0.kind())
    }
}

impl SerialPort {
    /// Open `config.tty` at `config.baud_rate`, 8N1, with `config.read_timeout` on reads.
    pub fn open(config: &Config) -> Result<Self> {
        let port = serialport::new(&config.tty, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(config.read_timeout)
            .open()
            .map_err(|err| Error::Open {
                path: config.tty.clone(),
                reason: err.to_string(),
            })?;
        tracing::info!(tty = %config.tty, baud = config.baud_rate, "serial port open");
        Ok(Self(port))
    }

    pub fn name(&self) -> Option<String> {
        self.0.name()
    }
}

impl embedded_io::ErrorType for SerialPort {
    type Error = IoError;
}

impl embedded_io::Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        std::io::Read::read(&mut self.0, buf).map_err(IoError)
    }
}

impl embedded_io::Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> core::result::Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_device_fails() {
        let config = Config::new("/dev/rotel-rs232-does-not-exist");
        match SerialPort::open(&config) {
            Err(Error::Open { path, .. }) => assert_eq!(path, "/dev/rotel-rs232-does-not-exist"),
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("opened a device which does not exist"),
        }
    }

    #[test]
    fn error_kinds() {
        use embedded_io::Error as _;
        let err = IoError(std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert_eq!(err.kind(), embedded_io::ErrorKind::TimedOut);
        assert_eq!(
            kind(std::io::ErrorKind::BrokenPipe),
            embedded_io::ErrorKind::BrokenPipe
        );
        assert_eq!(
            kind(std::io::ErrorKind::WouldBlock),
            embedded_io::ErrorKind::Other
        );
    }
}
