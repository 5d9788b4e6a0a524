//! We use this mocking module in unit tests to emulate the amplifier's serial port.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Inner {
    /// Everything written to the port, in order.
    written: Vec<u8>,
    /// Scripted replies, one chunk per read call.
    chunks: VecDeque<Vec<u8>>,
    /// Error returned by every read, taking precedence over scripted data.
    read_error: Option<embedded_io::ErrorKind>,
    write_error: Option<embedded_io::ErrorKind>,
}

/// Mock serial port. Clones share the same buffers, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone, Default)]
pub struct MockSerial(Arc<Mutex<Inner>>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSerialError(embedded_io::ErrorKind);

impl core::fmt::Display for MockSerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mock serial error: {:?}", self.0)
    }
}

impl std::error::Error for MockSerialError {}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        self.0
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut inner = self.0.lock();
        if let Some(kind) = inner.write_error {
            return Err(MockSerialError(kind));
        }
        inner.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        match self.0.lock().write_error {
            Some(kind) => Err(MockSerialError(kind)),
            None => Ok(()),
        }
    }
}

impl embedded_io::Read for MockSerial {
    /// Returns the next scripted chunk, or a timeout when there is none.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut inner = self.0.lock();
        if let Some(kind) = inner.read_error {
            return Err(MockSerialError(kind));
        }
        let Some(mut chunk) = inner.chunks.pop_front() else {
            return Err(MockSerialError(embedded_io::ErrorKind::TimedOut));
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            inner.chunks.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `data` to be returned by one read call.
    pub fn push_read(&self, data: &[u8]) {
        self.0.lock().chunks.push_back(data.to_vec());
    }

    /// Whether every scripted chunk has been read.
    pub fn drained(&self) -> bool {
        self.0.lock().chunks.is_empty()
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().written).into_owned()
    }

    /// Return what was written so far and forget it.
    pub fn take_written(&self) -> String {
        let bytes = std::mem::take(&mut self.0.lock().written);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn set_read_error(&self, kind: Option<embedded_io::ErrorKind>) {
        self.0.lock().read_error = kind;
    }

    pub fn set_write_error(&self, kind: Option<embedded_io::ErrorKind>) {
        self.0.lock().write_error = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error as _, ErrorKind, Read, Write};

    #[test]
    fn writes_are_shared_between_clones() {
        let mock = MockSerial::new();
        let mut port = mock.clone();
        port.write(b"power?").unwrap();
        port.write(b"vol_20!").unwrap();
        assert_eq!(mock.take_written(), "power?vol_20!");
        assert_eq!(mock.written(), "");
    }

    #[test]
    fn one_chunk_per_read() {
        let mock = MockSerial::new();
        mock.push_read(b"power=on$");
        mock.push_read(b"volume=20$");
        let mut port = mock.clone();
        let mut buf = [0u8; 64];
        assert_eq!(port.read(&mut buf).unwrap(), 9);
        assert_eq!(&buf[..9], b"power=on$");
        assert_eq!(port.read(&mut buf).unwrap(), 10);
        assert!(mock.drained());
        assert_eq!(port.read(&mut buf).unwrap_err().kind(), ErrorKind::TimedOut);
    }

    #[test]
    fn short_buffer_keeps_remainder() {
        let mock = MockSerial::new();
        mock.push_read(b"model=RA12$");
        let mut port = mock.clone();
        let mut buf = [0u8; 4];
        assert_eq!(port.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"mode");
        assert!(!mock.drained());
    }

    #[test]
    fn errors_display_their_kind() {
        let err = MockSerialError(ErrorKind::BrokenPipe);
        assert_eq!(err.to_string(), "mock serial error: BrokenPipe");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn injected_errors() {
        let mock = MockSerial::new();
        let mut port = mock.clone();
        mock.push_read(b"power=on$");
        mock.set_read_error(Some(ErrorKind::BrokenPipe));
        mock.set_write_error(Some(ErrorKind::Other));

        let mut buf = [0u8; 16];
        assert_eq!(port.read(&mut buf).unwrap_err().kind(), ErrorKind::BrokenPipe);
        assert_eq!(port.write(b"x").unwrap_err().kind(), ErrorKind::Other);
        assert!(port.flush().is_err());
        assert_eq!(mock.written(), "");

        mock.set_read_error(None);
        assert_eq!(port.read(&mut buf).unwrap(), 9);
    }
}
