//! Our error types for the Rotel amplifier engine.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error type for Rotel RS232 communications.
///
/// Errors are cheap to clone so that they can be fanned out to every event subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The serial device could not be opened. Fatal, the engine never starts.
    #[error("Cannot open {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("Serial communication error: {0:?}")]
    Serial(embedded_io::ErrorKind),
    /// A `$`-terminated field which does not follow the device grammar.
    #[error("Unexpected response: {0:?}")]
    InvalidResponse(String),
    /// Several errors collected while parsing one read batch.
    #[error("{} errors in batch, first: {}", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
    Batch(Vec<Error>),
    #[error("Invalid range for {what}: {value}")]
    InvalidRange { what: &'static str, value: i32 },
    #[error("Unknown source")]
    UnknownSource,
    /// The attribute or command is only accepted while the amplifier is powered on.
    #[error("{0}: amplifier is not powered on")]
    OutOfOrder(&'static str),
    #[error("Subscriber channel blocked")]
    ChannelBlocked,
    #[error("Engine is closed")]
    Closed,
}

impl Error {
    /// Wrap an interface error, keeping only its kind.
    pub(crate) fn serial<E: embedded_io::Error>(err: E) -> Self {
        tracing::warn!(error = ?err, "serial error");
        Error::Serial(err.kind())
    }

    /// Whether the serial handle is gone for good and the worker should stop.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Open { .. }
                | Error::Closed
                | Error::Serial(embedded_io::ErrorKind::NotConnected)
                | Error::Serial(embedded_io::ErrorKind::BrokenPipe)
        )
    }

    /// Collapse the errors of one batch into a single value.
    pub(crate) fn collect(mut errors: Vec<Error>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Batch(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_single_and_many() {
        assert_eq!(Error::collect(vec![]), None);
        assert_eq!(
            Error::collect(vec![Error::UnknownSource]),
            Some(Error::UnknownSource)
        );
        let many = Error::collect(vec![
            Error::InvalidResponse("a".into()),
            Error::InvalidResponse("b".into()),
        ])
        .unwrap();
        assert!(matches!(&many, Error::Batch(v) if v.len() == 2));
        assert!(many.to_string().starts_with("2 errors in batch"));
    }

    #[test]
    fn fatal_kinds() {
        assert!(Error::Serial(embedded_io::ErrorKind::BrokenPipe).is_fatal());
        assert!(Error::Serial(embedded_io::ErrorKind::NotConnected).is_fatal());
        assert!(!Error::Serial(embedded_io::ErrorKind::Other).is_fatal());
        assert!(!Error::InvalidResponse("x".into()).is_fatal());
    }
}
