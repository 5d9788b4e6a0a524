//! Splits the amplifier's status stream into `$`-terminated fields.

/// Field terminator in the amplifier's status stream.
pub const FIELD_TERMINATOR: u8 = b'$';

/// Buffers input and emits a field whenever a `$` is encountered.
///
/// A field may arrive split over any number of reads, and one read may carry many fields.
/// The only state kept between calls is the unterminated tail of the stream.
///
/// __Note:__ The tail is not capped. A device (or line noise) which never sends a `$` grows
/// it without bound; this is accepted for a trusted point-to-point serial line.
#[derive(Debug, Default)]
pub struct Framer {
    carry: Vec<u8>,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes` and return every field completed by them, in order, without terminators.
    ///
    /// An empty field (`$$`) is returned as an empty string, so it fails to decode like any
    /// other malformed field. Bytes which are not valid UTF-8 are replaced.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(bytes);

        let Some(last) = self.carry.iter().rposition(|b| *b == FIELD_TERMINATOR) else {
            return Vec::new();
        };
        let tail = self.carry.split_off(last + 1);
        let complete = core::mem::replace(&mut self.carry, tail);

        complete[..last]
            .split(|b| *b == FIELD_TERMINATOR)
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect()
    }

    /// Bytes received since the last terminator.
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }

    /// Drop any partial field, e.g. after the interface was reopened.
    pub fn reset(&mut self) {
        self.carry.clear();
    }
}
