//! Change notifications published by the engine.

use bitflags::bitflags;

use crate::{error::Error, state::State};

bitflags! {
    /// Which attributes changed in one read batch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flag: u16 {
        const POWER = 1 << 0;
        const VOLUME = 1 << 1;
        const MUTE = 1 << 2;
        const BASS = 1 << 3;
        const TREBLE = 1 << 4;
        const BALANCE = 1 << 5;
        const SOURCE = 1 << 6;
        const FREQ = 1 << 7;
        const BYPASS = 1 << 8;
        const SPEAKER = 1 << 9;
        const DIMMER = 1 << 10;
        const MODEL = 1 << 11;
    }
}

/// Published to every subscriber.
///
/// Only actual changes are published. A field confirming the value we already had
/// produces nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One or more attributes changed. `state` is the snapshot after the whole batch,
    /// with power-gated attributes cleared unless the amplifier is on.
    Changed { flags: Flag, state: State },
    /// A transport error, or the fields of one batch which could not be parsed.
    Failed(Error),
}

impl Event {
    /// Changed attributes, empty for [`Event::Failed`].
    pub fn flags(&self) -> Flag {
        match self {
            Event::Changed { flags, .. } => *flags,
            Event::Failed(_) => Flag::empty(),
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Event::Changed { .. } => None,
            Event::Failed(err) => Some(err),
        }
    }
}
