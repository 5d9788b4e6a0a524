//! Decides which attribute to ask the amplifier about next.
//!
//! The amplifier's own reports are unreliable around power transitions, so the engine fills
//! the gaps by polling, one query per tick, never asking again for something it knows.

use crate::{
    state::State,
    types::{Power, Query},
};

/// Next query to send for `state`, or `None` when there is nothing left to discover.
///
/// Queries follow a fixed precedence. Model and power come first. In standby nothing else is
/// asked, since every other reading is meaningless until the amplifier is on. `auto_update`
/// adds a final step which switches the amplifier to pushing its changes.
pub fn next_query(state: &State, auto_update: bool) -> Option<Query> {
    if state.model.is_none() {
        return Some(Query::Model);
    }
    match state.power {
        None => return Some(Query::Power),
        Some(Power::Standby) => return None,
        Some(Power::On) => {}
    }

    let steps = [
        // Shortly after power on the amplifier reports a volume of 0 before the real one.
        (state.volume.is_none_or(|v| v == 0), Query::Volume),
        (state.source.is_none(), Query::Source),
        (state.freq.is_none(), Query::Freq),
        (state.bypass.is_none(), Query::Bypass),
        (state.speaker.is_none(), Query::Speaker),
        (state.mute.is_none(), Query::Mute),
        (state.bass.is_none(), Query::Bass),
        (state.treble.is_none(), Query::Treble),
        (state.balance.is_none(), Query::Balance),
        (state.dimmer.is_none(), Query::Dimmer),
        (
            auto_update && state.update_mode.is_none(),
            Query::EnableAutoUpdate,
        ),
    ];
    steps
        .into_iter()
        .find_map(|(unknown, query)| unknown.then_some(query))
}
