//! Applies decoded fields to the last known [`State`] and reports what changed.

use crate::{
    codec::Field,
    event::Flag,
    state::State,
};

/// Owns the engine's view of the amplifier.
#[derive(Debug, Default)]
pub struct Store {
    state: State,
}

/// Store `new` in `slot` and return `flag` if it differs from what was there.
fn update<T: PartialEq>(slot: &mut Option<T>, new: T, flag: Flag) -> Flag {
    if slot.as_ref() == Some(&new) {
        return Flag::empty();
    }
    *slot = Some(new);
    flag
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one field and return the flags of the attributes it changed.
    ///
    /// Values are compared after decoding, so `volume=045` and `volume=45` are the same.
    pub fn apply(&mut self, field: Field) -> Flag {
        let state = &mut self.state;
        match field {
            Field::Model(model) => update(&mut state.model, model, Flag::MODEL),
            Field::Power(power) => {
                let flag = update(&mut state.power, power, Flag::POWER);
                if !flag.is_empty() {
                    // The amplifier only reports its real volume once it is on again.
                    state.volume = None;
                }
                flag
            }
            Field::Volume(volume) => update(&mut state.volume, volume, Flag::VOLUME),
            Field::UpdateMode(mode) => {
                state.update_mode = Some(mode);
                Flag::empty()
            }
            Field::Bass(bass) => update(&mut state.bass, bass, Flag::BASS),
            Field::Treble(treble) => update(&mut state.treble, treble, Flag::TREBLE),
            Field::Balance(balance) => update(&mut state.balance, balance, Flag::BALANCE),
            Field::Mute(mute) => update(&mut state.mute, mute, Flag::MUTE),
            Field::Source(source) => update(&mut state.source, source, Flag::SOURCE),
            Field::Freq(freq) => update(&mut state.freq, freq, Flag::FREQ),
            Field::Bypass(bypass) => update(&mut state.bypass, bypass, Flag::BYPASS),
            Field::Speaker(speaker) => update(&mut state.speaker, speaker, Flag::SPEAKER),
            Field::Dimmer(dimmer) => update(&mut state.dimmer, dimmer, Flag::DIMMER),
        }
    }

    /// Raw copy of the current state, gated attributes included.
    pub fn snapshot(&self) -> State {
        self.state.clone()
    }

    /// Borrow the current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Forget everything, e.g. when the interface is (re)opened.
    pub fn reset(&mut self) {
        self.state = State::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::decode,
        types::{Balance, Power, Source, Speaker, Switch, UpdateMode},
    };

    fn apply(store: &mut Store, field: &str) -> Flag {
        store.apply(decode(field).unwrap())
    }

    #[test]
    fn apply_is_idempotent() {
        let mut store = Store::new();
        for field in [
            "model=RA12",
            "power=on",
            "volume=20",
            "mute=off",
            "source=cd",
            "freq=off",
            "bypass=on",
            "bass=-2",
            "treble=+3",
            "balance=L2",
            "speaker=a",
            "dimmer=4",
        ] {
            assert!(!apply(&mut store, field).is_empty(), "{field}");
            assert!(apply(&mut store, field).is_empty(), "{field}");
        }
    }

    #[test]
    fn compares_decoded_values() {
        let mut store = Store::new();
        assert_eq!(apply(&mut store, "volume=045"), Flag::VOLUME);
        assert_eq!(apply(&mut store, "volume=45"), Flag::empty());
        assert_eq!(apply(&mut store, "bass=+05"), Flag::BASS);
        assert_eq!(apply(&mut store, "bass=5"), Flag::empty());
        assert_eq!(apply(&mut store, "balance=L0"), Flag::BALANCE);
        assert_eq!(apply(&mut store, "balance=000"), Flag::empty());
    }

    #[test]
    fn power_change_forgets_volume() {
        let mut store = Store::new();
        apply(&mut store, "power=on");
        apply(&mut store, "volume=45");
        assert_eq!(apply(&mut store, "power=standby"), Flag::POWER);
        assert_eq!(store.state().volume, None);

        apply(&mut store, "volume=12");
        assert_eq!(apply(&mut store, "power=on"), Flag::POWER);
        assert_eq!(store.state().volume, None);
    }

    #[test]
    fn repeated_power_keeps_volume() {
        let mut store = Store::new();
        apply(&mut store, "power=on");
        apply(&mut store, "volume=45");
        assert!(apply(&mut store, "power=on").is_empty());
        assert_eq!(store.state().volume, Some(45));
    }

    #[test]
    fn update_mode_has_no_flag() {
        let mut store = Store::new();
        assert!(apply(&mut store, "update_mode=auto").is_empty());
        assert_eq!(store.state().update_mode, Some(UpdateMode::Auto));
    }

    #[test]
    fn snapshot_is_a_copy_and_reset_forgets() {
        let mut store = Store::new();
        apply(&mut store, "power=on");
        apply(&mut store, "source=pc_usb");
        apply(&mut store, "speaker=a_b");
        apply(&mut store, "mute=on");
        apply(&mut store, "balance=R4");

        let snapshot = store.snapshot();
        apply(&mut store, "source=cd");
        assert_eq!(snapshot.source, Some(Source::PcUsb));
        assert_eq!(snapshot.speaker, Some(Speaker::Both));
        assert_eq!(snapshot.mute, Some(Switch::On));
        assert_eq!(snapshot.balance, Some(Balance::Right(4)));
        assert_eq!(store.state().source, Some(Source::Cd));

        store.reset();
        assert_eq!(store.snapshot(), State::default());
        assert_eq!(store.state().power, None::<Power>);
    }
}
