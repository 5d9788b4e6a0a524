//! Last known value of every amplifier attribute.

use core::fmt;

use crate::types::{Balance, Power, Source, Speaker, Switch, UpdateMode};

/// One value per observable attribute, `None` where the value is not known yet.
///
/// Everything except `model` and `power` is only meaningful while `power` is
/// [`Power::On`]. A raw snapshot may still hold values cached before the amplifier
/// went to standby; use [`State::applicable`] to drop them.
///
/// The same type is used to request changes with `Amplifier::set`, where `None` means
/// "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub model: Option<String>,
    pub power: Option<Power>,
    /// `0..=VOLUME_MAX`.
    pub volume: Option<u8>,
    pub mute: Option<Switch>,
    pub source: Option<Source>,
    /// Sample rate of the digital input. The amplifier reports `off` for analogue sources,
    /// which [`State::applicable`] turns into `None`.
    pub freq: Option<String>,
    pub bypass: Option<bool>,
    /// `TONE_MIN..=TONE_MAX`.
    pub bass: Option<i8>,
    /// `TONE_MIN..=TONE_MAX`.
    pub treble: Option<i8>,
    pub balance: Option<Balance>,
    pub speaker: Option<Speaker>,
    /// `0..=DIMMER_MAX`.
    pub dimmer: Option<u8>,
    pub update_mode: Option<UpdateMode>,
}

impl State {
    pub fn is_on(&self) -> bool {
        self.power == Some(Power::On)
    }

    /// Copy of this state with every power-gated attribute cleared unless the amplifier is on,
    /// and without a sample rate when there is no digital signal.
    pub fn applicable(&self) -> State {
        if self.is_on() {
            let mut state = self.clone();
            state.freq = state.freq.filter(|freq| freq != "off");
            return state;
        }
        State {
            model: self.model.clone(),
            power: self.power,
            update_mode: self.update_mode,
            ..State::default()
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(model) = &self.model {
            parts.push(format!("model={model}"));
        }
        if let Some(power) = self.power {
            parts.push(format!("power={power:?}"));
        }
        if let Some(volume) = self.volume {
            parts.push(format!("volume={volume}"));
        }
        if let Some(mute) = self.mute {
            parts.push(format!("mute={mute:?}"));
        }
        if let Some(source) = self.source {
            parts.push(format!("source={}", source.name()));
        }
        if let Some(freq) = &self.freq {
            parts.push(format!("freq={freq}"));
        }
        if let Some(bypass) = self.bypass {
            parts.push(format!("bypass={bypass}"));
        }
        if let Some(bass) = self.bass {
            parts.push(format!("bass={bass:+}"));
        }
        if let Some(treble) = self.treble {
            parts.push(format!("treble={treble:+}"));
        }
        if let Some(balance) = self.balance {
            parts.push(format!("balance={:+}", balance.offset()));
        }
        if let Some(speaker) = self.speaker {
            parts.push(format!("speaker={speaker:?}"));
        }
        if let Some(dimmer) = self.dimmer {
            parts.push(format!("dimmer={dimmer}"));
        }
        write!(f, "{{ {} }}", parts.join(" "))
    }
}
