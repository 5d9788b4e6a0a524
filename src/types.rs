//! This module contains the typed values exchanged with the amplifier.

use strum_macros::{EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Lowest volume accepted by `vol_NN!`.
pub const VOLUME_MIN: u8 = 1;
/// Highest volume the amplifier reports or accepts.
pub const VOLUME_MAX: u8 = 96;
/// Bass and treble lower bound.
pub const TONE_MIN: i8 = -10;
/// Bass and treble upper bound.
pub const TONE_MAX: i8 = 10;
/// Largest balance offset to either side.
pub const BALANCE_MAX: u8 = 15;
/// Brightest front panel dimmer level.
pub const DIMMER_MAX: u8 = 9;

/// Power state as reported by `power=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Power {
    On,
    Standby,
}

/// Used to be less ambiguous about whether something is on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum Switch {
    /// Disabled.
    #[default]
    Off,
    /// Enabled.
    On,
}

impl From<Switch> for bool {
    fn from(value: Switch) -> Self {
        match value {
            Switch::Off => false,
            Switch::On => true,
        }
    }
}

impl From<bool> for Switch {
    fn from(value: bool) -> Self {
        match value {
            true => Switch::On,
            false => Switch::Off,
        }
    }
}

/// Input selection.
///
/// [`Source::Other`] stands for a source name the device reported which is not
/// in the documented table. It can be observed but never selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr)]
pub enum Source {
    #[strum(serialize = "pc_usb")]
    PcUsb,
    #[strum(serialize = "cd")]
    Cd,
    #[strum(serialize = "coax1")]
    Coax1,
    #[strum(serialize = "coax2")]
    Coax2,
    #[strum(serialize = "opt1")]
    Opt1,
    #[strum(serialize = "opt2")]
    Opt2,
    #[strum(serialize = "aux1")]
    Aux1,
    #[strum(serialize = "aux2")]
    Aux2,
    #[strum(serialize = "tuner")]
    Tuner,
    #[strum(serialize = "phono")]
    Phono,
    #[strum(serialize = "usb")]
    Usb,
    #[strum(serialize = "bluetooth")]
    Bluetooth,
    #[strum(serialize = "other")]
    Other,
}

impl Source {
    /// Name used in `source=` reports.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Look up a reported source name. Unknown names map to [`Source::Other`].
    pub fn from_name(name: &str) -> Self {
        use strum::IntoEnumIterator;
        Source::iter()
            .filter(|s| *s != Source::Other)
            .find(|s| s.name() == name)
            .unwrap_or(Source::Other)
    }
}

/// Which speaker outputs are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Speaker {
    A,
    B,
    /// Both outputs, `a_b` on the wire.
    Both,
    Off,
}

impl Speaker {
    pub fn a(self) -> bool {
        matches!(self, Speaker::A | Speaker::Both)
    }

    pub fn b(self) -> bool {
        matches!(self, Speaker::B | Speaker::Both)
    }
}

/// Left/right balance. Offsets are `1..=BALANCE_MAX`, zero is [`Balance::Center`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Balance {
    #[default]
    Center,
    Left(u8),
    Right(u8),
}

impl Balance {
    /// Build from a signed offset, negative is left.
    pub fn from_offset(offset: i8) -> Self {
        match offset {
            0 => Balance::Center,
            o if o < 0 => Balance::Left(o.unsigned_abs()),
            o => Balance::Right(o as u8),
        }
    }

    /// Signed offset, negative is left.
    pub fn offset(self) -> i16 {
        match self {
            Balance::Center => 0,
            Balance::Left(n) => -(n as i16),
            Balance::Right(n) => n as i16,
        }
    }
}

/// Whether the amplifier pushes changes on its own (`rs232_update_on!`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    Auto,
    Manual,
}

/// Discrete actions which carry no value.
///
/// Each variant serializes to its wire token, without the `!` terminator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, EnumString, IntoStaticStr,
)]
pub enum Command {
    #[strum(serialize = "play")]
    Play,
    #[strum(serialize = "stop")]
    Stop,
    #[strum(serialize = "pause")]
    Pause,
    #[strum(serialize = "trkf")]
    TrackNext,
    #[strum(serialize = "trkb")]
    TrackPrev,
    #[strum(serialize = "mute_on")]
    MuteOn,
    #[strum(serialize = "mute_off")]
    MuteOff,
    #[strum(serialize = "mute")]
    MuteToggle,
    #[strum(serialize = "vol_up")]
    VolumeUp,
    #[strum(serialize = "vol_down")]
    VolumeDown,
    #[strum(serialize = "bypass_on")]
    BypassOn,
    #[strum(serialize = "bypass_off")]
    BypassOff,
    #[strum(serialize = "bass_up")]
    BassUp,
    #[strum(serialize = "bass_down")]
    BassDown,
    #[strum(serialize = "bass_000")]
    BassReset,
    #[strum(serialize = "treble_up")]
    TrebleUp,
    #[strum(serialize = "treble_down")]
    TrebleDown,
    #[strum(serialize = "treble_000")]
    TrebleReset,
    #[strum(serialize = "balance_l")]
    BalanceLeft,
    #[strum(serialize = "balance_r")]
    BalanceRight,
    #[strum(serialize = "balance_000")]
    BalanceReset,
    #[strum(serialize = "speaker_a")]
    SpeakerAToggle,
    #[strum(serialize = "speaker_b")]
    SpeakerBToggle,
    #[strum(serialize = "speaker_a_on")]
    SpeakerAOn,
    #[strum(serialize = "speaker_a_off")]
    SpeakerAOff,
    #[strum(serialize = "speaker_b_on")]
    SpeakerBOn,
    #[strum(serialize = "speaker_b_off")]
    SpeakerBOff,
    #[strum(serialize = "dimmer")]
    DimmerToggle,
    #[strum(serialize = "power_toggle")]
    PowerToggle,
    #[strum(serialize = "rs232_update_on")]
    Rs232UpdateOn,
    #[strum(serialize = "rs232_update_off")]
    Rs232UpdateOff,
}

impl Command {
    /// Wire token without terminator.
    pub fn token(self) -> &'static str {
        self.into()
    }

    /// Most commands are ignored by the amplifier in standby, so we refuse them up front.
    pub fn requires_power(self) -> bool {
        !matches!(
            self,
            Command::PowerToggle | Command::Rs232UpdateOn | Command::Rs232UpdateOff
        )
    }
}

/// Requests for the current value of one attribute, issued by the poll scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Query {
    #[strum(serialize = "model?")]
    Model,
    #[strum(serialize = "power?")]
    Power,
    #[strum(serialize = "volume?")]
    Volume,
    #[strum(serialize = "source?")]
    Source,
    #[strum(serialize = "freq?")]
    Freq,
    #[strum(serialize = "bypass?")]
    Bypass,
    #[strum(serialize = "speaker?")]
    Speaker,
    #[strum(serialize = "mute?")]
    Mute,
    #[strum(serialize = "bass?")]
    Bass,
    #[strum(serialize = "treble?")]
    Treble,
    #[strum(serialize = "balance?")]
    Balance,
    #[strum(serialize = "dimmer?")]
    Dimmer,
    /// Not a query as such: asks the device to push its changes from now on.
    #[strum(serialize = "rs232_update_on!")]
    EnableAutoUpdate,
}

impl Query {
    /// Complete wire string, terminator included.
    pub fn wire(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn source_names_round_trip() {
        for source in Source::iter().filter(|s| *s != Source::Other) {
            assert_eq!(Source::from_name(source.name()), source);
        }
        assert_eq!(Source::from_name("radio"), Source::Other);
        assert_eq!(Source::from_name("other"), Source::Other);
    }

    #[test]
    fn command_tokens_parse_back() {
        for command in Command::iter() {
            assert_eq!(Command::from_str(command.token()), Ok(command));
        }
        assert!(Command::from_str("volume").is_err());
    }

    #[test]
    fn command_tokens_are_unique() {
        let mut tokens: Vec<&str> = Command::iter().map(Command::token).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), <Command as strum::EnumCount>::COUNT);
    }

    #[test]
    fn only_power_and_update_commands_work_in_standby() {
        let free: Vec<Command> = Command::iter().filter(|c| !c.requires_power()).collect();
        assert_eq!(
            free,
            vec![
                Command::PowerToggle,
                Command::Rs232UpdateOn,
                Command::Rs232UpdateOff
            ]
        );
    }

    #[test]
    fn balance_offsets() {
        assert_eq!(Balance::from_offset(0), Balance::Center);
        assert_eq!(Balance::from_offset(-3), Balance::Left(3));
        assert_eq!(Balance::from_offset(7), Balance::Right(7));
        assert_eq!(Balance::Left(15).offset(), -15);
        assert_eq!(Balance::Right(2).offset(), 2);
    }

    #[test]
    fn speaker_outputs() {
        assert!(Speaker::Both.a() && Speaker::Both.b());
        assert!(Speaker::A.a() && !Speaker::A.b());
        assert!(!Speaker::Off.a() && !Speaker::Off.b());
    }

    #[test]
    fn switch_bool_conversions() {
        assert_eq!(Switch::from(true), Switch::On);
        assert!(!bool::from(Switch::Off));
    }
}
