//! Mapping between typed values and the amplifier's ASCII protocol.
//!
//! The amplifier accepts `!`-terminated commands and `?`-terminated queries, and reports
//! its state as `key=value` fields each terminated by `$`. The functions here are pure: they
//! never touch the interface or the state store.
//!
//! Ref: Rotel A12/A14 RS232 protocol.

use crate::{
    error::{Error, Result},
    types::{
        BALANCE_MAX, Balance, Command, DIMMER_MAX, Power, Source, Speaker, Switch, TONE_MAX,
        TONE_MIN, UpdateMode, VOLUME_MAX, VOLUME_MIN,
    },
};

/// One decoded `key=value` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Model(String),
    Power(Power),
    Volume(u8),
    UpdateMode(UpdateMode),
    Bass(i8),
    Treble(i8),
    Balance(Balance),
    Mute(Switch),
    Source(Source),
    Freq(String),
    Bypass(bool),
    Speaker(Speaker),
    Dimmer(u8),
}

type Decoder = fn(&str) -> Option<Field>;

/// Grammar of every field the amplifier emits, keyed by the text before `=`.
const DECODERS: &[(&str, Decoder)] = &[
    ("model", |v: &str| word(v).map(|v| Field::Model(v.to_owned()))),
    ("power", |v: &str| match v {
        "on" => Some(Field::Power(Power::On)),
        "standby" => Some(Field::Power(Power::Standby)),
        _ => None,
    }),
    ("volume", |v: &str| {
        unsigned(v)
            .filter(|n| *n <= VOLUME_MAX)
            .map(Field::Volume)
    }),
    ("update_mode", |v: &str| match v {
        "auto" => Some(Field::UpdateMode(UpdateMode::Auto)),
        "manual" => Some(Field::UpdateMode(UpdateMode::Manual)),
        _ => None,
    }),
    ("bass", |v: &str| tone(v).map(Field::Bass)),
    ("treble", |v: &str| tone(v).map(Field::Treble)),
    ("balance", |v: &str| balance(v).map(Field::Balance)),
    ("mute", |v: &str| switch(v).map(Field::Mute)),
    ("source", |v: &str| word(v).map(|v| Field::Source(Source::from_name(v)))),
    ("freq", |v: &str| (!v.is_empty()).then(|| Field::Freq(v.to_owned()))),
    ("bypass", |v: &str| switch(v).map(|s| Field::Bypass(s.into()))),
    ("speaker", |v: &str| match v {
        "a" => Some(Field::Speaker(Speaker::A)),
        "b" => Some(Field::Speaker(Speaker::B)),
        "a_b" => Some(Field::Speaker(Speaker::Both)),
        "off" => Some(Field::Speaker(Speaker::Off)),
        _ => None,
    }),
    ("dimmer", |v: &str| {
        unsigned(v)
            .filter(|n| *n <= DIMMER_MAX)
            .map(Field::Dimmer)
    }),
];

/// Decode one field, already stripped of its `$` terminator.
pub fn decode(field: &str) -> Result<Field> {
    let invalid = || Error::InvalidResponse(field.to_owned());
    let (key, value) = field.split_once('=').ok_or_else(invalid)?;
    let (_, decoder) = DECODERS
        .iter()
        .find(|(k, _)| *k == key)
        .ok_or_else(invalid)?;
    decoder(value).ok_or_else(invalid)
}

/// `\w+`
fn word(value: &str) -> Option<&str> {
    let ok = !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    ok.then_some(value)
}

/// `\d+` that fits in a byte.
fn unsigned(value: &str) -> Option<u8> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// `[+-]?\d+` within the tone range.
fn tone(value: &str) -> Option<i8> {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    unsigned(digits)?;
    value
        .parse::<i8>()
        .ok()
        .filter(|t| (TONE_MIN..=TONE_MAX).contains(t))
}

/// `[LR]?\d+`. A zero offset is centred whatever the prefix, any other offset needs one.
fn balance(value: &str) -> Option<Balance> {
    let (side, digits) = match value.as_bytes().first()? {
        b'L' => (Some(true), &value[1..]),
        b'R' => (Some(false), &value[1..]),
        _ => (None, value),
    };
    let offset = unsigned(digits).filter(|n| *n <= BALANCE_MAX)?;
    match (side, offset) {
        (_, 0) => Some(Balance::Center),
        (Some(true), n) => Some(Balance::Left(n)),
        (Some(false), n) => Some(Balance::Right(n)),
        (None, _) => None,
    }
}

fn switch(value: &str) -> Option<Switch> {
    match value {
        "on" => Some(Switch::On),
        "off" => Some(Switch::Off),
        _ => None,
    }
}

/// `power_on!` / `power_off!`.
pub fn encode_power(power: Power) -> String {
    match power {
        Power::On => "power_on!".into(),
        Power::Standby => "power_off!".into(),
    }
}

/// `vol_NN!`, `NN` in `VOLUME_MIN..=VOLUME_MAX`.
pub fn encode_volume(volume: u8) -> Result<String> {
    if !(VOLUME_MIN..=VOLUME_MAX).contains(&volume) {
        return Err(Error::InvalidRange {
            what: "volume",
            value: volume as i32,
        });
    }
    Ok(format!("vol_{volume:02}!"))
}

/// Input selection. `pc_usb` is spelled `pcusb` in commands.
pub fn encode_source(source: Source) -> Result<String> {
    match source {
        Source::Other => Err(Error::UnknownSource),
        Source::PcUsb => Ok("pcusb!".into()),
        source => Ok(format!("{}!", source.name())),
    }
}

pub fn encode_mute(mute: Switch) -> String {
    match mute {
        Switch::On => "mute_on!".into(),
        Switch::Off => "mute_off!".into(),
    }
}

pub fn encode_bypass(bypass: bool) -> String {
    match bypass {
        true => "bypass_on!".into(),
        false => "bypass_off!".into(),
    }
}

/// `bass_000!`, `bass_+N!` or `bass_-N!`.
pub fn encode_bass(bass: i8) -> Result<String> {
    encode_tone("bass", bass)
}

/// `treble_000!`, `treble_+N!` or `treble_-N!`.
pub fn encode_treble(treble: i8) -> Result<String> {
    encode_tone("treble", treble)
}

fn encode_tone(what: &'static str, value: i8) -> Result<String> {
    if !(TONE_MIN..=TONE_MAX).contains(&value) {
        return Err(Error::InvalidRange {
            what,
            value: value as i32,
        });
    }
    Ok(match value {
        0 => format!("{what}_000!"),
        v => format!("{what}_{v:+}!"),
    })
}

/// `balance_000!`, `balance_LN!` or `balance_RN!`.
pub fn encode_balance(balance: Balance) -> Result<String> {
    let check = |n: u8| {
        if (1..=BALANCE_MAX).contains(&n) {
            Ok(n)
        } else {
            Err(Error::InvalidRange {
                what: "balance",
                value: balance.offset() as i32,
            })
        }
    };
    Ok(match balance {
        Balance::Center => "balance_000!".into(),
        Balance::Left(n) => format!("balance_L{}!", check(n)?),
        Balance::Right(n) => format!("balance_R{}!", check(n)?),
    })
}

/// `dimmer_N!`, `N` in `0..=DIMMER_MAX`.
pub fn encode_dimmer(dimmer: u8) -> Result<String> {
    if dimmer > DIMMER_MAX {
        return Err(Error::InvalidRange {
            what: "dimmer",
            value: dimmer as i32,
        });
    }
    Ok(format!("dimmer_{dimmer}!"))
}

pub fn encode_command(command: Command) -> String {
    format!("{}!", command.token())
}
