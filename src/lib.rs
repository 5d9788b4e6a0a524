//! This crate provides an interface for monitoring and controlling Rotel amplifiers over RS232.
//!
//! Amplifier models which this should work with:
//! * A12
//! * A14
//!
//! The amplifier accepts `!`-terminated commands and `?`-terminated queries, and reports its
//! state as `$`-terminated `key=value` fields, both in answer to queries and whenever something
//! changes on the front panel or the remote. [`Amplifier`] keeps track of those reports, polls
//! for anything it does not know yet and publishes an [`Event`] whenever the state changes.
//!
//! The serial port used for amplifier comms should be configured like so:
//! * Default baud rate: 115200
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! ```no_run
//! use rotel_rs232::{Amplifier, Command, Config};
//!
//! let amp = Amplifier::open(&Config::new("/dev/ttyUSB0"))?;
//! let events = amp.subscribe();
//! amp.send(Command::MuteToggle).ok();
//! for event in events.events().iter() {
//!     println!("{event:?}");
//! }
//! # Ok::<(), rotel_rs232::error::Error>(())
//! ```

pub mod amp;
pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod framer;
pub mod poll;
pub mod port;
pub mod publisher;
pub mod state;
pub mod store;
pub mod types;

pub use amp::Amplifier;
pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, Flag};
pub use publisher::Subscription;
pub use state::State;
pub use types::{Balance, Command, Power, Query, Source, Speaker, Switch, UpdateMode};

#[cfg(test)]
mod mock_serial;
