//! The amplifier engine: one worker thread owning the serial interface.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use embedded_io::Error as _;
use parking_lot::{Mutex, MutexGuard};

use crate::{
    codec,
    config::Config,
    error::{Error, Result},
    event::{Event, Flag},
    framer::Framer,
    poll::next_query,
    port::SerialPort,
    publisher::{Publisher, Subscription},
    state::State,
    store::Store,
    types::Command,
};

/// Bytes taken from the interface per read.
const READ_CHUNK: usize = 64;
/// Pause after a read which returned nothing, so a non-blocking interface does not spin.
const IDLE_BACKOFF: Duration = Duration::from_millis(20);

/// The serial interface and the partial field read from it so far.
struct Link<S> {
    interface: S,
    framer: Framer,
}

/// Everything the worker and the callers share.
struct Shared<S> {
    /// `None` once the engine is closed.
    link: Mutex<Option<Link<S>>>,
    store: Mutex<Store>,
    publisher: Publisher,
    config: Config,
}

struct Worker {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

/// Controls one Rotel amplifier over any interface which implements [embedded_io::Read] &
/// [embedded_io::Write].
///
/// A background thread reads the amplifier's reports, keeps the last known [`State`] and
/// publishes an [`Event`] for every change. Unknown attributes are discovered by polling.
/// [`Amplifier::set`] and [`Amplifier::send`] only write to the amplifier: their effect is
/// observed through events once the amplifier reports it.
///
/// All methods take `&self`, so an engine can be shared between threads behind an `Arc`.
pub struct Amplifier<S: embedded_io::Read + embedded_io::Write + Send + 'static> {
    shared: Arc<Shared<S>>,
    worker: Mutex<Option<Worker>>,
}

impl Amplifier<SerialPort> {
    /// Open the serial device named in `config` and start the engine on it.
    pub fn open(config: &Config) -> Result<Self> {
        let port = SerialPort::open(config)?;
        Ok(Self::new(port, config))
    }
}

impl<S: embedded_io::Read + embedded_io::Write + Send + 'static> Amplifier<S> {
    /// Start the engine on `interface`, which should have a short read timeout.
    pub fn new(interface: S, config: &Config) -> Self {
        let amp = Self::idle(interface, config);
        let (shutdown, done) = channel::bounded(1);
        let shared = Arc::clone(&amp.shared);
        let handle = thread::spawn(move || shared.run(done));
        *amp.worker.lock() = Some(Worker { shutdown, handle });
        amp
    }

    /// An engine without its worker thread.
    fn idle(interface: S, config: &Config) -> Self {
        Self {
            shared: Arc::new(Shared {
                link: Mutex::new(Some(Link {
                    interface,
                    framer: Framer::new(),
                })),
                store: Mutex::new(Store::new()),
                publisher: Publisher::new(config.event_capacity),
                config: config.clone(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Current state, with power-gated attributes cleared unless the amplifier is on.
    pub fn get(&self) -> State {
        self.shared.store.lock().state().applicable()
    }

    /// Model name reported by the amplifier, empty until known.
    pub fn model(&self) -> String {
        self.shared
            .store
            .lock()
            .state()
            .model
            .clone()
            .unwrap_or_default()
    }

    /// Move the amplifier towards `request`.
    ///
    /// Attributes which are `None` or already have the requested value are skipped, as are the
    /// read-only `model`, `freq`, `speaker` and `update_mode`. Every remaining attribute is
    /// validated before anything is written, so an invalid request writes nothing.
    pub fn set(&self, request: &State) -> Result<()> {
        self.shared.ensure_open()?;
        let current = self.shared.store.lock().snapshot();
        let commands = plan(&current, request)?;
        if commands.is_empty() {
            return Ok(());
        }
        self.shared.write(&commands)
    }

    /// Send a discrete command.
    ///
    /// Only [`Command::PowerToggle`] and the RS232 update mode commands are accepted while the
    /// amplifier is not on.
    pub fn send(&self, command: Command) -> Result<()> {
        self.shared.ensure_open()?;
        if command.requires_power() && !self.shared.store.lock().state().is_on() {
            return Err(Error::OutOfOrder(command.token()));
        }
        self.shared.write(&[codec::encode_command(command)])
    }

    pub fn subscribe(&self) -> Subscription {
        self.shared.publisher.subscribe()
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.shared.publisher.unsubscribe(subscription)
    }

    /// Stop the worker, release the interface and end every subscription.
    ///
    /// Returns [`Error::Closed`] if the engine was already closed.
    pub fn close(&self) -> Result<()> {
        let worker = self.worker.lock().take();
        if worker.is_none() && !self.shared.is_open() {
            return Err(Error::Closed);
        }
        if let Some(Worker { shutdown, handle }) = worker {
            // The worker may already be gone after a fatal error.
            let _ = shutdown.send(());
            if handle.join().is_err() {
                tracing::warn!("worker thread panicked");
            }
        }
        self.shared.shutdown();
        Ok(())
    }
}

impl<S: embedded_io::Read + embedded_io::Write + Send + 'static> Drop for Amplifier<S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl<S: embedded_io::Read + embedded_io::Write> Shared<S> {
    fn run(&self, shutdown: Receiver<()>) {
        tracing::info!("worker started");
        let mut last_poll: Option<Instant> = None;
        loop {
            match shutdown.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => break,
            }

            let idle = match self.receive() {
                Ok(received) => !received,
                Err(err) => {
                    let fatal = err.is_fatal();
                    self.publish(Event::Failed(err));
                    if fatal {
                        tracing::warn!("serial interface lost");
                        self.shutdown();
                        break;
                    }
                    true
                }
            };

            if last_poll.is_none_or(|at| at.elapsed() >= self.config.poll_interval) {
                last_poll = Some(Instant::now());
                // Write failures were already published.
                let _ = self.poll();
            }

            if idle {
                match shutdown.recv_timeout(IDLE_BACKOFF) {
                    Err(RecvTimeoutError::Timeout) => {}
                    _ => break,
                }
            }
        }
        tracing::info!("worker stopped");
    }

    /// Read one chunk and apply every field it completes.
    ///
    /// Returns whether any bytes arrived. A read timeout is not an error. After any other read
    /// error the partial field is dropped, since bytes of it may have been lost.
    fn receive(&self) -> Result<bool> {
        let mut buf = [0u8; READ_CHUNK];
        let mut guard = self.link.lock();
        let link = guard.as_mut().ok_or(Error::Closed)?;
        let fields = match embedded_io::Read::read(&mut link.interface, &mut buf) {
            Ok(0) => return Ok(false),
            Ok(n) => link.framer.push(&buf[..n]),
            Err(err) if is_idle(err.kind()) => return Ok(false),
            Err(err) => {
                link.framer.reset();
                return Err(Error::serial(err));
            }
        };
        MutexGuard::unlock_fair(guard);

        self.apply(fields);
        Ok(true)
    }

    /// Apply one batch of fields and publish what changed, then what failed.
    fn apply(&self, fields: Vec<String>) {
        let mut flags = Flag::empty();
        let mut errors = Vec::new();
        let mut store = self.store.lock();
        for field in fields {
            tracing::trace!(%field, "field");
            match codec::decode(&field) {
                Ok(value) => flags |= store.apply(value),
                Err(err) => {
                    tracing::warn!(%err, "ignoring field");
                    errors.push(err);
                }
            }
        }
        let state = (!flags.is_empty()).then(|| store.state().applicable());
        drop(store);

        if let Some(state) = state {
            self.publish(Event::Changed { flags, state });
        }
        if let Some(err) = Error::collect(errors) {
            self.publish(Event::Failed(err));
        }
    }

    /// Ask for the next unknown attribute, if any.
    fn poll(&self) -> Result<()> {
        let query = next_query(self.store.lock().state(), self.config.auto_update);
        match query {
            Some(query) => self.write(&[query.wire()]),
            None => Ok(()),
        }
    }

    /// Write `commands` back to back, holding the interface for all of them.
    fn write<T: AsRef<str>>(&self, commands: &[T]) -> Result<()> {
        let result = self.transmit(commands);
        if let Err(err) = &result {
            if !matches!(err, Error::Closed) {
                self.publish(Event::Failed(err.clone()));
            }
        }
        result
    }

    fn transmit<T: AsRef<str>>(&self, commands: &[T]) -> Result<()> {
        let mut guard = self.link.lock();
        let link = guard.as_mut().ok_or(Error::Closed)?;
        for command in commands {
            let command = command.as_ref();
            tracing::debug!(command, "write");
            link.interface
                .write_all(command.as_bytes())
                .map_err(Error::serial)?;
        }
        link.interface.flush().map_err(Error::serial)
    }

    fn publish(&self, event: Event) {
        tracing::debug!(?event, "event");
        // Blocked subscribers are logged by the publisher.
        let _ = self.publisher.emit(event);
    }

    fn is_open(&self) -> bool {
        self.link.lock().is_some()
    }

    fn ensure_open(&self) -> Result<()> {
        match self.is_open() {
            true => Ok(()),
            false => Err(Error::Closed),
        }
    }

    /// Drop the interface, forget the state and end every subscription. Safe to call more
    /// than once.
    fn shutdown(&self) {
        if let Some(link) = self.link.lock().take() {
            let pending = link.framer.pending().len();
            tracing::info!(pending, "serial interface closed");
        }
        self.store.lock().reset();
        self.publisher.close();
    }
}

/// Read errors which only mean that nothing arrived within the timeout.
fn is_idle(kind: embedded_io::ErrorKind) -> bool {
    matches!(
        kind,
        embedded_io::ErrorKind::TimedOut | embedded_io::ErrorKind::Interrupted
    )
}

/// Value of `want` if it differs from `have`.
fn changed<T: PartialEq + Copy>(want: Option<T>, have: Option<T>) -> Option<T> {
    want.filter(|want| have != Some(*want))
}

/// Commands which move `current` towards `request`, in the order they are written.
fn plan(current: &State, request: &State) -> Result<Vec<String>> {
    let mut commands = Vec::new();
    if let Some(power) = changed(request.power, current.power) {
        commands.push(codec::encode_power(power));
    }

    let mut gated: Vec<(&'static str, Result<String>)> = Vec::new();
    if let Some(volume) = changed(request.volume, current.volume) {
        gated.push(("volume", codec::encode_volume(volume)));
    }
    if let Some(source) = changed(request.source, current.source) {
        gated.push(("source", codec::encode_source(source)));
    }
    if let Some(mute) = changed(request.mute, current.mute) {
        gated.push(("mute", Ok(codec::encode_mute(mute))));
    }
    if let Some(bypass) = changed(request.bypass, current.bypass) {
        gated.push(("bypass", Ok(codec::encode_bypass(bypass))));
    }
    if let Some(treble) = changed(request.treble, current.treble) {
        gated.push(("treble", codec::encode_treble(treble)));
    }
    if let Some(bass) = changed(request.bass, current.bass) {
        gated.push(("bass", codec::encode_bass(bass)));
    }
    if let Some(balance) = changed(request.balance, current.balance) {
        gated.push(("balance", codec::encode_balance(balance)));
    }
    if let Some(dimmer) = changed(request.dimmer, current.dimmer) {
        gated.push(("dimmer", codec::encode_dimmer(dimmer)));
    }

    if let Some(&(what, _)) = gated.first() {
        if !current.is_on() {
            return Err(Error::OutOfOrder(what));
        }
    }
    for (_, command) in gated {
        commands.push(command?);
    }
    Ok(commands)
}
