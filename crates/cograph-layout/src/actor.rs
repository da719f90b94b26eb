//! Runs a [`Session`] on its own tokio task.
//!
//! The task is the only owner of the session. Hosts talk to it through a
//! bounded command channel and read snapshots from a bounded event channel;
//! nothing is shared. Commands are applied in arrival order, each one fully
//! before the next tick.
//!
//! Tick snapshots are offered with `try_send`: a host that falls behind
//! misses intermediate frames and the tick loop never waits on it. The
//! latest snapshot that did not fit is held back and delivered before the
//! session stops ticking, so the final state always arrives. `end` events
//! and snapshots caused directly by a command are always delivered.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, trace};

use crate::protocol::{Command, Event, TickSnapshot};
use crate::session::Session;
use crate::{LayoutError, Result};

/// How often a running session ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickCadence {
    /// One tick per period, skipping missed periods.
    Interval(Duration),
    /// Back-to-back, yielding to the runtime between ticks.
    Immediate,
}

impl Default for TickCadence {
    fn default() -> Self {
        TickCadence::Interval(Duration::from_millis(16))
    }
}

/// Actor settings.
#[derive(Debug, Clone)]
pub struct ActorConfig {
    pub cadence: TickCadence,
    /// Commands buffered before `send` waits.
    pub command_capacity: usize,
    /// Events buffered before tick snapshots are dropped.
    pub event_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            cadence: TickCadence::default(),
            command_capacity: 64,
            event_capacity: 256,
        }
    }
}

enum Message {
    Command(Command),
    Shutdown,
}

/// Sending side of a running simulation. Cheap to clone.
///
/// The task stops once every handle is dropped or [`shutdown`] is called.
///
/// [`shutdown`]: SimulationHandle::shutdown
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    inbox: mpsc::Sender<Message>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Command(cmd) => f.debug_tuple("Command").field(cmd).finish(),
            Message::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl SimulationHandle {
    /// Start a simulation task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(config: ActorConfig) -> (Self, EventStream) {
        let (inbox_tx, inbox_rx) = mpsc::channel(config.command_capacity.max(1));
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity.max(1));

        let actor = Actor {
            session: Session::new(),
            inbox: inbox_rx,
            outbox: event_tx,
            ticker: Ticker::new(config.cadence),
            held: None,
        };
        tokio::spawn(actor.run());

        (Self { inbox: inbox_tx }, EventStream { events: event_rx })
    }

    /// Queue a command, waiting for room if the inbox is full.
    pub async fn send(&self, command: Command) -> Result<()> {
        self.inbox
            .send(Message::Command(command))
            .await
            .map_err(|_| LayoutError::Disconnected)
    }

    /// Stop the task. No events are emitted after it has processed this.
    pub async fn shutdown(&self) -> Result<()> {
        self.inbox
            .send(Message::Shutdown)
            .await
            .map_err(|_| LayoutError::Disconnected)
    }

    /// Whether the task has gone away.
    pub fn is_closed(&self) -> bool {
        self.inbox.is_closed()
    }
}

/// Receiving side of a running simulation.
#[derive(Debug)]
pub struct EventStream {
    events: mpsc::Receiver<Event>,
}

impl EventStream {
    /// Next event, or `None` once the task has stopped.
    pub async fn recv(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Next event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.events.try_recv().ok()
    }
}

enum Ticker {
    Interval(Interval),
    Immediate,
}

impl Ticker {
    fn new(cadence: TickCadence) -> Self {
        match cadence {
            TickCadence::Interval(period) => {
                let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                Ticker::Interval(interval)
            }
            TickCadence::Immediate => Ticker::Immediate,
        }
    }

    async fn wait(&mut self) {
        match self {
            Ticker::Interval(interval) => {
                interval.tick().await;
            }
            Ticker::Immediate => tokio::task::yield_now().await,
        }
    }
}

struct Actor {
    session: Session,
    inbox: mpsc::Receiver<Message>,
    outbox: mpsc::Sender<Event>,
    ticker: Ticker,
    /// Newest snapshot dropped for lack of room.
    held: Option<TickSnapshot>,
}

impl Actor {
    async fn run(mut self) {
        debug!("Simulation task started");
        loop {
            let flow = if self.session.is_running() {
                tokio::select! {
                    biased;
                    message = self.inbox.recv() => self.on_message(message).await,
                    _ = self.ticker.wait() => self.on_tick().await,
                }
            } else {
                let message = self.inbox.recv().await;
                self.on_message(message).await
            };
            if flow.is_break() {
                break;
            }
            if !self.session.is_running() && self.flush().await.is_break() {
                break;
            }
        }
        debug!("Simulation task stopped");
    }

    async fn on_message(&mut self, message: Option<Message>) -> ControlFlow<()> {
        match message {
            Some(Message::Command(command)) => match self.session.apply(command) {
                Some(event) => self.deliver(event).await,
                None => ControlFlow::Continue(()),
            },
            Some(Message::Shutdown) | None => ControlFlow::Break(()),
        }
    }

    async fn on_tick(&mut self) -> ControlFlow<()> {
        match self.session.tick() {
            Some(Event::Tick(snapshot)) => match self.outbox.try_send(Event::Tick(snapshot)) {
                Ok(()) => {
                    self.held = None;
                    ControlFlow::Continue(())
                }
                Err(TrySendError::Full(Event::Tick(snapshot))) => {
                    trace!("Host lagging, held back tick {}", self.session.tick_count());
                    self.held = Some(snapshot);
                    ControlFlow::Continue(())
                }
                Err(TrySendError::Full(_)) => ControlFlow::Continue(()),
                Err(TrySendError::Closed(_)) => ControlFlow::Break(()),
            },
            Some(event) => self.deliver(event).await,
            None => ControlFlow::Continue(()),
        }
    }

    /// Send `event`, first flushing a held-back snapshot unless `event`
    /// is itself a newer snapshot.
    async fn deliver(&mut self, event: Event) -> ControlFlow<()> {
        if matches!(event, Event::Tick(_)) {
            self.held = None;
        } else if self.flush().await.is_break() {
            return ControlFlow::Break(());
        }
        if self.outbox.send(event).await.is_err() {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    async fn flush(&mut self) -> ControlFlow<()> {
        let Some(snapshot) = self.held.take() else {
            return ControlFlow::Continue(());
        };
        if self.outbox.send(Event::Tick(snapshot)).await.is_err() {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}
