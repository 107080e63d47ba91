//! Event loop and control-surface handle.
//!
//! [`spawn`] moves a [`ControllerSession`] into a dedicated thread that
//! drains the [`EventQueue`] one event at a time.  That thread is the
//! session's only owner, so ticks, commands and link events are
//! serialized without locks.
//!
//! Tick cancellation uses generations: every `Start` spawns a
//! [`Ticker`] with a fresh generation, every `Stop` joins the ticker and
//! bumps the generation, so ticks still queued from before the stop are
//! recognised as stale and skipped.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::commands::AppCommand;
use crate::app::ports::{ActuatorPort, Clock, EventSink, SensorModel};
use crate::app::service::{ControllerSession, SessionSnapshot};
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::events::{Event, EventQueue};
use crate::telemetry::envelope::OutboundMessage;
use crate::telemetry::transport::Transport;
use crate::timer::Ticker;

/// How long [`ControllerHandle::snapshot`] waits for the loop to answer.
const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);

// ───────────────────────────────────────────────────────────────
// Control-surface handle
// ───────────────────────────────────────────────────────────────

/// Cloneable, thread-safe entry point into a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    queue: EventQueue,
    closed: Arc<AtomicBool>,
}

impl ControllerHandle {
    pub fn start(&self) -> Result<()> {
        self.command(AppCommand::Start)
    }

    /// Stop ticking.  Once the loop processes this, no further tick runs.
    pub fn stop(&self) -> Result<()> {
        self.command(AppCommand::Stop)
    }

    pub fn update_config(&self, config: Configuration) -> Result<()> {
        self.command(AppCommand::UpdateConfig(config))
    }

    pub fn set_pump_power(&self, percent: u8) -> Result<()> {
        self.command(AppCommand::SetPumpPower(percent))
    }

    pub fn set_humidity_threshold(&self, percent: f32) -> Result<()> {
        self.command(AppCommand::SetHumidityThreshold(percent))
    }

    pub fn set_manual_override(&self, on: bool) -> Result<()> {
        self.command(AppCommand::SetManualOverride(on))
    }

    /// Queue an envelope for the telemetry channel (dropped unless open).
    pub fn send(&self, msg: OutboundMessage) -> Result<()> {
        self.command(AppCommand::Send(msg))
    }

    /// Consistent copy of the session state, taken between events.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        let (tx, rx) = mpsc::channel();
        self.command(AppCommand::Snapshot(tx))?;
        rx.recv_timeout(SNAPSHOT_TIMEOUT)
            .map_err(|_| Error::Runtime("snapshot not answered"))
    }

    /// Ask the loop to stop ticking, close the link and exit.  Idempotent.
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.queue.push(Event::Shutdown);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn command(&self, cmd: AppCommand) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Runtime("controller is shut down"));
        }
        self.queue.push(Event::Command(cmd));
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Runtime
// ───────────────────────────────────────────────────────────────

/// A running event loop.
pub struct Runtime {
    handle: ControllerHandle,
    thread: JoinHandle<()>,
}

impl Runtime {
    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Wait for the loop to exit (after [`ControllerHandle::shutdown`]).
    pub fn join(self) -> Result<()> {
        self.thread
            .join()
            .map_err(|_| Error::Runtime("event loop panicked"))
    }
}

/// Move `session` into a new event-loop thread.  The loop starts idle;
/// send [`AppCommand::Start`] to begin ticking every `interval`.
pub fn spawn<S, C, T, A, K>(
    session: ControllerSession<S, C, T>,
    actuator: A,
    sink: K,
    queue: EventQueue,
    interval: Duration,
) -> io::Result<Runtime>
where
    S: SensorModel + Send + 'static,
    C: Clock + Send + 'static,
    T: Transport + Send + 'static,
    A: ActuatorPort + Send + 'static,
    K: EventSink + Send + 'static,
{
    let closed = Arc::new(AtomicBool::new(false));
    let handle = ControllerHandle {
        queue: queue.clone(),
        closed: closed.clone(),
    };
    let mut event_loop = EventLoop {
        session,
        actuator,
        sink,
        queue,
        interval,
        ticker: None,
        generation: 0,
    };
    let thread = thread::Builder::new()
        .name("control-loop".into())
        .spawn(move || {
            event_loop.run();
            closed.store(true, Ordering::Release);
            event_loop.discard_pending();
        })?;
    Ok(Runtime { handle, thread })
}

struct EventLoop<S, C, T: Transport, A, K> {
    session: ControllerSession<S, C, T>,
    actuator: A,
    sink: K,
    queue: EventQueue,
    interval: Duration,
    ticker: Option<Ticker>,
    generation: u64,
}

impl<S, C, T, A, K> EventLoop<S, C, T, A, K>
where
    S: SensorModel,
    C: Clock,
    T: Transport,
    A: ActuatorPort,
    K: EventSink,
{
    fn run(&mut self) {
        info!("Event loop running");
        loop {
            match self.queue.recv() {
                Event::ControlTick { generation } => {
                    if self.session.is_running() && generation == self.generation {
                        self.session.tick(&mut self.actuator, &mut self.sink);
                    } else {
                        debug!("Stale tick (generation {}) skipped", generation);
                    }
                }
                Event::Link(event) => self.session.handle_link_event(event, &mut self.sink),
                Event::Command(AppCommand::Start) => self.start_ticking(),
                Event::Command(AppCommand::Stop) => {
                    self.stop_ticking();
                    self.session.stop(&mut self.sink);
                }
                Event::Command(cmd) => self.session.handle_command(cmd, &mut self.sink),
                Event::Shutdown => {
                    self.stop_ticking();
                    self.session.shutdown(&mut self.actuator, &mut self.sink);
                    break;
                }
            }
        }
        info!("Event loop exited after {} ticks", self.session.tick_count());
    }

    fn start_ticking(&mut self) {
        if !self.session.start(&mut self.sink) {
            return;
        }
        self.generation += 1;
        match Ticker::spawn(self.interval, self.generation, self.queue.clone()) {
            Ok(ticker) => self.ticker = Some(ticker),
            Err(e) => {
                warn!("Ticker spawn failed: {}", e);
                self.session.stop(&mut self.sink);
            }
        }
    }

    fn stop_ticking(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
        self.generation += 1;
    }

    /// Drop events queued behind `Shutdown` so pending snapshot
    /// requesters are released immediately.
    fn discard_pending(&mut self) {
        let mut dropped = 0usize;
        while self.queue.try_recv().is_some() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("Discarded {} events after shutdown", dropped);
        }
    }
}
