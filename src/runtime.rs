use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tracing::warn;

/// Redraw cadence for the running clock.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum TimerEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait TimerEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError>;
}

/// Production event source: a reader thread forwarding crossterm events.
pub struct CrosstermEventSource {
    rx: Receiver<TimerEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => Some(TimerEvent::Key(key)),
                Ok(CtEvent::Mouse(mouse)) => Some(TimerEvent::Mouse(mouse)),
                Ok(CtEvent::Resize(_, _)) => Some(TimerEvent::Resize),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "terminal event reader stopped");
                    break;
                }
            };

            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TimerEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TimerEvent>) -> Self {
        Self { rx }
    }
}

impl TimerEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// Ticks are scheduled against a deadline, so a burst of input events can
/// delay a frame by at most one event, never skip frames indefinitely.
pub struct Runner<E: TimerEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Cell<Instant>,
}

impl<E: TimerEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Cell::new(Instant::now() + ticker.interval());
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Blocks until the next event or the next tick deadline, whichever is first
    pub fn step(&self) -> TimerEvent {
        let now = Instant::now();
        let deadline = self.next_tick.get();
        if now >= deadline {
            self.next_tick.set(now + self.ticker.interval());
            return TimerEvent::Tick;
        }

        match self.event_source.recv_timeout(deadline - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.next_tick.set(Instant::now() + self.ticker.interval());
                TimerEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                // no more input will come; keep ticking at the frame rate
                std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                self.next_tick.set(Instant::now() + self.ticker.interval());
                TimerEvent::Tick
            }
        }
    }
}
