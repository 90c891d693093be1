//! Hold-to-start, press-to-stop timing.
//!
//! ```text
//! Idle --engage--> Holding --(550ms)--> Ready --release--> Running --engage--> Idle
//!                     |                                                          ^
//!                     +------------------release (too early)---------------------+
//! ```
//!
//! The hold delay and the frame loop are plain values owned by the handle.
//! Leaving a phase drops them, so nothing stale can fire afterwards. Time only
//! moves forward when the owner calls [`TimerHandle::feed`] or
//! [`TimerHandle::on_frame`]; there are no threads here.

use crate::input::{Gesture, InputSurface};
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How long the start input must be held before the timer arms.
pub const HOLD_DELAY: Duration = Duration::from_millis(550);

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum TimerPhase {
    #[default]
    Idle,
    Holding,
    Ready,
    Running,
}

/// One-shot delay armed on entering `Holding`.
#[derive(Debug)]
struct HoldDelay {
    due: Instant,
}

impl HoldDelay {
    fn arm(now: Instant) -> Self {
        Self {
            due: now + HOLD_DELAY,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}

/// Live display refresh while `Running`. Its value is never recorded.
#[derive(Debug)]
struct FrameLoop {
    started: Instant,
}

impl FrameLoop {
    fn start(now: Instant) -> Self {
        Self { started: now }
    }

    fn frame(&self, now: Instant) -> u64 {
        elapsed_ms(self.started, now)
    }
}

fn elapsed_ms(start: Instant, end: Instant) -> u64 {
    end.saturating_duration_since(start).as_millis() as u64
}

pub type StopCallback = Box<dyn FnMut(u64)>;

pub struct TimerHandle<C: Clock = SystemClock> {
    clock: C,
    phase: TimerPhase,
    hold: Option<HoldDelay>,
    frames: Option<FrameLoop>,
    start_instant: Option<Instant>,
    display_ms: u64,
    surface: InputSurface,
    on_stop: StopCallback,
}

/// Build a timer on the system clock. `on_stop` receives the elapsed
/// milliseconds of every completed attempt.
pub fn create_timer<F>(on_stop: F) -> TimerHandle
where
    F: FnMut(u64) + 'static,
{
    TimerHandle::with_clock(SystemClock, on_stop)
}

impl<C: Clock> TimerHandle<C> {
    pub fn with_clock<F>(clock: C, on_stop: F) -> Self
    where
        F: FnMut(u64) + 'static,
    {
        Self {
            clock,
            phase: TimerPhase::Idle,
            hold: None,
            frames: None,
            start_instant: None,
            display_ms: 0,
            surface: InputSurface::default(),
            on_stop: Box::new(on_stop),
        }
    }

    /// Listen to the given devices, replacing any previous surface.
    pub fn attach(&mut self, surface: InputSurface) {
        self.surface = surface;
    }

    /// Move the pointer surface, e.g. after a terminal resize.
    pub fn attach_pointer(&mut self, area: Rect) {
        if let Some(pointer) = self.surface.pointer.as_mut() {
            *pointer = crate::input::PointerAdapter::new(area);
        }
    }

    pub fn surface(&self) -> &InputSurface {
        &self.surface
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Value for the on-screen clock: live while running, otherwise the last
    /// result (zeroed once the timer is armed).
    pub fn display_ms(&self) -> u64 {
        self.display_ms
    }

    pub fn start_instant(&self) -> Option<Instant> {
        self.start_instant
    }

    pub fn is_hold_pending(&self) -> bool {
        self.hold.is_some()
    }

    pub fn is_frame_loop_active(&self) -> bool {
        self.frames.is_some()
    }

    /// Returns true when the key belonged to the timer.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match self.surface.key(key) {
            Some(gesture) => {
                self.feed(gesture);
                true
            }
            None => false,
        }
    }

    pub fn handle_mouse(&mut self, event: &MouseEvent) -> bool {
        match self.surface.mouse(event) {
            Some(gesture) => {
                self.feed(gesture);
                true
            }
            None => false,
        }
    }

    pub fn feed(&mut self, gesture: Gesture) {
        let now = self.clock.now();
        // a release right after the delay must see Ready even without a frame in between
        self.fire_hold_if_due(now);

        match (self.phase, gesture) {
            (TimerPhase::Idle, Gesture::Engage) => {
                self.hold = Some(HoldDelay::arm(now));
                self.set_phase(TimerPhase::Holding);
            }
            (TimerPhase::Holding, Gesture::Release) => {
                self.hold = None;
                self.set_phase(TimerPhase::Idle);
            }
            (TimerPhase::Ready, Gesture::Release) => {
                self.start_instant = Some(now);
                self.frames = Some(FrameLoop::start(now));
                self.display_ms = 0;
                self.set_phase(TimerPhase::Running);
            }
            (TimerPhase::Running, Gesture::Engage) => self.stop(now),
            _ => {}
        }
    }

    /// Animation tick: fires a due hold delay and refreshes the live display.
    pub fn on_frame(&mut self) {
        let now = self.clock.now();
        self.fire_hold_if_due(now);
        if let Some(frames) = &self.frames {
            self.display_ms = frames.frame(now);
        }
    }

    /// Back to `Idle` without reporting a time.
    pub fn reset(&mut self) {
        self.hold = None;
        self.frames = None;
        self.start_instant = None;
        self.display_ms = 0;
        if self.phase != TimerPhase::Idle {
            self.set_phase(TimerPhase::Idle);
        }
    }

    fn fire_hold_if_due(&mut self, now: Instant) {
        if self.phase == TimerPhase::Holding && self.hold.as_ref().is_some_and(|h| h.is_due(now)) {
            self.hold = None;
            self.display_ms = 0;
            self.set_phase(TimerPhase::Ready);
        }
    }

    fn stop(&mut self, now: Instant) {
        self.frames = None;
        let elapsed = self
            .start_instant
            .take()
            .map_or(0, |start| elapsed_ms(start, now));
        self.display_ms = elapsed;
        self.set_phase(TimerPhase::Idle);
        info!(elapsed_ms = elapsed, "timer stopped");
        (self.on_stop)(elapsed);
    }

    fn set_phase(&mut self, next: TimerPhase) {
        debug!(from = %self.phase, to = %next, "timer phase");
        self.phase = next;
    }
}

impl<C: Clock> Drop for TimerHandle<C> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<C: Clock> fmt::Debug for TimerHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("phase", &self.phase)
            .field("hold", &self.hold)
            .field("frames", &self.frames)
            .field("start_instant", &self.start_instant)
            .field("display_ms", &self.display_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn manual_timer() -> (TimerHandle<ManualClock>, ManualClock, Rc<RefCell<Vec<u64>>>) {
        let clock = ManualClock::new();
        let stops = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&stops);
        let timer = TimerHandle::with_clock(clock.clone(), move |ms| sink.borrow_mut().push(ms));
        (timer, clock, stops)
    }

    fn assert_invariants<C: Clock>(timer: &TimerHandle<C>) {
        assert_eq!(timer.start_instant().is_some(), timer.phase() == TimerPhase::Running);
        assert_eq!(timer.is_frame_loop_active(), timer.phase() == TimerPhase::Running);
        assert_eq!(timer.is_hold_pending(), timer.phase() == TimerPhase::Holding);
    }

    #[test]
    fn test_starts_idle() {
        let (timer, _, _) = manual_timer();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.display_ms(), 0);
        assert_invariants(&timer);
    }

    #[test]
    fn test_early_release_cancels_hold() {
        let (mut timer, clock, stops) = manual_timer();

        timer.feed(Gesture::Engage);
        assert_eq!(timer.phase(), TimerPhase::Holding);
        assert_invariants(&timer);

        clock.advance(Duration::from_millis(300));
        timer.on_frame();
        assert_eq!(timer.phase(), TimerPhase::Holding);

        timer.feed(Gesture::Release);
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_invariants(&timer);

        // the cancelled delay must not fire later
        clock.advance(Duration::from_millis(1000));
        timer.on_frame();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert!(stops.borrow().is_empty());
    }

    #[test]
    fn test_hold_delay_boundary() {
        let (mut timer, clock, _) = manual_timer();
        timer.feed(Gesture::Engage);

        clock.advance(HOLD_DELAY - Duration::from_millis(1));
        timer.on_frame();
        assert_eq!(timer.phase(), TimerPhase::Holding);

        clock.advance(Duration::from_millis(1));
        timer.on_frame();
        assert_eq!(timer.phase(), TimerPhase::Ready);
        assert_invariants(&timer);
    }

    #[test]
    fn test_full_cycle_reports_elapsed() {
        let (mut timer, clock, stops) = manual_timer();

        timer.feed(Gesture::Engage);
        clock.advance(Duration::from_millis(600));
        timer.on_frame();
        assert_eq!(timer.phase(), TimerPhase::Ready);

        timer.feed(Gesture::Release);
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert_invariants(&timer);

        clock.advance(Duration::from_millis(500));
        timer.on_frame();
        assert_eq!(timer.display_ms(), 500);

        clock.advance(Duration::from_millis(734));
        timer.feed(Gesture::Engage);

        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(*stops.borrow(), vec![1234]);
        assert_eq!(timer.display_ms(), 1234);
        assert_invariants(&timer);
    }

    #[test]
    fn test_recorded_time_ignores_stale_frame() {
        let (mut timer, clock, stops) = manual_timer();
        timer.feed(Gesture::Engage);
        clock.advance(HOLD_DELAY);
        timer.on_frame();
        timer.feed(Gesture::Release);

        clock.advance(Duration::from_millis(100));
        timer.on_frame();
        clock.advance(Duration::from_millis(57));
        timer.feed(Gesture::Engage);

        assert_eq!(*stops.borrow(), vec![157]);
    }

    #[test]
    fn test_release_after_delay_without_frame() {
        let (mut timer, clock, _) = manual_timer();
        timer.feed(Gesture::Engage);
        clock.advance(Duration::from_millis(700));
        timer.feed(Gesture::Release);
        assert_eq!(timer.phase(), TimerPhase::Running);
    }

    #[test]
    fn test_ignored_inputs() {
        let (mut timer, clock, stops) = manual_timer();

        timer.feed(Gesture::Release);
        assert_eq!(timer.phase(), TimerPhase::Idle);

        timer.feed(Gesture::Engage);
        timer.feed(Gesture::Engage);
        assert_eq!(timer.phase(), TimerPhase::Holding);

        clock.advance(HOLD_DELAY);
        timer.on_frame();
        timer.feed(Gesture::Engage);
        assert_eq!(timer.phase(), TimerPhase::Ready);

        timer.feed(Gesture::Release);
        timer.feed(Gesture::Release);
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert!(stops.borrow().is_empty());
    }

    #[test]
    fn test_reset_from_every_phase() {
        let (mut timer, clock, stops) = manual_timer();

        timer.feed(Gesture::Engage);
        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_invariants(&timer);

        timer.feed(Gesture::Engage);
        clock.advance(HOLD_DELAY);
        timer.on_frame();
        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);

        timer.feed(Gesture::Engage);
        clock.advance(HOLD_DELAY);
        timer.on_frame();
        timer.feed(Gesture::Release);
        clock.advance(Duration::from_millis(300));
        timer.on_frame();
        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.display_ms(), 0);
        assert_invariants(&timer);

        assert!(stops.borrow().is_empty());
    }

    #[test]
    fn test_drop_does_not_report() {
        let (mut timer, clock, stops) = manual_timer();
        timer.feed(Gesture::Engage);
        clock.advance(HOLD_DELAY);
        timer.feed(Gesture::Release);
        drop(timer);
        assert!(stops.borrow().is_empty());
    }

    #[test]
    fn test_system_clock_elapsed_close_to_wall_time() {
        let stops = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&stops);
        let mut timer = create_timer(move |ms| sink.borrow_mut().push(ms));

        timer.feed(Gesture::Engage);
        std::thread::sleep(HOLD_DELAY + Duration::from_millis(20));
        timer.on_frame();
        assert_eq!(timer.phase(), TimerPhase::Ready);

        timer.feed(Gesture::Release);
        std::thread::sleep(Duration::from_millis(100));
        timer.feed(Gesture::Engage);

        let elapsed = stops.borrow()[0];
        assert!(elapsed >= 100);
        assert!(elapsed < 250);
    }
}
