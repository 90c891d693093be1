use std::sync::mpsc::{self, Receiver};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use tracing::{info, warn};

use crate::config::Config;
use crate::input::{InputSurface, KeyboardAdapter};
use crate::puzzle::PuzzleKind;
use crate::runtime::TimerEvent;
use crate::scramble;
use crate::session::SolveHistory;
use crate::stats::{summarize, Penalty, StatisticsSnapshot};
use crate::store::SolveStore;
use crate::timer::{Clock, SystemClock, TimerHandle, TimerPhase};

/// Shown when the terminal can't report key releases.
pub const KEYBOARD_HINT: &str = "keyboard hold-to-start unavailable here; hold the mouse on the timer";

/// Everything the screen shows, plus the plumbing between timer and history.
pub struct App<C: Clock = SystemClock> {
    puzzle: PuzzleKind,
    session: String,
    scramble: String,
    timer: TimerHandle<C>,
    stops: Receiver<u64>,
    history: SolveHistory,
    snapshot: StatisticsSnapshot,
    store: Box<dyn SolveStore>,
    pointer_input: bool,
    status: Option<String>,
    editing: Option<String>,
    // set while the current key's stored history failed to load
    save_blocked: bool,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, store: Box<dyn SolveStore>) -> Self {
        Self::with_clock(SystemClock, config, store)
    }
}

impl<C: Clock> App<C> {
    pub fn with_clock(clock: C, config: &Config, store: Box<dyn SolveStore>) -> Self {
        let (tx, stops) = mpsc::channel();
        let mut timer = TimerHandle::with_clock(clock, move |elapsed_ms| {
            // receiver lives as long as the app that owns this timer
            let _ = tx.send(elapsed_ms);
        });

        let pointer = config.pointer_input.then(Rect::default);
        timer.attach(InputSurface::new(KeyboardAdapter::default(), pointer));

        let mut app = Self {
            puzzle: config.puzzle,
            session: config.session.clone(),
            scramble: String::new(),
            timer,
            stops,
            history: SolveHistory::new(),
            snapshot: StatisticsSnapshot::default(),
            store,
            pointer_input: config.pointer_input,
            status: None,
            editing: None,
            save_blocked: false,
            should_quit: false,
        };
        app.load_history();
        app.new_scramble();
        app
    }

    /// Stop listening to the timer key. Used when the terminal only
    /// reports presses, which would leave a keyboard hold stuck.
    pub fn disable_keyboard_timing(&mut self) {
        let mut surface = *self.timer.surface();
        surface.keyboard = None;
        self.timer.attach(surface);
        self.status = Some(KEYBOARD_HINT.to_string());
    }

    /// Where mouse presses start the timer. Called after every layout pass.
    pub fn attach_pointer(&mut self, area: Rect) {
        self.timer.attach_pointer(area);
    }

    pub fn puzzle(&self) -> PuzzleKind {
        self.puzzle
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Store key: one history per session and puzzle.
    pub fn session_key(&self) -> String {
        format!("{}/{}", self.session, self.puzzle)
    }

    pub fn scramble(&self) -> &str {
        &self.scramble
    }

    pub fn timer(&self) -> &TimerHandle<C> {
        &self.timer
    }

    pub fn history(&self) -> &SolveHistory {
        &self.history
    }

    pub fn snapshot(&self) -> &StatisticsSnapshot {
        &self.snapshot
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn pointer_input(&self) -> bool {
        self.pointer_input
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_event(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Tick => self.timer.on_frame(),
            TimerEvent::Mouse(mouse) => {
                self.timer.handle_mouse(&mouse);
            }
            TimerEvent::Key(key) => self.handle_key(key),
            TimerEvent::Resize => {}
        }
        self.collect_stops();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.editing.is_some() {
            if key.kind == KeyEventKind::Press {
                self.handle_edit_key(key.code);
            }
            return;
        }

        if self.timer.handle_key(&key) || key.kind != KeyEventKind::Press {
            return;
        }

        if self.timer.phase() != TimerPhase::Idle {
            if key.code == KeyCode::Esc {
                self.timer.reset();
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('n') => self.new_scramble(),
            KeyCode::Tab => self.switch_puzzle(self.puzzle.next()),
            KeyCode::Char('p') => self.toggle_latest(Penalty::PlusTwo),
            KeyCode::Char('d') => self.toggle_latest(Penalty::Dnf),
            KeyCode::Backspace => self.delete_latest(),
            KeyCode::Char('e') if !self.history.is_empty() => {
                self.status = None;
                self.editing = Some(String::new());
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };

        match code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == ':' => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => self.editing = None,
            KeyCode::Enter => {
                if let Some(input) = self.editing.take() {
                    self.edit_latest_time(&input);
                }
            }
            _ => {}
        }
    }

    fn collect_stops(&mut self) {
        while let Ok(elapsed_ms) = self.stops.try_recv() {
            self.record_solve(elapsed_ms);
        }
    }

    fn record_solve(&mut self, elapsed_ms: u64) {
        let id = self.history.record(elapsed_ms).id;
        info!(id, elapsed_ms, puzzle = %self.puzzle, "solve recorded");
        self.status = None;
        self.history_changed();
        self.new_scramble();
    }

    pub fn new_scramble(&mut self) {
        self.scramble = scramble::generate(&self.puzzle.spec());
    }

    /// Abandon any attempt in progress and move to another puzzle's history.
    pub fn switch_puzzle(&mut self, puzzle: PuzzleKind) {
        self.timer.reset();
        self.puzzle = puzzle;
        self.editing = None;
        self.status = None;
        self.load_history();
        self.new_scramble();
        info!(puzzle = %puzzle, solves = self.history.len(), "switched puzzle");
    }

    pub fn toggle_latest(&mut self, penalty: Penalty) {
        let Some(id) = self.history.latest().map(|r| r.id) else {
            return;
        };
        match self.history.toggle_penalty(id, penalty) {
            Ok(now) => {
                info!(id, penalty = now.as_str(), "penalty changed");
                self.history_changed();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn delete_latest(&mut self) {
        let Some(id) = self.history.latest().map(|r| r.id) else {
            return;
        };
        match self.history.delete(id) {
            Ok(removed) => {
                info!(id, raw_time_ms = removed.raw_time_ms, "solve deleted");
                self.history_changed();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Replace the newest solve's time with a typed value. Bad input is
    /// reported on the status line and changes nothing.
    pub fn edit_latest_time(&mut self, input: &str) {
        let Some(id) = self.history.latest().map(|r| r.id) else {
            return;
        };
        match self.history.edit_time(id, input) {
            Ok(raw_time_ms) => {
                info!(id, raw_time_ms, "solve time edited");
                self.status = None;
                self.history_changed();
            }
            Err(e) => {
                warn!(id, error = %e, "rejected time edit");
                self.status = Some(e.to_string());
            }
        }
    }

    fn history_changed(&mut self) {
        self.snapshot = summarize(self.history.records());
        let key = self.session_key();
        if self.save_blocked {
            // saving would replace rows we never managed to read
            warn!(key, "stored history unreadable; not saving");
            self.status = Some("history unavailable; changes not saved".to_string());
            return;
        }
        if let Err(e) = self.store.save(&key, self.history.records()) {
            warn!(key, error = %e, "could not save solves");
            self.status = Some(format!("not saved: {e}"));
        }
    }

    fn load_history(&mut self) {
        let key = self.session_key();
        let records = match self.store.load(&key) {
            Ok(records) => {
                self.save_blocked = false;
                records
            }
            Err(e) => {
                warn!(key, error = %e, "could not load solves");
                self.status = Some(format!("history unavailable: {e}"));
                self.save_blocked = true;
                Vec::new()
            }
        };
        self.history = SolveHistory::from_records(records);
        self.snapshot = summarize(self.history.records());
    }
}
