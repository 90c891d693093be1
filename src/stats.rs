//! Solve statistics.
//!
//! Everything here is recomputed from the full history on every call. The
//! history is newest-first, so index 0 is the latest solve and "the last five"
//! is `history[..5]`.

use crate::util::mean;
use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Added to the raw time of a +2 solve.
pub const PENALTY_PLUS_TWO_MS: u64 = 2000;

/// Window sizes for ao5 and ao12.
pub const WINDOW_SIZES: [usize; 2] = [5, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Penalty {
    #[default]
    None,
    PlusTwo,
    Dnf,
}

impl Penalty {
    /// Stable name used by the solve store
    pub fn as_str(&self) -> &'static str {
        match self {
            Penalty::None => "none",
            Penalty::PlusTwo => "+2",
            Penalty::Dnf => "dnf",
        }
    }

    pub fn parse(s: &str) -> Option<Penalty> {
        match s {
            "none" => Some(Penalty::None),
            "+2" => Some(Penalty::PlusTwo),
            "dnf" => Some(Penalty::Dnf),
            _ => None,
        }
    }
}

/// One timed attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRecord {
    pub id: u64,
    pub raw_time_ms: u64,
    pub created_at: DateTime<Local>,
    pub penalty: Penalty,
}

impl SolveRecord {
    pub fn new(id: u64, raw_time_ms: u64) -> Self {
        Self {
            id,
            raw_time_ms,
            created_at: Local::now(),
            penalty: Penalty::None,
        }
    }

    /// Time counted for statistics; `None` for a DNF.
    pub fn effective_ms(&self) -> Option<u64> {
        match self.penalty {
            Penalty::None => Some(self.raw_time_ms),
            Penalty::PlusTwo => Some(self.raw_time_ms.saturating_add(PENALTY_PLUS_TWO_MS)),
            Penalty::Dnf => None,
        }
    }

    /// Like [`Self::effective_ms`], with a DNF as `+inf` so it sorts last.
    pub fn effective_time(&self) -> f64 {
        self.effective_ms().map_or(f64::INFINITY, |ms| ms as f64)
    }
}

/// Result of a trimmed mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Average {
    Time(f64),
    Dnf,
}

impl Average {
    pub fn as_ms(&self) -> Option<f64> {
        match self {
            Average::Time(ms) => Some(*ms),
            Average::Dnf => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub count: usize,
    pub best: Option<u64>,
    /// Mean of every finished solve
    pub mean: Option<f64>,
    /// Trimmed mean of the newest `w` solves, present once the history is long enough
    pub fixed_averages: BTreeMap<usize, Average>,
    /// Window size -> start index -> trimmed mean of `history[i..i + w]`
    pub rolling_averages: BTreeMap<usize, BTreeMap<usize, Average>>,
    /// Lowest numeric rolling average per window
    pub best_averages: BTreeMap<usize, f64>,
}

impl StatisticsSnapshot {
    pub fn average(&self, window: usize) -> Option<Average> {
        self.fixed_averages.get(&window).copied()
    }

    pub fn rolling(&self, window: usize, index: usize) -> Option<Average> {
        self.rolling_averages
            .get(&window)
            .and_then(|by_index| by_index.get(&index))
            .copied()
    }
}

/// Sort, drop exactly one lowest and one highest value, average the rest.
///
/// Returns `None` for windows shorter than three. Any DNF left after trimming
/// makes the whole average a DNF.
pub fn trimmed_mean(window: &[f64]) -> Option<Average> {
    if window.len() < 3 {
        return None;
    }

    let kept: Vec<f64> = window
        .iter()
        .copied()
        .sorted_by(|a, b| a.total_cmp(b))
        .skip(1)
        .take(window.len() - 2)
        .collect();

    if kept.iter().any(|t| !t.is_finite()) {
        return Some(Average::Dnf);
    }

    mean(&kept).map(Average::Time)
}

pub fn summarize(history: &[SolveRecord]) -> StatisticsSnapshot {
    let times: Vec<f64> = history.iter().map(SolveRecord::effective_time).collect();
    let finished: Vec<f64> = times.iter().copied().filter(|t| t.is_finite()).collect();

    let mut snapshot = StatisticsSnapshot {
        count: history.len(),
        best: history.iter().filter_map(SolveRecord::effective_ms).min(),
        mean: mean(&finished),
        ..Default::default()
    };

    for window in WINDOW_SIZES {
        if times.len() >= window {
            if let Some(avg) = trimmed_mean(&times[..window]) {
                snapshot.fixed_averages.insert(window, avg);
            }
        }

        let rolling: BTreeMap<usize, Average> = times
            .windows(window)
            .enumerate()
            .filter_map(|(i, slice)| trimmed_mean(slice).map(|avg| (i, avg)))
            .collect();

        if let Some(best) = rolling
            .values()
            .filter_map(Average::as_ms)
            .min_by(|a, b| a.total_cmp(b))
        {
            snapshot.best_averages.insert(window, best);
        }

        snapshot.rolling_averages.insert(window, rolling);
    }

    snapshot
}
