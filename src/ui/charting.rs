use crate::stats::SolveRecord;

/// Chart points for a newest-first history: x is the solve number counted
/// from the oldest (1-based), y the counted time in seconds. DNFs leave a gap.
pub fn solve_points(records: &[SolveRecord]) -> Vec<(f64, f64)> {
    records
        .iter()
        .rev()
        .enumerate()
        .filter_map(|(i, record)| {
            record
                .effective_ms()
                .map(|ms| ((i + 1) as f64, ms as f64 / 1000.0))
        })
        .collect()
}

/// X (solve number) and Y (seconds) upper bounds for the history chart
pub fn compute_chart_params(points: &[(f64, f64)], solve_count: usize) -> (f64, f64) {
    let highest = points.iter().map(|&(_, secs)| secs).fold(0.0, f64::max);
    let last_solve = (solve_count as f64).max(2.0);

    (last_solve, highest.ceil().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
