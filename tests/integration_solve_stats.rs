use twisty::error::EditError;
use twisty::session::SolveHistory;
use twisty::stats::{summarize, Average, Penalty};
use twisty::store::{SolveStore, SqliteSolveStore};
use twisty::util::{format_average, format_solve};

fn history(times: &[u64]) -> SolveHistory {
    let mut history = SolveHistory::new();
    for &ms in times {
        history.record(ms);
    }
    history
}

#[test]
fn averages_follow_penalty_edits() {
    // newest first after recording: 6000, 5000, 4000, 3000, 2000
    let mut history = history(&[2000, 3000, 4000, 5000, 6000]);
    let snapshot = summarize(history.records());
    assert_eq!(snapshot.average(5), Some(Average::Time(4000.0)));

    let newest = history.latest().unwrap().id;
    history.set_penalty(newest, Penalty::Dnf).unwrap();
    let snapshot = summarize(history.records());
    // the DNF is trimmed as the worst time
    assert_eq!(snapshot.average(5), Some(Average::Time(4000.0)));
    assert_eq!(snapshot.best, Some(2000));

    let oldest = history.records().last().unwrap().id;
    history.set_penalty(oldest, Penalty::Dnf).unwrap();
    let snapshot = summarize(history.records());
    assert_eq!(snapshot.average(5), Some(Average::Dnf));
    assert_eq!(format_average(&snapshot.average(5).unwrap()), "DNF");
}

#[test]
fn plus_two_counts_in_best_and_display() {
    let mut history = history(&[9430]);
    let id = history.latest().unwrap().id;
    history.toggle_penalty(id, Penalty::PlusTwo).unwrap();

    let record = history.latest().unwrap();
    assert_eq!(format_solve(record), "11.43+");
    assert_eq!(summarize(history.records()).best, Some(11_430));
}

#[test]
fn ao12_appears_only_with_twelve_solves() {
    let mut history = history(&[10_000; 11]);
    assert_eq!(summarize(history.records()).average(12), None);

    history.record(10_000);
    let snapshot = summarize(history.records());
    assert_eq!(snapshot.average(12), Some(Average::Time(10_000.0)));
    assert_eq!(snapshot.rolling_averages[&12].len(), 1);
    assert_eq!(snapshot.rolling_averages[&5].len(), 8);
}

#[test]
fn rejected_edit_keeps_stored_history_consistent() {
    let mut store = SqliteSolveStore::open_in_memory().unwrap();
    let mut history = history(&[12_000, 13_000]);
    store.save("s/3x3", history.records()).unwrap();

    let id = history.latest().unwrap().id;
    assert!(matches!(
        history.edit_time(id, "abc"),
        Err(EditError::InvalidTime(_))
    ));
    assert_eq!(history.edit_time(id, "1:02.50"), Ok(62_500));
    store.save("s/3x3", history.records()).unwrap();

    let reloaded = SolveHistory::from_records(store.load("s/3x3").unwrap());
    assert_eq!(reloaded.latest().map(|r| r.raw_time_ms), Some(62_500));
    assert_eq!(
        summarize(reloaded.records()),
        summarize(history.records())
    );
}
