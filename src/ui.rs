pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, KEYBOARD_HINT},
    stats::WINDOW_SIZES,
    timer::{Clock, TimerPhase},
    util::{format_average, format_solve, format_time},
};

const HORIZONTAL_MARGIN: u16 = 2;
const SCRAMBLE_HEIGHT: u16 = 9;
const HISTORY_HEIGHT: u16 = 8;
const HISTORY_LIST_WIDTH: u16 = 30;

const KEY_HELP: &str =
    "space/mouse: hold to start   n: scramble   tab: puzzle   p: +2   d: dnf   e: edit   bksp: delete   q: quit";

fn layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1),               // header
            Constraint::Length(SCRAMBLE_HEIGHT), // scramble
            Constraint::Min(5),                  // timer
            Constraint::Length(1),               // averages
            Constraint::Length(HISTORY_HEIGHT),  // history
            Constraint::Length(1),               // footer
        ])
        .split(area)
}

/// Screen region that accepts mouse holds
pub fn timer_area(area: Rect) -> Rect {
    layout(area)[2]
}

fn phase_style(phase: TimerPhase) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match phase {
        TimerPhase::Idle => bold,
        TimerPhase::Holding => bold.fg(Color::Red),
        TimerPhase::Ready => bold.fg(Color::Green),
        TimerPhase::Running => bold.fg(Color::Yellow),
    }
}

fn summary_line(app: &App<impl Clock>) -> Line<'static> {
    let snapshot = app.snapshot();
    let dim = Style::default().add_modifier(Modifier::DIM);
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    for window in WINDOW_SIZES {
        let current = snapshot
            .average(window)
            .map_or_else(|| "-".to_string(), |avg| format_average(&avg));
        let best = snapshot
            .best_averages
            .get(&window)
            .map_or_else(|| "-".to_string(), |ms| format_time(ms.round() as u64));
        spans.push(Span::styled(format!("ao{window} "), dim));
        spans.push(Span::styled(current, bold));
        spans.push(Span::styled(format!(" (best {best})   "), dim));
    }

    spans.push(Span::styled("best ", dim));
    spans.push(Span::styled(
        snapshot.best.map_or_else(|| "-".to_string(), format_time),
        bold,
    ));
    spans.push(Span::styled("   mean ", dim));
    spans.push(Span::styled(
        snapshot
            .mean
            .map_or_else(|| "-".to_string(), |ms| format_time(ms.round() as u64)),
        bold,
    ));
    spans.push(Span::styled(format!("   {} solves", snapshot.count), dim));

    Line::from(spans)
}

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let magenta_style = Style::default().fg(Color::Magenta);

        let chunks = layout(area);

        Paragraph::new(Line::from(vec![
            Span::styled(app_title(self), bold_style),
            Span::styled(format!("   session {}", self.session()), dim_style),
        ]))
        .render(chunks[0], buf);

        Paragraph::new(self.scramble().to_string())
            .block(Block::default().borders(Borders::ALL).title("scramble"))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        let timer = self.timer();
        let timer_text = match self.editing() {
            Some(buffer) => Line::from(Span::styled(
                format!("new time: {buffer}_"),
                bold_style.fg(Color::Cyan),
            )),
            None => Line::from(Span::styled(
                format_time(timer.display_ms()),
                phase_style(timer.phase()),
            )),
        };
        let timer_area = chunks[2];
        let padding = timer_area.height.saturating_sub(1) / 2;
        let mut timer_lines = vec![Line::default(); padding as usize];
        timer_lines.push(timer_text);
        Paragraph::new(timer_lines)
            .alignment(Alignment::Center)
            .render(timer_area, buf);

        Paragraph::new(summary_line(self))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        let history_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(HISTORY_LIST_WIDTH), Constraint::Min(10)])
            .split(chunks[4]);

        let snapshot = self.snapshot();
        let records = self.history().records();
        let visible = history_chunks[0].height.saturating_sub(2) as usize;
        let rows: Vec<Line> = records
            .iter()
            .take(visible)
            .enumerate()
            .map(|(idx, record)| {
                let number = records.len() - idx;
                let ao5 = snapshot
                    .rolling(5, idx)
                    .map_or_else(String::new, |avg| format!("ao5 {}", format_average(&avg)));
                Line::from(vec![
                    Span::styled(format!("{number:>4}. "), dim_style),
                    Span::styled(format!("{:<9}", format_solve(record)), bold_style),
                    Span::styled(ao5, dim_style),
                ])
            })
            .collect();
        Paragraph::new(rows)
            .block(Block::default().borders(Borders::ALL).title("solves"))
            .render(history_chunks[0], buf);

        let points = charting::solve_points(records);
        let (last_solve, highest) = charting::compute_chart_params(&points, records.len());
        let datasets = vec![Dataset::default()
            .marker(Marker::Braille)
            .style(magenta_style)
            .graph_type(GraphType::Line)
            .data(&points)];
        Chart::new(datasets)
            .x_axis(Axis::default().bounds([1.0, last_solve]).labels(vec![
                Span::styled("1", bold_style),
                Span::styled(charting::format_label(last_solve), bold_style),
            ]))
            .y_axis(
                Axis::default()
                    .title("seconds")
                    .bounds([0.0, highest])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(charting::format_label(highest), bold_style),
                    ]),
            )
            .render(history_chunks[1], buf);

        let footer = match self.status() {
            Some(status) => Span::styled(status.to_string(), bold_style.fg(Color::Red)),
            None if timer.surface().keyboard.is_none() => {
                Span::styled(KEYBOARD_HINT, Style::default().add_modifier(Modifier::ITALIC))
            }
            None => Span::styled(KEY_HELP, dim_style.add_modifier(Modifier::ITALIC)),
        };
        Paragraph::new(footer)
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

fn app_title(app: &App<impl Clock>) -> String {
    format!("twisty  {}", app.puzzle())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::runtime::TimerEvent;
    use crate::stats::{Penalty, SolveRecord};
    use crate::store::{MemorySolveStore, SolveStore};
    use crate::timer::ManualClock;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn render(app: &App<ManualClock>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);

        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App<ManualClock> {
        App::with_clock(
            ManualClock::new(),
            &Config::default(),
            Box::new(MemorySolveStore::default()),
        )
    }

    #[test]
    fn test_timer_area_sits_between_scramble_and_stats() {
        let area = Rect::new(0, 0, 100, 40);
        let timer = timer_area(area);
        assert_eq!(timer.y, 1 + SCRAMBLE_HEIGHT);
        assert_eq!(timer.height, 40 - 1 - SCRAMBLE_HEIGHT - 1 - HISTORY_HEIGHT - 1);
    }

    #[test]
    fn test_renders_idle_screen() {
        let app = app();
        let screen = render(&app, 120, 40);
        assert!(screen.contains("twisty  3x3"));
        assert!(screen.contains("0.00"));
        assert!(screen.contains("0 solves"));
        assert!(screen.contains(&app.scramble()[..5]));
    }

    #[test]
    fn test_renders_history_with_penalty_marks() {
        let mut plus_two = SolveRecord::new(5, 7430);
        plus_two.penalty = Penalty::PlusTwo;
        let mut dnf = SolveRecord::new(4, 8000);
        dnf.penalty = Penalty::Dnf;
        let mut history = vec![plus_two, dnf];
        history.extend((0..4).rev().map(|id| SolveRecord::new(id, 10_000 + id * 1000)));

        let mut store = MemorySolveStore::default();
        store.save("default/3x3", &history).unwrap();
        let app = App::with_clock(ManualClock::new(), &Config::default(), Box::new(store));

        let screen = render(&app, 120, 40);
        assert!(screen.contains("9.43+"));
        assert!(screen.contains("DNF"));
        assert!(screen.contains("ao5"));
        assert!(screen.contains("6 solves"));
    }

    #[test]
    fn test_edit_buffer_replaces_clock() {
        let mut store = MemorySolveStore::default();
        store
            .save("default/3x3", &[SolveRecord::new(0, 10_000)])
            .unwrap();
        let mut app = App::with_clock(ManualClock::new(), &Config::default(), Box::new(store));
        app.handle_event(TimerEvent::Key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE)));
        app.handle_event(TimerEvent::Key(KeyEvent::new(KeyCode::Char('9'), KeyModifiers::NONE)));

        assert!(render(&app, 120, 40).contains("new time: 9_"));
    }
}
