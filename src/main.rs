use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
};
use tracing::{info, warn};
use twisty::{
    app::App,
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore},
    logging,
    puzzle::PuzzleKind,
    runtime::{CrosstermEventSource, FixedTicker, Runner, FRAME_INTERVAL},
    scramble,
    store::SqliteSolveStore,
    ui,
};

/// hold-to-start puzzle timer with scrambles and running averages
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal speedcubing timer: random-state-style move scrambles for common twisty puzzles, hold-to-start timing from the keyboard or mouse, and ao5/ao12 statistics persisted per session."
)]
pub struct Cli {
    /// puzzle to scramble and time (defaults to the last one used)
    #[clap(short = 'p', long, value_enum)]
    puzzle: Option<PuzzleKind>,

    /// name of the solve session to record into
    #[clap(short = 's', long)]
    session: Option<String>,

    /// do not start the timer from mouse holds
    #[clap(long)]
    no_mouse: bool,

    /// print this many scrambles and exit
    #[clap(long, value_name = "N")]
    scramble: Option<usize>,
}

fn print_scrambles(puzzle: PuzzleKind, count: usize) -> io::Result<()> {
    let spec = puzzle.spec();
    let mut out = io::stdout().lock();
    for n in 1..=count {
        let scramble = scramble::generate(&spec);
        if scramble.contains('\n') {
            writeln!(out, "{n}.\n{scramble}")?;
        } else {
            writeln!(out, "{n}. {scramble}")?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(count) = cli.scramble {
        print_scrambles(cli.puzzle.unwrap_or_default(), count)?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init(AppDirs::log_path().as_deref())?;

    let config_store = FileConfigStore::new();
    let config = config_store
        .load()
        .with_overrides(cli.puzzle, cli.session.clone(), cli.no_mouse);
    if let Err(e) = config_store.save(&config) {
        warn!(error = %e, "could not save config");
    }

    let store = SqliteSolveStore::new()?;
    let mut app = App::new(&config, Box::new(store));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if config.pointer_input {
        execute!(stdout, EnableMouseCapture)?;
    }

    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if keyboard_enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        warn!("terminal does not report key releases; keyboard timing disabled");
        app.disable_keyboard_timing();
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(puzzle = %app.puzzle(), session = app.session(), "starting");
    let result = start_tui(&mut terminal, &mut app);

    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    if config.pointer_input {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(FRAME_INTERVAL),
    );

    loop {
        terminal.draw(|f| {
            app.attach_pointer(ui::timer_area(f.area()));
            f.render_widget(&*app, f.area());
        })?;

        // resizes are picked up by the next draw
        app.handle_event(runner.step());

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
