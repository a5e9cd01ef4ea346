mod config;
mod logger;
mod model;

use std::{
    env,
    time::{Duration, Instant},
};

use config::SimulationConfig;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use logger::{LogLevel, Logger};
use model::clock::SPEED_PRESETS;
use model::durations::RandomDurations;
use model::item::ItemState;
use model::simulation::SimulationState;
use model::snapshot::Snapshot;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};

/// Simulated minutes covered by one headless tick at speed x1
const HEADLESS_STEP_MINUTES: f64 = 60.0;
/// Leftover minutes below this are float noise, not a reason to tick again
const HEADLESS_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<String>,
    headless_minutes: Option<f64>,
}

fn main() {
    let bootstrap = Logger::new(LogLevel::Info);
    let args: Vec<String> = env::args().collect();

    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(err) => {
            bootstrap.error(&err);
            eprintln!("usage: workshop-sim [--config <path>] [--headless <minutes>]");
            std::process::exit(2);
        }
    };

    let config = match &cli.config {
        Some(path) => {
            bootstrap.info(&format!("Loading simulation config from {}", path));
            match SimulationConfig::load(path) {
                Ok(config) => config,
                Err(err) => {
                    bootstrap.error(&format!("Failed to load config: {}", err));
                    std::process::exit(1);
                }
            }
        }
        None => SimulationConfig::default(),
    };

    // The terminal UI owns the screen, so its log lines only go to the file
    let console = cli.headless_minutes.is_some();
    let logger = match Logger::from_config(&config.log, console) {
        Ok(logger) => logger,
        Err(err) => {
            bootstrap.error(&format!("Failed to open log file: {}", err));
            std::process::exit(1);
        }
    };

    let result = match cli.headless_minutes {
        Some(minutes) => run_headless(&config, minutes, &logger),
        None => run_tui(&config, &logger),
    };
    if let Err(err) = result {
        logger.error(&format!("Simulation stopped: {}", err));
        if !console {
            bootstrap.error(&format!("Simulation stopped: {}", err));
        }
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().ok_or("--config needs a path")?;
                cli.config = Some(path.clone());
            }
            "--headless" | "-H" => {
                let raw = iter.next().ok_or("--headless needs a number of minutes")?;
                let minutes: f64 = raw
                    .parse()
                    .map_err(|_| format!("Invalid minutes for --headless: {}", raw))?;
                if !minutes.is_finite() || minutes < 0.0 {
                    return Err(format!("Invalid minutes for --headless: {}", raw));
                }
                cli.headless_minutes = Some(minutes);
            }
            path if !path.starts_with('-') => cli.config = Some(path.to_string()),
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(cli)
}

fn build_simulation(config: &SimulationConfig) -> Result<SimulationState, Box<dyn std::error::Error>> {
    let source = RandomDurations::new(config.durations, config.seed);
    Ok(SimulationState::new(config.line_settings(), Box::new(source))?)
}

/// Run until `minutes` of simulated time have passed, then print the final
/// snapshot as JSON on stdout
fn run_headless(
    config: &SimulationConfig,
    minutes: f64,
    logger: &Logger,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sim = build_simulation(config)?;
    logger.info(&format!("Headless run for {} simulated minutes", minutes));
    sim.start();

    loop {
        let remaining = minutes - sim.now().as_minutes();
        if remaining <= HEADLESS_TOLERANCE {
            break;
        }
        let speed = sim.clock().speed();
        let elapsed = remaining.min(HEADLESS_STEP_MINUTES) / speed;
        for event in sim.tick(elapsed)? {
            logger.event(&event);
        }
    }

    let snapshot = sim.snapshot();
    logger.info(&format!(
        "Done at t={:.1}: {} produced, {} finished, {} waiting for WS2",
        snapshot.time.as_minutes(),
        snapshot.produced_count(),
        snapshot.finished_count(),
        snapshot.queue_len()
    ));
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

struct App {
    sim: SimulationState,
    tick_rate: Duration,
    last_tick: Instant,
    title: String,
}

fn run_tui(config: &SimulationConfig, logger: &Logger) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App {
        sim: build_simulation(config)?,
        tick_rate: config.tick_rate(),
        last_tick: Instant::now(),
        title: "WorkshopSim - two-workshop line".to_string(),
    };
    logger.info("Terminal UI started");

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, logger);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    logger.info("Terminal UI closed");
    res
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    logger: &Logger,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let snapshot = app.sim.snapshot();
        terminal.draw(|f| draw_ui(f, &app.title, &snapshot))?;

        let timeout = app
            .tick_rate
            .checked_sub(app.last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let CEvent::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? {
                if !handle_key(&mut app.sim, code, logger)? {
                    return Ok(());
                }
            }
        }

        if app.last_tick.elapsed() >= app.tick_rate {
            let elapsed = app.last_tick.elapsed().as_secs_f64();
            app.last_tick = Instant::now();
            for event in app.sim.tick(elapsed)? {
                logger.event(&event);
            }
        }
    }
}

/// Map a key press onto the control surface. Returns false on quit.
fn handle_key(sim: &mut SimulationState, code: KeyCode, logger: &Logger) -> Result<bool, Box<dyn std::error::Error>> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
        KeyCode::Char('g') => {
            sim.start();
            logger.info("Started");
        }
        KeyCode::Char('p') => {
            sim.pause();
            logger.info("Paused");
        }
        KeyCode::Char(' ') => {
            sim.toggle();
            let state = if sim.clock().is_paused() { "Paused" } else { "Resumed" };
            logger.info(state);
        }
        KeyCode::Char('s') => {
            sim.reset()?;
            logger.info("Reset");
        }
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            let speed = SPEED_PRESETS[idx];
            match sim.set_speed(speed) {
                Ok(()) => logger.info(&format!("Speed x{}", speed)),
                Err(err) => logger.warning(&err.to_string()),
            }
        }
        _ => {}
    }
    Ok(true)
}

fn draw_ui(f: &mut ratatui::Frame, title: &str, snap: &Snapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)].as_ref())
        .split(f.size());
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[1]);

    draw_info(f, top[0], title, snap);
    draw_controls(f, top[1]);
    draw_produced_finished(f, bottom[0], snap);
    draw_workshops(f, bottom[1], snap);
}

fn mode_label(snap: &Snapshot) -> &'static str {
    match (snap.running, snap.paused) {
        (false, _) => "Stopped",
        (true, true) => "Paused",
        (true, false) => "Running",
    }
}

fn draw_info(f: &mut ratatui::Frame, area: Rect, title: &str, snap: &Snapshot) {
    let lines = vec![
        Line::from(title.to_string()),
        Line::from(format!("Mode: {}", mode_label(snap))),
        Line::from(format!("Sim time (min): {}", snap.time.whole_minutes())),
        Line::from(format!("Speed: x{}", snap.speed)),
        Line::from(format!("WS1 produced: {}", snap.produced_count())),
        Line::from(format!("WS2 finished: {}", snap.finished_count())),
    ];
    let para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Simulation info"))
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

fn draw_controls(f: &mut ratatui::Frame, area: Rect) {
    let lines = vec![
        Line::from("  g     - start"),
        Line::from("  p     - pause"),
        Line::from("  space - pause/resume"),
        Line::from("  s     - reset"),
        Line::from("  1..5  - speed x1 x2 x5 x10 x20"),
        Line::from("  q     - quit"),
    ];
    let para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(para, area);
}

fn item_color(state: ItemState) -> Color {
    match state {
        ItemState::WaitingWs1 | ItemState::ProducingWs1 => Color::Blue,
        ItemState::Produced | ItemState::Transferring => Color::LightMagenta,
        ItemState::QueuedWs2 => Color::Blue,
        ItemState::ProcessingWs2 => Color::Red,
        ItemState::Finished => Color::Green,
    }
}

fn draw_produced_finished(f: &mut ratatui::Frame, area: Rect, snap: &Snapshot) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let produced: Vec<Span> = snap
        .items
        .iter()
        .filter(|item| item.timestamps.production_done.is_some())
        .map(|item| {
            Span::styled(
                format!("P{} ", item.id),
                Style::default().fg(item_color(item.state())),
            )
        })
        .collect();
    let finished: Vec<Span> = snap
        .finished
        .iter()
        .map(|id| Span::styled(format!("P{} ", id), Style::default().fg(Color::Green)))
        .collect();

    let produced = Paragraph::new(Line::from(produced))
        .block(Block::default().borders(Borders::ALL).title("Produced"))
        .wrap(Wrap { trim: true });
    let finished = Paragraph::new(Line::from(finished))
        .block(Block::default().borders(Borders::ALL).title("Finished"))
        .wrap(Wrap { trim: true });
    f.render_widget(produced, halves[0]);
    f.render_widget(finished, halves[1]);
}

fn draw_workshops(f: &mut ratatui::Frame, area: Rect, snap: &Snapshot) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)].as_ref())
        .split(area);

    let producing = snap
        .items_in(ItemState::ProducingWs1)
        .map(|item| format!("P{}", item.id))
        .next()
        .unwrap_or_else(|| "-".to_string());
    let transferring: Vec<String> = snap
        .items_in(ItemState::Transferring)
        .map(|item| format!("P{} ({:.0}, {:.0})", item.id, item.position.x, item.position.y))
        .collect();
    let queue: Vec<String> = snap.ws2_queue.iter().map(|id| format!("P{}", id)).collect();
    let current = snap
        .ws2_current
        .map(|id| format!("P{}", id))
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(format!("Workshop 1: {}", producing)),
        Line::from(format!("  busy until: {:.0}", snap.ws1_busy_until.as_minutes())),
        Line::from(format!(
            "Transferring: {}",
            if transferring.is_empty() { "-".to_string() } else { transferring.join(", ") }
        )),
        Line::from(format!("Queue awaiting WS2: {}", snap.queue_len())),
        Line::from(format!("  {}", queue.join(" "))),
        Line::from(format!("WS2 current PID: {}", current)),
        Line::from(format!("  busy until: {:.0}", snap.ws2_busy_until.as_minutes())),
    ];
    let para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Workshops"))
        .wrap(Wrap { trim: true });
    f.render_widget(para, parts[0]);

    let visible = parts[1].height.saturating_sub(3) as usize;
    let mut assigned = vec![Line::from("PID: prod / transfer / proc")];
    for entry in snap.recent_assignments(visible) {
        assigned.push(Line::from(format!(
            "{}: {} / {} / {}",
            entry.id, entry.production, entry.transfer, entry.processing
        )));
    }
    let para = Paragraph::new(assigned)
        .block(Block::default().borders(Borders::ALL).title("Assigned times"));
    f.render_widget(para, parts[1]);
}
