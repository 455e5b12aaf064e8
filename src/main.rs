mod ui;

use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::LevelFilter;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use drumsheet::{
    app_dirs::AppDirs,
    audio::{self, AudioSink},
    config::{Config, ConfigStore, FileConfigStore},
    engine::{EventOutcome, MatchEngine, ToggleOutcome},
    headless::run_headless,
    input::InputAdapter,
    runtime::{spawn_terminal_events, ChannelEventSource, DrumEvent, EventBus, FixedTicker, Runner},
    sheet::{read_sheet_file, tokenize},
};

use crate::ui::PadFlash;

const TICK_RATE_MS: u64 = 50;

/// drum trigger sheet matcher with live hit tracking
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Matches hits from a drum trigger against a sheet of expected pads (RH, LH, RF), tracking progress, accuracy and a live hit feed."
)]
pub struct Cli {
    /// sheet to load, e.g. "RH LH RF"
    #[clap(short = 's', long)]
    sheet: Option<String>,

    /// import the sheet from a text file
    #[clap(short = 'f', long, conflicts_with = "sheet")]
    sheet_file: Option<PathBuf>,

    /// read hits (one token per line) from this device or file
    #[clap(short = 'd', long)]
    device: Option<PathBuf>,

    /// judge hits without the terminal UI; reads stdin unless --device is given
    #[clap(long)]
    headless: bool,

    /// start matching as soon as the sheet is loaded
    #[clap(long)]
    start: bool,

    /// number of entries kept in the live hit feed
    #[clap(long)]
    history: Option<usize>,

    /// input poll interval in milliseconds
    #[clap(long)]
    poll_ms: Option<u64>,

    /// config file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// write logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply command line overrides on top of the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(history) = self.history {
            config.history_capacity = history;
        }
        if let Some(poll_ms) = self.poll_ms {
            config.poll_interval_ms = poll_ms;
        }
        config
    }

    /// The sheet to start with: --sheet, then --sheet-file, then the config default
    fn sheet_tokens(&self, config: &Config) -> io::Result<Vec<String>> {
        if let Some(sheet) = &self.sheet {
            Ok(tokenize(sheet))
        } else if let Some(path) = &self.sheet_file {
            read_sheet_file(path)
        } else {
            Ok(config
                .default_sheet
                .as_deref()
                .map(tokenize)
                .unwrap_or_default())
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub engine: MatchEngine,
    pub config: Config,
    pub sheet_source: Vec<String>,
    pub flashes: [Option<PadFlash>; 3],
    pub status: Option<String>,
    /// Text typed into the load prompt while it is open.
    pub prompt: Option<String>,
}

impl App {
    pub fn new(config: Config, audio: Box<dyn AudioSink>, sheet: Vec<String>) -> Self {
        let mut engine = MatchEngine::new(audio, config.history_capacity);
        engine.load_sheet(&sheet);
        Self {
            engine,
            config,
            sheet_source: sheet,
            flashes: [None; 3],
            status: None,
            prompt: None,
        }
    }

    pub fn on_hit(&mut self, raw: &str, now: Instant) -> EventOutcome {
        let outcome = self.engine.process_event(raw);
        if let Some(pad) = outcome.struck() {
            self.flashes[pad.index()] = Some(PadFlash {
                judgement: outcome.hit_judgement(),
                until: now + Duration::from_millis(self.config.flash_ms),
            });
        }
        self.status = match (&outcome, outcome.completed()) {
            (_, Some(accuracy)) => Some(format!("sheet complete! accuracy {accuracy}%")),
            (EventOutcome::Unmatched(None), _) => Some(format!("unknown token '{}'", raw.trim())),
            _ => None,
        };
        outcome
    }

    pub fn toggle(&mut self) {
        self.status = match self.engine.toggle_running() {
            ToggleOutcome::Warning(w) => Some(w.to_string()),
            _ => None,
        };
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.status = None;
    }

    /// Reload the sheet the app was started with.
    pub fn reload(&mut self) {
        self.engine.load_sheet(&self.sheet_source);
        self.status = Some(format!("loaded {} steps", self.engine.session().sheet.len()));
    }

    /// Load a sheet typed at the prompt: a path to an existing file is
    /// imported, anything else is read as sheet text.
    pub fn load_from(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            self.status = Some("nothing to load".to_string());
            return;
        }
        let path = Path::new(input);
        let tokens = if path.is_file() {
            match read_sheet_file(path) {
                Ok(tokens) => tokens,
                Err(e) => {
                    self.status = Some(format!("could not read {input}: {e}"));
                    return;
                }
            }
        } else {
            tokenize(input)
        };
        self.sheet_source = tokens;
        self.reload();
    }

    pub fn on_disconnect(&mut self) {
        self.status = Some("input disconnected".to_string());
    }

    /// Drop highlights whose time is up. Returns true if anything changed.
    pub fn expire_flashes(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for slot in self.flashes.iter_mut() {
            if slot.is_some_and(|flash| flash.is_expired(now)) {
                *slot = None;
                changed = true;
            }
        }
        changed
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> KeyAction {
        if key.kind != KeyEventKind::Press {
            return KeyAction::Continue;
        }
        if self.prompt.is_some() {
            match key.code {
                KeyCode::Esc => self.prompt = None,
                KeyCode::Enter => {
                    if let Some(text) = self.prompt.take() {
                        self.load_from(&text);
                    }
                }
                KeyCode::Backspace => {
                    if let Some(text) = self.prompt.as_mut() {
                        text.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if let Some(text) = self.prompt.as_mut() {
                        text.push(c);
                    }
                }
                _ => {}
            }
            return KeyAction::Continue;
        }
        match key.code {
            KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return KeyAction::Quit
            }
            KeyCode::Char(' ') => self.toggle(),
            KeyCode::Char('r') => self.reset(),
            KeyCode::Char('l') => self.reload(),
            KeyCode::Char('o') => {
                self.prompt = Some(String::new());
                self.status = None;
            }
            KeyCode::Char(c @ '1'..='3') => {
                self.on_hit(&c.to_string(), now);
            }
            _ => {}
        }
        KeyAction::Continue
    }
}

fn open_log_file(cli: &Cli) -> Option<fs::File> {
    let path = cli.log_file.clone().or_else(AppDirs::log_path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn init_logging(cli: &Cli) {
    let default_filter = if cli.headless { "info" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    // the terminal UI owns the screen, so logs go to a file
    if !cli.headless || cli.log_file.is_some() {
        match open_log_file(cli) {
            Some(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            None => {
                builder.filter_level(LevelFilter::Off);
            }
        }
    }
    builder.init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = cli.apply_to(cli.config_store().load());
    let sheet = cli.sheet_tokens(&config)?;
    let audio = audio::open(&config.sounds);

    if cli.headless {
        return run_headless_mode(&cli, config, sheet, audio);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty (use --headless to pipe hits)")
            .exit();
    }

    let bus = EventBus::new();
    let poll = Duration::from_millis(config.poll_interval_ms);
    let _adapter = match &cli.device {
        Some(path) => Some(InputAdapter::open(path, bus.sender(), poll)?),
        None => None,
    };
    spawn_terminal_events(bus.sender());
    let runner = Runner::new(
        bus.into_source(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let mut app = App::new(config, audio, sheet);
    if cli.start {
        app.toggle();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn run_headless_mode(
    cli: &Cli,
    config: Config,
    sheet: Vec<String>,
    audio: Box<dyn AudioSink>,
) -> Result<(), Box<dyn Error>> {
    let mut engine = MatchEngine::new(audio, config.history_capacity);
    engine.load_sheet(&sheet);

    let bus = EventBus::new();
    let poll = Duration::from_millis(config.poll_interval_ms);
    let mut adapter = match &cli.device {
        Some(path) => InputAdapter::open(path, bus.sender(), poll)?,
        None => InputAdapter::stdin(bus.sender(), poll),
    };
    let runner = Runner::new(
        bus.into_source(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_headless(&runner, &mut engine, &mut out)?;
    adapter.stop();
    Ok(())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<ChannelEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        let now = Instant::now();
        let redraw = match runner.step() {
            DrumEvent::Tick => app.expire_flashes(now),
            DrumEvent::Resize => true,
            DrumEvent::Hit(raw) => {
                app.on_hit(&raw, now);
                true
            }
            DrumEvent::Disconnected => {
                app.on_disconnect();
                true
            }
            DrumEvent::Key(key) => {
                if app.handle_key(key, now) == KeyAction::Quit {
                    break;
                }
                true
            }
        };

        if redraw {
            app.expire_flashes(now);
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}
