use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use wordtap::{
    accuracy::AccuracyPolicy,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    error::ConfigurationError,
    logging,
    runtime::{key_label, CrosstermEventSource, FixedTicker, Runner, SessionEvent},
    session::TypingSession,
};

const TICK_RATE_MS: u64 = 100;

/// type a fixed list of words and watch your accuracy
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal typing practice TUI. Type the words shown, one key at a time; each letter turns green or red and the accuracy for the current word updates as you go."
)]
pub struct Cli {
    /// words to type, separated by whitespace (overrides the config file)
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// how accuracy is computed: over the current word, or over the whole session
    #[clap(short = 'a', long, value_enum)]
    accuracy: Option<AccuracyPolicy>,

    /// path to a JSON config file (default: platform config dir)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Config file values with command line overrides applied
    fn resolve_config(&self, store: &dyn ConfigStore) -> Config {
        let mut config = store.load();
        if let Some(prompt) = &self.prompt {
            config.words = prompt.split_whitespace().map(String::from).collect();
        }
        if let Some(policy) = self.accuracy {
            config.accuracy_policy = policy;
        }
        config
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub session: TypingSession,
}

impl App {
    pub fn new(config: Config) -> Result<Self, ConfigurationError> {
        let session = config.build_session()?;
        Ok(Self { config, session })
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.kind == KeyEventKind::Release {
            return Action::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Char('c') if ctrl => return Action::Quit,
            KeyCode::Char('r') if ctrl => {
                self.session.reset();
                return Action::Continue;
            }
            _ => {}
        }

        // chords are shortcuts, never text
        if ctrl || key.modifiers.contains(KeyModifiers::ALT) {
            return Action::Continue;
        }

        if let Some(label) = key_label(&key) {
            self.session.handle_keystroke(&label);
        }
        Action::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("wordtap: logging disabled ({}): {}", path.display(), e);
        }
    }

    let config = cli.resolve_config(&cli.config_store());
    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, e).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            SessionEvent::Tick => {}
            SessionEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            SessionEvent::Key(key) => {
                if app.on_key(key) == Action::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    let snapshot = app.session.snapshot();
    f.render_widget(&snapshot, f.area());
}
