use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use khair::api::{ApiClient, AuthUser, Session};
use khair::app::App;
use khair::config::Config;
use khair::i18n::Locale;
use khair::{event, ui};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Terminal UI for association management
#[derive(Parser, Debug)]
#[command(name = "khair", version, about, long_about = None)]
struct Args {
    /// API base URL (overrides KHAIR_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Prefill the login email
    #[arg(short, long)]
    email: Option<String>,

    /// Skip the login screen with an existing bearer token
    #[arg(long, env = "KHAIR_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Resource to open first (members, payments, expenses, vehicles, trips, maintenance)
    #[arg(short, long)]
    resource: Option<String>,

    /// Label language
    #[arg(long, value_enum)]
    locale: Option<Locale>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Run in read-only mode (block all write operations)
    #[arg(long)]
    readonly: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Logging disabled, cannot open {:?}: {}", log_path, e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("khair started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(dir) = Config::config_dir() {
        return dir.join("khair.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".khair").join("khair.log");
    }
    PathBuf::from("khair.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();
    if let Some(email) = &args.email {
        config.last_email = Some(email.clone());
    }
    let api_url = config.effective_api_url(args.api_url.as_deref());
    let locale = config.effective_locale(args.locale);
    tracing::info!("Using API {} ({:?})", api_url, locale);

    let session = Session::new();
    let api = ApiClient::new(&api_url, session.clone())?;

    let user = match args.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => {
            let user = AuthUser::from_token(token);
            session.login(user.clone()).await;
            Some(user)
        },
        None => None,
    };

    let mut app = App::new(api, config, locale, args.readonly, args.resource.clone(), user);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = run_app(&mut terminal, &mut app).await;
    cleanup_terminal(&mut terminal)?;

    if let Err(err) = run_result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn cleanup_terminal<B: Backend + std::io::Write>(terminal: &mut Terminal<B>) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        // Apply finished list fetches, then start the next scheduled one
        app.drain_responses();
        app.dispatch_refresh();

        terminal.draw(|f| ui::render(f, app))?;

        if event::handle_events(app).await? {
            return Ok(());
        }

        app.sync_session().await;
    }
}
