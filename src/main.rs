//! logria: interactive terminal log stream viewer.

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use logria::config::Config;
use logria::error::LogriaError;
use logria::stream::{CommandInput, InputStream};
use logria::tui::Logria;

/// Interactive terminal log stream viewer with live regex filtering,
/// parsing, and analytics.
#[derive(Debug, Parser)]
#[command(name = "logria")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version and exit.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),

    /// Command to stream from; quote to pass arguments. Only the first
    /// occurrence is used.
    #[arg(short = 'e', value_name = "CMD", action = ArgAction::Append)]
    exec: Vec<String>,

    /// Disable command history persistence.
    #[arg(short = 'c', long = "no-cache", action = ArgAction::SetTrue)]
    no_cache: bool,

    /// Disable adaptive polling.
    #[arg(short = 'n', long = "no-smart-poll", action = ArgAction::SetTrue)]
    no_smart_poll: bool,
}

fn run() -> logria::Result<()> {
    let cli = Cli::parse();

    if !std::io::stdin().is_terminal() {
        return Err(LogriaError::PipedInput);
    }

    let config = Config::from_env(!cli.no_cache, !cli.no_smart_poll)?;
    config.ensure_dirs()?;
    init_tracing(&config);

    let streams: Vec<Box<dyn InputStream>> = match cli.exec.first() {
        Some(command) => {
            let argv: Vec<String> = command.split(' ').map(str::to_string).collect();
            vec![Box::new(CommandInput::new(argv))]
        }
        None => Vec::new(),
    };

    Logria::new(config, streams)?.run()
}

/// Route tracing output to a log file; the TUI owns the terminal. When the
/// file cannot be opened, logging is simply absent.
fn init_tracing(config: &Config) {
    use tracing_subscriber::EnvFilter;

    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
    else {
        return;
    };
    let filter = EnvFilter::try_from_env("LOGRIA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
