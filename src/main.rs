use mem_analyzer::{
    cli::{interrupt, LineInput, Session, TerminalInput},
    Config,
    DevMode,
};

use clap::Parser;
use anyhow::Result;
use crossterm::tty::IsTty;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memanalyzer")]
#[command(about = "Shows how much memory the narrowest unsigned dtype saves for an array")]
struct Cli {
    /// Enable development mode (debug logging, error log kept under ./dev_data)
    #[arg(long)]
    dev: bool,

    /// Load settings from a TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append recorded errors to this file instead of the configured one
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Skip the cosmetic pauses
    #[arg(long)]
    no_delay: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on mode
    setup_logging(cli.dev);

    let dev_mode = DevMode::new(cli.dev)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::default(),
    };
    if cli.no_delay {
        config = config.without_delays();
    }
    if let Some(path) = cli.log_file {
        config.error_log.path = path;
    }
    config.error_log.path = dev_mode.error_log_path(&config.error_log.path);

    let stdout = io::stdout();
    if !stdout.is_tty() {
        config.prompt.clear_screen = false;
    }

    let stdin = io::stdin();
    let exit = if stdin.is_tty() {
        let session = Session::new(config, TerminalInput::new(), stdout)?;
        interrupt::install(session.error_log())?;
        session.run()?
    } else {
        let session = Session::new(config, LineInput::new(stdin.lock()), stdout)?;
        interrupt::install(session.error_log())?;
        session.run()?
    };

    tracing::debug!("Exited with {:?}", exit);
    Ok(())
}

fn setup_logging(dev_mode: bool) {
    // Logs go to stderr so they never interleave with the prompts on stdout.
    if dev_mode {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(io::stderr)
            .init();
    }
}
