//! ZapConnect
//!
//! Sends a message to any WhatsApp number without saving it as a contact:
//! the number is reduced to digits, combined with the message into a
//! `https://wa.me/` deep link and handed to the desktop's URL handler. The
//! last ten sends are kept so they can be reused.
//!
//! ## Usage
//!
//! ```text
//! zapconnect                                   interactive shell
//! zapconnect send -n "+1 (555) 019-9000" -m "Hello"
//! zapconnect send -n 5550199 --template 2
//! zapconnect history
//! zapconnect resend 1
//! zapconnect clear
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zapconnect_core::{
    Composer, Config, DraftField, FileStore, HistoryStore, LinkOpener, PrintOpener, SystemOpener,
};

mod render;
mod shell;

type AppComposer = Composer<FileStore, Box<dyn LinkOpener>>;

/// ZapConnect - direct WhatsApp sender
#[derive(Parser, Debug)]
#[command(name = "zapconnect")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Use an alternate configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store history in this directory instead of the configured one
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print links instead of opening them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Open a chat with a message and record it in history
    Send {
        /// Recipient number, any formatting
        #[arg(short, long)]
        number: String,

        /// Message text
        #[arg(short, long, default_value = "")]
        message: String,

        /// Append quick template N (see `templates`) to the message
        #[arg(short, long)]
        template: Option<usize>,
    },

    /// List recent sends, newest first
    History,

    /// Delete all history
    Clear,

    /// List quick templates
    Templates,

    /// Send history entry N again
    Resend {
        /// Position in `history`, starting at 1
        index: usize,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so stdout carries only user-facing output
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    debug!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load configuration {}", config_path.display()))?;

    let mut composer = build_composer(&args, &config);

    match args.command {
        None => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            shell::run(&mut composer, stdin.lock(), &mut stdout)?;
        }
        Some(command) => run_command(&mut composer, command)?,
    }

    Ok(())
}

fn build_composer(args: &Args, config: &Config) -> AppComposer {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| config.paths.data_dir.clone());
    info!("History directory: {}", data_dir.display());

    let store = HistoryStore::open_with_key(
        FileStore::new(data_dir),
        config.history.storage_key.clone(),
    );

    let opener: Box<dyn LinkOpener> = if args.dry_run {
        Box::new(PrintOpener)
    } else {
        Box::new(SystemOpener)
    };

    Composer::with_settings(store, opener, config.composer_settings())
}

fn run_command(composer: &mut AppComposer, command: Command) -> Result<()> {
    match command {
        Command::Send {
            number,
            message,
            template,
        } => {
            composer.update_draft(DraftField::Number, number);
            composer.update_draft(DraftField::Body, message);
            if let Some(position) = template {
                composer
                    .insert_template(one_based(position)?)
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            }
            send(composer)?;
        }
        Command::History => print!("{}", render::render_history(composer.history())),
        Command::Clear => {
            composer.clear_history();
            println!("History cleared.");
        }
        Command::Templates => print!("{}", render::render_templates(composer.templates())),
        Command::Resend { index } => {
            composer
                .reuse_at(one_based(index)?)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            send(composer)?;
        }
    }

    report_warning(composer);
    Ok(())
}

fn send(composer: &mut AppComposer) -> Result<()> {
    let sent = composer
        .send()
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    info!("Recorded history entry {}", sent.entry.id());
    Ok(())
}

fn one_based(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .context("Positions start at 1")
}

fn report_warning(composer: &mut AppComposer) {
    if let Some(warning) = composer.take_warning() {
        warn!("{}", warning);
        eprintln!("Warning: {}", warning.user_message());
    }
}
