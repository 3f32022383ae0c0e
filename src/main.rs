mod config;
mod error;
mod jiggler;
mod models;
mod panel;
mod session;
mod system;
mod utils;
mod web;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fd_lock::RwLock;
use jiggler::{Jiggler, Outcome};
use models::Plan;
use panel::ControlPanel;
use session::Session;
use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use system::SystemCursor;
use tracing::info;
use tracing_subscriber::EnvFilter;
use web::AppState;

#[derive(Parser)]
#[command(name = "jiggler")]
#[command(about = "Keeps the desktop awake by nudging the mouse", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the control panel (the default)
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Jiggle in the foreground without the panel, until done or Ctrl-C
    Run {
        /// Nudge when the clock second is a multiple of this (1-60)
        #[arg(short, long)]
        frequency: Option<u32>,
        /// Run length (e.g. 90m, 8h)
        #[arg(short, long)]
        duration: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = config::load_config()?;

    let lock_path = config::base_dir()?.join("jiggler.lock");
    let lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(lock_path)?;
    let mut lock = RwLock::new(lock_file);
    let _guard = lock.try_write().map_err(|_| {
        anyhow::anyhow!("Another jiggler is already running. Please close it before starting a new one.")
    })?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

            let panel = ControlPanel::new(Arc::new(Session::new()), SystemCursor);
            let state = Arc::new(AppState {
                panel: Arc::new(panel),
                config,
            });

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web::serve(addr, state))?;
        }
        Commands::Run {
            frequency,
            duration,
        } => {
            let frequency = frequency.unwrap_or(config.default_frequency_secs);
            let duration = match duration {
                Some(raw) => humantime::parse_duration(&raw)
                    .with_context(|| format!("Invalid duration '{}'", raw))?,
                None => std::time::Duration::from_secs(u64::from(config.default_duration_mins) * 60),
            };
            let plan = Plan::custom(frequency, chrono::Duration::from_std(duration)?)?;

            let session = Arc::new(Session::new());
            let generation = session
                .try_begin(chrono::Local::now())
                .context("Session is already running")?;

            let handler_session = session.clone();
            ctrlc::set_handler(move || {
                handler_session.request_stop(chrono::Local::now());
            })?;

            info!(
                frequency_secs = plan.frequency_secs,
                duration = %humantime::format_duration(duration),
                "jiggling in the foreground, press Ctrl-C to stop"
            );
            let outcome = Jiggler::new(session.clone(), plan, generation).run(&mut SystemCursor)?;

            let runtime = session.runtime(chrono::Local::now());
            match outcome {
                Outcome::Completed => println!("\nJiggling completed after {}.", utils::format_runtime(runtime)),
                Outcome::Stopped => println!("\nJiggler stopped after {}.", utils::format_runtime(runtime)),
            }
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
