//! Chroma CC
//!
//! Headless host for the control engine: REPL input, a periodic diff tick and
//! an outbound transport.

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chroma_cc::cli::{self, Command};
use chroma_cc::columns::{ColumnUpdate, Row};
use chroma_cc::config::{AppConfig, ConfigWatcher};
use chroma_cc::transport::{deliver, ConsoleTransport, Transport};
use chroma_cc::ControlSurface;

/// Chroma CC - drive a Chroma Console over MIDI CC
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "chroma-cc.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// List configured controls and exit
    #[arg(long)]
    list_controls: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.log_json)?;

    info!("Starting Chroma CC...");

    // Hot reload only makes sense when the file exists
    let (config, watcher) = if Path::new(&args.config).exists() {
        let (watcher, config) = ConfigWatcher::new(args.config.clone()).await?;
        info!("Configuration loaded from {} with hot-reload enabled", args.config);
        ((*config).clone(), Some(watcher))
    } else {
        info!("No config at {}, using built-in defaults", args.config);
        (AppConfig::default(), None)
    };

    let surface = config.surface()?;
    if !config.initial_values.is_empty() {
        info!("Restored {} initial values", config.initial_values.len());
    }

    if args.list_controls {
        print_controls(&surface, None);
        return Ok(());
    }

    let console = Arc::new(ConsoleTransport::new("console"));

    run_app(surface, config, watcher, console.clone()).await?;

    info!(
        "Chroma CC shutdown complete ({} CC messages sent)",
        console.sent_count()
    );
    Ok(())
}

async fn run_app(
    mut surface: ControlSurface,
    mut config: AppConfig,
    mut config_watcher: Option<ConfigWatcher>,
    transport: Arc<dyn Transport>,
) -> Result<()> {
    let (command_tx, mut command_rx) = mpsc::channel::<Command>(64);
    let _repl = cli::spawn_repl(command_tx);

    for update in surface.layout() {
        log_column_update(&surface, &update);
    }

    let mut tick = tokio::time::interval(config.engine.tick_interval());
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        "Ready: {} controls on channel {}, tick every {}ms",
        surface.registry().len(),
        surface.channel(),
        config.engine.tick_ms
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let messages = surface.tick();
                if !messages.is_empty() {
                    let sent = deliver(transport.as_ref(), &messages).await;
                    debug!("Tick flushed {}/{} messages", sent, messages.len());
                }
            }

            Some(command) = command_rx.recv() => {
                if !handle_command(&mut surface, transport.as_ref(), command).await {
                    break;
                }
            }

            Some(new_config) = next_config(&mut config_watcher) => {
                info!("📝 Configuration file changed, reloading...");
                apply_config(&mut surface, &mut tick, &config, &new_config);
                config = new_config;
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    // Flush anything set just before quitting
    let messages = surface.tick();
    deliver(transport.as_ref(), &messages).await;

    Ok(())
}

/// Returns false when the loop should stop
async fn handle_command(
    surface: &mut ControlSurface,
    transport: &dyn Transport,
    command: Command,
) -> bool {
    match command {
        Command::Set { identifier, value } => match surface.set_value(&identifier, value) {
            Ok(Some(event)) => {
                let update = surface.column_update(event);
                log_column_update(surface, &update);
            }
            Ok(None) => {}
            Err(e) => warn!("Rejected: {}", e),
        },
        Command::Show(identifier) => print_controls(surface, identifier.as_deref()),
        Command::Resend => {
            let messages = surface.resend_all();
            let sent = deliver(transport, &messages).await;
            info!("Resent {}/{} controls", sent, messages.len());
        }
        Command::Columns => {
            for update in surface.layout() {
                print_column_update(surface, &update);
            }
        }
        Command::Channel(channel) => {
            if let Err(e) = surface.set_channel(channel) {
                warn!("Rejected: {}", e);
            }
        }
        Command::Help => println!("{}", cli::HELP),
        Command::Quit => return false,
    }
    true
}

async fn next_config(watcher: &mut Option<ConfigWatcher>) -> Option<AppConfig> {
    match watcher {
        Some(watcher) => watcher.next_config().await,
        None => std::future::pending().await,
    }
}

/// Apply the live-reloadable parts of a new config
fn apply_config(
    surface: &mut ControlSurface,
    tick: &mut tokio::time::Interval,
    previous: &AppConfig,
    config: &AppConfig,
) {
    if let Err(e) = surface.set_channel(config.midi.channel) {
        warn!("⚠️  Keeping channel {}: {}", surface.channel(), e);
    }

    let interval = config.engine.tick_interval();
    if interval != tick.period() {
        *tick = tokio::time::interval(interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!("Tick interval now {}ms", config.engine.tick_ms);
    }

    for section in config.startup_only_changes(previous) {
        warn!("⚠️  {} changed; takes effect after restart", section);
    }
}

fn log_column_update(surface: &ControlSurface, update: &ColumnUpdate) {
    let header = surface
        .registry()
        .get(update.column)
        .map(|c| c.name.as_str())
        .unwrap_or("?");
    info!(
        "Column {} ({}): {} / {}",
        update.column,
        header,
        if update.bucket.enabled { "enabled" } else { "disabled" },
        update.bucket.color
    );
    for row in &update.enabled {
        if let Some(control) = surface.registry().get(row.index) {
            debug!("  {} enabled={}", control.identifier, row.value);
        }
    }
}

fn print_column_update(surface: &ControlSurface, update: &ColumnUpdate) {
    let registry = surface.registry();
    let header = registry
        .get(update.column)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    let state = if update.bucket.enabled {
        "enabled".green()
    } else {
        "disabled".red()
    };
    println!("\n{} {} [{}, {}]", "Column".bold(), header.cyan(), state, update.bucket.color);

    for row in &update.colors {
        let Some(control) = registry.get(row.index) else {
            continue;
        };
        let enabled = match row.row {
            Row::Header => "header".to_string(),
            Row::Group(_) => update
                .enabled
                .iter()
                .find(|e| e.index == row.index)
                .map(|e| e.value.to_string())
                .unwrap_or_else(|| "-".to_string()),
        };
        println!("  {:<28} {:<8} {}", control.name, enabled, row.value);
    }
}

fn print_controls(surface: &ControlSurface, only: Option<&str>) {
    let registry = surface.registry();
    let emitter = surface.emitter();

    if let Some(identifier) = only {
        match surface.describe(identifier) {
            Ok((control, value, text)) => println!(
                "{} ({}) cc:{} = {} {}",
                control.name.bright_white(),
                control.identifier.yellow(),
                control.address,
                value.to_string().green(),
                text
            ),
            Err(e) => println!("{}", e.to_string().red()),
        }
        return;
    }

    println!(
        "\n{} ({} controls, channel {}, {} pending)",
        "Controls".bold().cyan(),
        registry.len(),
        surface.channel(),
        emitter.pending_count()
    );
    for (index, control) in registry.all().enumerate() {
        let value = emitter.value_at(index).unwrap_or(control.default);
        println!(
            "  {:>2} cc:{:<3} {:<18} {:<28} {:>3}  {}",
            index,
            control.address,
            control.identifier.yellow(),
            control.name,
            value.to_string().green(),
            control.describe(value)
        );
    }
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .init();
    }

    Ok(())
}
