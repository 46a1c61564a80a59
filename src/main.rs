// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! AlertWave - Motion-Triggered Alarm Scheduler
//!
//! Headless runner: starts the clock engine, optionally feeds it a
//! simulated accelerometer, and prints every notification the scheduler
//! publishes.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use alertwave::audio::LogAudio;
use alertwave::config::Config;
use alertwave::core::{ClockEngine, Command, EventBus, SystemClock};
use alertwave::motion::{MotionSimulator, MotionSource};
use alertwave::VERSION;

/// AlertWave - Motion-Triggered Alarm Scheduler
#[derive(Parser, Debug)]
#[command(name = "alertwave")]
#[command(author = "bad-antics")]
#[command(version = VERSION)]
#[command(about = "Accelerometer monitoring wired to a personal alarm clock")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Demo mode with a simulated accelerometer
    #[arg(long)]
    demo: bool,

    /// Start monitoring immediately
    #[arg(long)]
    monitor: bool,

    /// Add an alarm at HH:MM on startup
    #[arg(long)]
    alarm: Option<String>,

    /// Simulator sample rate in Hz
    #[arg(long, default_value = "20.0")]
    sample_rate: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("AlertWave v{} - Motion-Triggered Alarm Scheduler", VERSION);

    // Load or create configuration
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;
    if let Err(e) = config.validate() {
        warn!("config at {:?} is invalid ({}); using defaults", config_path, e);
        config = Config::default();
    }
    if args.demo {
        config.demo_mode = true;
    }

    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, args.monitor, args.alarm, args.sample_rate))
}

async fn run(
    config: Config,
    monitor: bool,
    alarm: Option<String>,
    sample_rate: f64,
) -> Result<()> {
    let bus = Arc::new(EventBus::new(256));
    let clock = Arc::new(SystemClock);
    let audio = Box::new(LogAudio::default());
    let demo_mode = config.demo_mode;

    let (engine, handle) = ClockEngine::new(config, clock, audio, bus.clone());

    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);
    let engine_task = tokio::spawn(engine.run(shutdown_tx.subscribe()));

    // Sensor pump
    if demo_mode {
        let pump = handle.clone();
        tokio::spawn(async move {
            let mut source = MotionSimulator::new("sim-accel-1", sample_rate);
            info!("Simulated accelerometer '{}' at {} Hz", source.id(), source.sample_rate());
            loop {
                match source.next_sample().await {
                    Ok(sample) => {
                        if !pump.submit_sample(sample).await {
                            break;
                        }
                    }
                    Err(e) => {
                        // Degraded mode: monitoring stays on, transitions
                        // simply stop arriving.
                        warn!("{}", e);
                        break;
                    }
                }
            }
        });
    } else {
        warn!("No hardware sensor backend wired in; run with --demo for the simulator");
    }

    // Print notifications as they happen
    let mut events = bus.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("event #{}: {:?}", event.id, event.notification);
        }
    });

    if let Some(time) = alarm {
        match time.parse() {
            Ok(time) => {
                handle.send(Command::AddAlarm(time)).await;
            }
            Err(e) => warn!("{}", e),
        }
    }
    if monitor {
        handle.send(Command::ToggleMonitoring).await;
    }

    info!("AlertWave running - press Ctrl+C to shut down");
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, cleaning up...");
    let _ = shutdown_tx.send(());
    engine_task.await??;

    info!("AlertWave shutdown complete");
    Ok(())
}
