use anyhow::Context;
use clap::Parser;
use rakecore::session::{SessionLock, SessionLog};
use rakecore::telemetry::MetricsRecorder;
use rakecore::{Reading, SensorSample};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

use acquisition::bme680::Bme680Sensor;
use acquisition::gps::SerialGps;
use acquisition::synthetic::{SyntheticGps, SyntheticSensor};
use acquisition::{GpsSource, SensorSource};
use config::LoggerConfig;
use display::bridge::DisplayBridge;

mod acquisition;
mod config;
mod display;

#[derive(Parser)]
#[command(author, version, about = "Tick-driven BME680 + GPS trail logger")]
struct Args {
    /// Load a logger config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory receiving rake_log_*.csv session files
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
    /// Seconds between readings
    #[arg(long, default_value_t = 1.0)]
    interval_secs: f64,
    #[arg(long, default_value = "/dev/i2c-1")]
    i2c_bus: String,
    #[arg(long, default_value = "/dev/serial0")]
    gps_port: String,
    #[arg(long, default_value_t = 9600)]
    gps_baud: u32,
    /// Use synthetic sensor and GPS sources instead of hardware
    #[arg(long, default_value_t = false)]
    synthetic: bool,
    /// Seed for the synthetic sources
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Run without any GPS source
    #[arg(long, default_value_t = false)]
    no_gps: bool,
    /// Host the live display endpoint
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value = "127.0.0.1:9000")]
    bind: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = &args.config {
        LoggerConfig::load(path)?
    } else {
        LoggerConfig::from_args(
            args.log_dir.clone(),
            args.interval_secs,
            args.i2c_bus.clone(),
            args.gps_port.clone(),
            args.gps_baud,
            args.bind.clone(),
        )
    };

    // Singleton enforcement comes before any file or device is touched.
    // A second instance must refuse to start, not corrupt the session.
    let _lock = SessionLock::acquire(&config.log_dir)
        .context("acquiring the logger singleton lock")?;

    let mut session = SessionLog::create(&config.log_dir).context("creating session log")?;
    log::info!("logging to {}", session.path().display());

    let mut sensor: Box<dyn SensorSource> = if args.synthetic {
        Box::new(SyntheticSensor::new(args.seed, config.warmup_ticks()))
    } else {
        // An unreachable bus is fatal so a supervisor restart is meaningful.
        Box::new(
            Bme680Sensor::open(
                &config.i2c_bus,
                Duration::from_secs(config.gas_warmup_secs),
            )
            .context("initializing BME680")?,
        )
    };

    let mut gps: Option<Box<dyn GpsSource>> = if args.no_gps {
        None
    } else if args.synthetic {
        Some(Box::new(SyntheticGps::new(args.seed)))
    } else {
        match SerialGps::open(&config.gps_port, config.gps_baud) {
            Ok(receiver) => Some(Box::new(receiver)),
            Err(e) => {
                // GPS is optional equipment; log without it.
                log::warn!("running without GPS: {:#}", e);
                None
            }
        }
    };

    let bridge = DisplayBridge::new(config.history_len);
    if args.serve {
        let address: SocketAddr = config
            .bind
            .parse()
            .with_context(|| format!("parsing bind address {}", config.bind))?;
        bridge.serve(address);
    }

    let metrics = MetricsRecorder::new();
    let shutdown = spawn_shutdown_watcher();
    let interval = Duration::from_secs_f64(config.interval_secs.max(0.1));
    bridge.publish_status("recording started");

    while !shutdown.load(Ordering::SeqCst) {
        let tick_started = Instant::now();

        let sample = match sensor.sample() {
            Ok(sample) => sample,
            Err(e) => {
                // Transient failure: null fields this tick, try again next.
                log::warn!("sensor read failed: {:#}", e);
                metrics.record_read_failure();
                SensorSample::empty()
            }
        };
        let fix = gps.as_mut().and_then(|receiver| receiver.read_fix());

        let reading = Reading::from_parts(SessionLog::timestamp_now(), sample, fix);
        match session.append(&reading) {
            Ok(()) => metrics.record_row(),
            Err(e) => log::error!("failed to append row: {}", e),
        }
        bridge.publish(&reading, metrics.snapshot());

        if let Some(remaining) = interval.checked_sub(tick_started.elapsed()) {
            thread::sleep(remaining);
        }
    }

    let rows = session.finish()?;
    bridge.publish_status(&format!("recording stopped after {} rows", rows));
    Ok(())
}

/// Watches for Ctrl-C on a dedicated thread so the acquisition loop can
/// stay synchronous. A requested shutdown exits zero; supervisors only
/// restart on startup failures.
fn spawn_shutdown_watcher() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let watcher_flag = flag.clone();
    thread::spawn(move || {
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build runtime");
        runtime.block_on(async move {
            if signal::ctrl_c().await.is_ok() {
                log::info!("shutdown requested");
                watcher_flag.store(true, Ordering::SeqCst);
            }
        });
    });
    flag
}
