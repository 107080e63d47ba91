//! Irrigation controller: host entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimulatedSensors   LogActuator   LogEventSink   SystemClock   │
//! │  (SensorModel)      (Actuator)    (EventSink)    (Clock)       │
//! │  LinkTransport + link-io thread (WebSocket telemetry)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          ControllerSession (pure logic)                │    │
//! │  │  Hysteresis · History · TelemetryChannel               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Ticker thread ──▶ EventQueue ──▶ control-loop thread          │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Configured through `IRRIGATION_*` environment variables; log level
//! through `RUST_LOG` (default `info`).
//!
//! With `IRRIGATION_RUN_SECS` set, the binary shuts down cleanly after
//! that many seconds: the pump is commanded off and the telemetry link
//! sends a close frame.  Without it the process runs until killed, and a
//! signal ends it without that shutdown path.
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use irrigation::adapters::actuator::LogActuator;
use irrigation::adapters::clock::SystemClock;
use irrigation::adapters::log_sink::LogEventSink;
use irrigation::app::service::ControllerSession;
use irrigation::config::SystemConfig;
use irrigation::events::EventQueue;
use irrigation::runtime;
use irrigation::sensors::simulated::SimulatedSensors;
use irrigation::telemetry::io_task;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Irrigation controller v{}", env!("CARGO_PKG_VERSION"));
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("TLS crypto provider already installed");
    }

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::from_env().context("invalid IRRIGATION_* configuration")?;
    info!(
        "Config: tick={}ms threshold={:.0}% power={}% endpoint={}",
        config.tick_interval_ms,
        config.control.humidity_threshold_percent,
        config.control.pump_power_percent,
        config.telemetry_endpoint,
    );

    // ── 3. Event queue + telemetry link ───────────────────────
    let queue = EventQueue::new();
    let (transport, _link_thread) = io_task::spawn(config.telemetry_endpoint.clone(), queue.clone())
        .context("spawning telemetry I/O thread")?;

    // ── 4. Controller session ─────────────────────────────────
    let mut session = ControllerSession::new(
        &config,
        SimulatedSensors::from_config(&config),
        SystemClock,
        transport,
    );
    if config.backfill_history {
        let mut rng = match config.sensor_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        session.backfill_history(&mut rng);
    }

    // ── 5. Event loop ─────────────────────────────────────────
    let rt = runtime::spawn(
        session,
        LogActuator::new(),
        LogEventSink::new(),
        queue,
        config.tick_interval(),
    )
    .context("spawning control loop")?;
    let handle = rt.handle();
    handle.start()?;

    match config.run_for_secs {
        Some(secs) => {
            std::thread::sleep(Duration::from_secs(secs));
            match handle.snapshot() {
                Ok(snap) => info!(
                    "Final: {} ticks, humidity {:.0}%, water {:.2}L, link {:?}",
                    snap.tick_count,
                    snap.reading.humidity,
                    snap.reading.water_consumption_l,
                    snap.channel_state,
                ),
                Err(e) => warn!("Final snapshot unavailable: {}", e),
            }
            handle.shutdown();
        }
        None => info!("Running until the process is terminated"),
    }

    rt.join()?;
    Ok(())
}
