// src/main.rs
// headless host: an in-memory scene driven by the OSC engine on a fixed tick
use std::thread;
use std::time::{Duration, Instant};

use oscbridge::{
    config::Config,
    controllers::{Engine, StartOutcome, Status},
    host::SceneHost,
    models::{BindingTable, Value},
};

// how often the monitor prints the last received message
const MONITOR_REFRESH: Duration = Duration::from_millis(500);

fn main() {
    env_logger::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}, using defaults", e);
            Config::default()
        }
    };

    let bindings_path = config.resolve_bindings_path();
    let table = match BindingTable::load(&bindings_path) {
        Ok(table) => table,
        Err(e) => {
            log::warn!("no bindings loaded from {}: {}", bindings_path.display(), e);
            BindingTable::new()
        }
    };

    let mut scene = SceneHost::new();
    scene.add_object(
        "objects['Cube']",
        [
            ("location", Value::Vector(vec![0.0, 0.0, 0.0])),
            ("rotation_quaternion", Value::Vector(vec![1.0, 0.0, 0.0, 0.0])),
            ("scale", Value::Vector(vec![1.0, 1.0, 1.0])),
            ("hide", Value::Bool(false)),
            ("glow", Value::Float(0.0)),
        ],
    );

    let monitor = config.engine.monitor;
    let mut engine = Engine::new(config);

    let started = match engine.on_load(&table, &scene) {
        Ok(Some(outcome)) => Ok(outcome),
        Ok(None) => {
            log::info!("autorun disabled, starting engine");
            engine.start(&table, &scene)
        }
        Err(e) => Err(e),
    };
    match started {
        Ok(StartOutcome::Started { skipped }) if !skipped.is_empty() => {
            log::warn!("{} bindings could not be set up", skipped.len());
        }
        Ok(_) => (),
        Err(e) => {
            log::error!("{}", e);
            return;
        }
    }

    let tick = engine.tick_interval();
    let mut last_refresh = Instant::now();

    while engine.status() == Status::Running {
        let started_at = Instant::now();

        if let Err(e) = engine.tick(&mut scene) {
            log::error!("{}", e);
            break;
        }

        if monitor && last_refresh.elapsed() >= MONITOR_REFRESH {
            last_refresh = Instant::now();
            let diagnostics = engine.diagnostics();
            if !diagnostics.last_address.is_empty() {
                log::info!(
                    "last OSC address {} payload {}",
                    diagnostics.last_address,
                    diagnostics.last_payload
                );
            }
            if let Some(stats) = engine.listener_stats() {
                log::debug!(
                    "received {} malformed {} queued {}",
                    stats.received,
                    stats.malformed,
                    stats.queued
                );
            }
        }

        if let Some(remaining) = tick.checked_sub(started_at.elapsed()) {
            thread::sleep(remaining);
        }
    }
}
