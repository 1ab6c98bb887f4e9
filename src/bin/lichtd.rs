//! Light daemon: drives the fixture and serves text commands over TCP.
//!
//! Usage: `lichtd [config.toml]`. Log verbosity follows `RUST_LOG`
//! (default `info`).

use std::path::PathBuf;

use anyhow::Context;
use env_logger::Env;
use licht::{Config, Light, LogDriver, Scheduler, Server};
use log::{info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path.display()))?,
        None => {
            info!("no configuration file given, using defaults");
            Config::default()
        }
    };

    // No PWM hardware binding is compiled in; writes are logged instead.
    let fixture = config.fixture(LogDriver);
    let light = Light::new(fixture, config.default_color());
    let scheduler = Scheduler::new(light, config.restore);
    scheduler
        .set_immediate(config.default_color())
        .context("writing startup color")?;

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    let server = Server::new(scheduler.clone(), config.default_color());

    tokio::select! {
        result = server.serve(listener) => result.context("accepting connections")?,
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for ctrl-c")?;
            info!("shutting down");
        }
    }

    scheduler.close();
    scheduler.wait_idle().await;
    if let Err(err) = scheduler.set_immediate(config.shutdown_color()) {
        warn!("could not write shutdown color: {}", err);
    }
    Ok(())
}
