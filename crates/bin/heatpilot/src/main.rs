//! # heatpilot — one control cycle per invocation
//!
//! Composition root that wires the adapters together and runs a single
//! reconcile pass. An external scheduler (cron, a systemd timer) is
//! expected to start it periodically and never run two at once.
//!
//! ## Responsibilities
//! - Load configuration (file + environment)
//! - Initialise logging
//! - Construct the weather source, device registry, command channel and
//!   file stores selected by the configuration
//! - Run one [`ControlCycle`] and log its outcome
//!
//! Nothing escapes `main`: a configuration error, an aborted cycle or a
//! panic inside the cycle is logged with its full cause chain and the
//! process still exits successfully so the scheduler keeps its cadence.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::future::Future;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use heatpilot_adapter_melcloud::MelCloudRegistry;
use heatpilot_adapter_open_meteo::OpenMeteoWeather;
use heatpilot_adapter_telegram::TelegramChannel;
use heatpilot_adapter_virtual::{VirtualRegistry, VirtualWeather};
use heatpilot_app::ports::{DeviceRegistry, StateStore, WeatherSource};
use heatpilot_app::services::control_cycle::ControlCycle;
use heatpilot_domain::time;

use config::{Config, LoggingConfig, RegistryKind};

#[tokio::main]
async fn main() {
    let loaded = Config::load().context("could not load configuration");

    let filter = match &loaded {
        Ok(config) => config.logging.filter.clone(),
        Err(_) => LoggingConfig::default().filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match loaded {
        Ok(config) => {
            guarded(async move { run(&config).await }).await;
        }
        Err(err) => tracing::error!(error = format!("{err:#}"), "cycle aborted"),
    }
}

/// Run `cycle` on its own task. Errors and panics are logged, never
/// propagated. Returns whether the cycle completed.
async fn guarded<F>(cycle: F) -> bool
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    match tokio::spawn(cycle).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::error!(error = format!("{err:#}"), "cycle aborted");
            false
        }
        Err(err) if err.is_panic() => {
            tracing::error!(error = %err, "cycle panicked");
            false
        }
        Err(err) => {
            tracing::error!(error = %err, "cycle task cancelled");
            false
        }
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let timeout = config.call_timeout();
    match config.registry.kind {
        RegistryKind::Melcloud => {
            let weather = OpenMeteoWeather::new(config.location.clone(), timeout)?;
            let registry = MelCloudRegistry::new(config.registry.melcloud.clone(), timeout)?;
            execute(config, weather, registry).await
        }
        RegistryKind::Virtual => {
            let simulated = &config.registry.simulated;
            let weather = VirtualWeather::new(simulated.outdoor_temperature);
            let remembered = config
                .storage
                .state_store()
                .load()
                .await
                .context("could not load state to resume virtual units")?;
            let registry = VirtualRegistry::resume(&simulated.units, &remembered.memory)?;
            execute(config, weather, registry).await
        }
    }
}

async fn execute<W, R>(config: &Config, weather: W, registry: R) -> anyhow::Result<()>
where
    W: WeatherSource,
    R: DeviceRegistry,
{
    let settings = config.cycle_settings()?;
    let channel = TelegramChannel::new(config.telegram.clone(), settings.call_timeout)?;

    let cycle = ControlCycle::new(
        weather,
        registry,
        channel,
        config.storage.state_store(),
        config.storage.history_log(),
        settings,
    );

    let report = cycle.run(time::now()).await?;
    tracing::info!(
        outdoor = report.outdoor_temperature,
        devices = report.devices.len(),
        commands = report.commands_applied(),
        "cycle complete"
    );
    Ok(())
}
