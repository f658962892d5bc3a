mod report;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use permap_core::{
    config::{self, AppConfig},
    NotificationLog, Scenario,
};
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() -> Result<()> {
    // A missing file loads as defaults, so the subscriber can be up before
    // the default config is written.
    let config = AppConfig::load()?;
    init_logging(&config.log_filter)?;
    config::ensure_default_config()?;

    let scenario = match &config.scenario_path {
        Some(path) => Scenario::load(path)?,
        None => {
            tracing::info!("no scenario configured, using the built-in market");
            Scenario::builtin()
        }
    };

    let mut sim = scenario
        .build(config.num_years)
        .context("failed to build simulation from scenario")?;

    let changes = NotificationLog::new();
    let names: Vec<String> = sim.products().names().map(str::to_string).collect();
    for name in &names {
        sim.subscribe(name, changes.listener())?;
    }

    for year in 0..sim.num_years() {
        sim.advance_to(year)?;
        for edit in scenario.edits_for(year)? {
            sim.edit(&edit.product, year, edit.update)?;
        }

        let moved = changes.drain();
        let edited = moved.iter().filter(|n| !n.is_time_change).count();
        tracing::debug!(year, notifications = moved.len(), edited, "year applied");

        report::print_year(&sim, year, &moved);
    }

    Ok(())
}

fn init_logging(default_filter: &str) -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("permap.log");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
