//! Inventory client binary.
//!
//! Composition root that assembles:
//! 1. Content (definitions, engine config, scenario) via ContentFactory
//! 2. Runtime (authoritative store) via RuntimeBuilder
//! 3. A scenario run whose dumps or final snapshot are printed to stdout
//!
//! # Examples
//!
//! ```bash
//! # Bundled demo, text dumps
//! cargo run -p inventory-client
//!
//! # Another scenario, JSON output, file logging
//! INVENTORY_SCENARIO=demo INVENTORY_OUTPUT=json INVENTORY_LOG_DIR=logs cargo run -p inventory-client
//! ```

mod config;
mod logging;

use anyhow::{Context, Result};
use inventory_content::ContentFactory;
use inventory_runtime::{Runtime, RuntimeConfig, ScenarioReport, ScenarioRunner};

use config::{ClientConfig, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Starting inventory client");
    tracing::info!("Data directory: {}", config.data_dir.display());

    // 1. Load content
    let content = ContentFactory::new(&config.data_dir);
    let inventory_config = content.load_config()?;
    let definitions = content.load_definitions()?;
    let scenario = content
        .load_scenario(&config.scenario)
        .with_context(|| format!("Failed to load scenario '{}'", config.scenario))?;

    // 2. Build runtime
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            inventory: inventory_config,
            event_buffer_size: config.event_buffer_size,
            command_buffer_size: config.command_buffer_size,
        })
        .definitions(definitions)
        .build()
        .await?;
    let handle = runtime.handle();

    // 3. Run the scenario
    let mut runner = ScenarioRunner::new(handle.clone());
    let report = runner.run(&scenario).await?;

    match config.output {
        OutputFormat::Text => print_dumps(&report),
        OutputFormat::Json => {
            let snapshot = handle.snapshot().await?;
            let output = serde_json::json!({
                "scenario": report.name,
                "steps_run": report.steps_run,
                "dumps": report.dumps,
                "snapshot": snapshot,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    drop(runner);
    drop(handle);
    runtime.shutdown().await?;

    tracing::info!("Client shutdown complete");
    Ok(())
}

fn print_dumps(report: &ScenarioReport) {
    println!("scenario '{}': {} steps", report.name, report.steps_run);
    for dump in &report.dumps {
        println!();
        print!("{dump}");
    }
}
