use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use toolbench::{
    install_prometheus, setup_logging, Cli, CliRunner, Config, Metrics, TracingAdRenderer, TracingNotifier,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    info!("Starting toolbench v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config(&args).await?;

    // The recorder has to be in place before any counter is registered
    let prometheus = if args.metrics {
        Some(install_prometheus()?)
    } else {
        None
    };
    let metrics = Arc::new(Metrics::new());

    let cli_runner = CliRunner::new(
        config,
        &args,
        metrics,
        Arc::new(TracingNotifier),
        Arc::new(TracingAdRenderer),
    );
    cli_runner.config.validate()?;

    let interrupt = async {
        let _ = signal::ctrl_c().await;
    };
    let result = cli_runner.run_until(args.command, interrupt).await;

    if let Some(handle) = prometheus {
        print!("{}", handle.render());
    }

    if let Err(e) = result {
        error!("Application error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn load_config(args: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let config = if let Some(config_path) = &args.config {
        // Load from file
        let config_content = tokio::fs::read_to_string(config_path).await?;
        Config::from_json(&config_content)?
    } else {
        // Use default configuration
        Config::default()
    };

    info!("Configuration loaded successfully");
    info!("Max file size: {}", toolbench::format_bytes(config.intake.max_size));
    info!("Max files: {}", config.intake.max_files);

    Ok(config)
}
