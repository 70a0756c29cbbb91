//! pm2-prometheus-exporter - Prometheus exporter for PM2-managed processes.

mod cli;
mod commands;

use clap::Parser;
use pm2_prometheus_exporter::config::{load_config, validate_effective_config, Config};
use pm2_prometheus_exporter::handlers::router;
use pm2_prometheus_exporter::state::{scraper_for, AppState};
use pm2_prometheus_exporter::warmup::SUPPRESSED_METRIC;
use pm2_prometheus_exporter::WarmupSuppressor;
use std::net::{IpAddr, SocketAddr};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

use crate::cli::{Args, Commands, LogLevel};

/// Resolves configuration from CLI args, config file, and defaults.
///
/// Precedence: CLI (if provided) > config file > default.
fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(port) = args.port {
        config.port = Some(port);
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(format!("{level:?}").to_ascii_lowercase());
    }
    if let Some(bin) = &args.pm2_bin {
        config.pm2_bin = Some(bin.clone());
    }
    if let Some(path) = &args.test_data_file {
        config.test_data_file = Some(path.clone());
    }

    Ok(config)
}

/// Initializes tracing logging subsystem with configured log level
fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let level = LogLevel::from_name(config.log_level()).unwrap_or(LogLevel::Info);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.as_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Logging initialized with level: {:?}", level);
    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// -------------------------------------------------------------------
/// MAIN APPLICATION ENTRY POINT
/// -------------------------------------------------------------------
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Warm-up window starts with the process, before anything else runs.
    let warmup = WarmupSuppressor::starting_now();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    if args.check_config {
        if let Err(e) = validate_effective_config(&config) {
            eprintln!("❌ Configuration invalid: {}", e);
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        return commands::show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        return match command {
            Commands::Config {
                output,
                format,
                commented,
            } => commands::command_config(output.clone(), *format, *commented),
            Commands::Test {
                iterations,
                verbose,
            } => {
                if let Err(e) = validate_effective_config(&config) {
                    eprintln!("❌ Configuration invalid: {}", e);
                    std::process::exit(1);
                }
                setup_logging(&config)?;
                commands::command_test(*iterations, *verbose, &config, warmup).await
            }
            Commands::GenerateTestdata { output, processes } => {
                commands::command_generate_testdata(output.clone(), *processes)
            }
        };
    }

    // Validate config before starting exporter
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    setup_logging(&config)?;

    info!("Starting pm2-prometheus-exporter");
    info!(
        "Reporting {} as 0 from {} until {}",
        SUPPRESSED_METRIC,
        warmup.started_at(),
        warmup.ends_at()
    );

    let bind_ip_str = config.bind_addr().to_string();
    let port = config.port();

    let scraper = scraper_for(&config, warmup);
    info!("Process list source: {}", scraper.provider().describe());

    let state = AppState::new(scraper);
    let app = router(state);

    // Configure HTTP server and start listening; failing to bind is fatal
    let addr = SocketAddr::new(bind_ip_str.parse::<IpAddr>()?, port);
    let listener = TcpListener::bind(addr).await?;
    info!(
        "pm2-prometheus-exporter listening on http://{}:{}",
        bind_ip_str, port
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("pm2-prometheus-exporter stopped gracefully");
    Ok(())
}
