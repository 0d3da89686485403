use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use donor_match::config::DonorMatchConfig;
use donor_match::DonorMatch;
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use sea_orm::{ConnectOptions, Database};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod dsn;
mod http;
mod shutdown;

use dsn::{absolutize_sqlite_dsn, detect_from_dsn, SQLITE_MEMORY};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "donor_match";

/// Donor Match Server - blood donor registry and request matching
#[derive(Parser)]
#[command(name = "donor-match-server")]
#[command(about = "Donor Match Server - blood donor registry and request matching")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Donor Match Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, &args),
    }
}

async fn connect_database(config: &AppConfig, args: &CliArgs) -> Result<sea_orm::DatabaseConnection> {
    let mut opts = if args.mock {
        // --mock overrides whatever the config points at.
        // An in-memory SQLite database lives per connection; keep exactly one.
        let mut opts = ConnectOptions::new(SQLITE_MEMORY);
        opts.max_connections(1).min_connections(1);
        opts
    } else {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("Database configuration missing"))?;
        detect_from_dsn(db_config)?;

        // Base dir for resolving relative sqlite paths (already absolute & created)
        let base_dir = PathBuf::from(&config.server.home_dir);
        let dsn = absolutize_sqlite_dsn(db_config.url.trim(), &base_dir, true)?;

        let mut opts = ConnectOptions::new(dsn);
        opts.acquire_timeout(Duration::from_secs(
            db_config.acquire_timeout_sec.unwrap_or(5),
        ));
        if let Some(max) = db_config.max_conns {
            opts.max_connections(max);
        }
        opts
    };
    opts.sqlx_logging(false);

    let dsn = opts.get_url().to_string();
    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {dsn}"))?;
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let module_cfg: DonorMatchConfig = config.module_config(MODULE_NAME)?;
    let db = connect_database(&config, &args).await?;
    let module = DonorMatch::init(db, &module_cfg).await?;

    let router = http::build_router(&module, config.server.timeout_sec)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            anyhow!(
                "Invalid bind address '{}:{}': {}",
                config.server.host,
                config.server.port,
                e
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", addr);

    let shutdown = async {
        if let Err(e) = shutdown::wait_for_shutdown().await {
            tracing::error!("Failed to listen for shutdown signals: {}", e);
        }
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow!(e))
}

fn check_config(config: AppConfig, args: &CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let (false, Some(db)) = (args.mock, config.database.as_ref()) {
        detect_from_dsn(db)?;
    }
    let module_cfg: DonorMatchConfig = config.module_config(MODULE_NAME)?;
    if module_cfg.default_page_size > module_cfg.max_page_size {
        return Err(anyhow!(
            "modules.{MODULE_NAME}.default_page_size ({}) exceeds max_page_size ({})",
            module_cfg.default_page_size,
            module_cfg.max_page_size
        ));
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
