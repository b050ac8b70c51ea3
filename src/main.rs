//! dodream AI server entry point.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dodream_ai::config::{Config, Overrides};
use dodream_ai::reload::{self, Supervisor};
use dodream_ai::utils::shutdown_signal;
use dodream_ai::{build_app, metrics, server};

/// dodream AI server.
#[derive(Parser, Debug)]
#[command(name = "dodream-ai")]
#[command(about = "Health check and router shell for the dodream AI server")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Bind address (overrides HOST).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Bind port (overrides PORT).
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Restart automatically when the binary or RELOAD_DIRS change. Same
    /// development mode the server previously ran with under uvicorn
    /// (`--reload`); off by default for the compiled binary.
    #[arg(long, global = true)]
    reload: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;
    config.apply_overrides(Overrides {
        host: args.host,
        port: args.port,
        reload: args.reload,
        verbose: args.verbose,
    });

    init_logging(&config);

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Serve) | None => cmd_serve(config).await,
    }
}

/// Initialize the tracing subscriber from the loaded configuration.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(config.log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DODREAM AI SERVER - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("  Bind address: {}", config.bind_address());
    println!("  Auto-reload:  {}", config.reload);
    if config.reload {
        println!("  Watching:     executable, {:?}", config.reload_dirs);
    }
    match config.metrics_address() {
        Some(addr) => println!("  Metrics:      http://{}/metrics", addr),
        None => println!("  Metrics:      disabled"),
    }
    println!("  Log filter:   {}", config.log_filter());
    println!("======================================================================");

    Ok(())
}

/// Run the HTTP server, under the reload supervisor when requested.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    if config.reload && !reload::is_worker() {
        info!("Auto-reload enabled; this is for local development only");
        let supervisor = Supervisor::for_current_process(&config.reload_dirs)?;
        supervisor.run().await?;
        return Ok(());
    }

    metrics::init_metrics();
    if let Some(addr) = config.metrics_address() {
        let resolved = tokio::net::lookup_host(&addr)
            .await?
            .next()
            .ok_or_else(|| anyhow::anyhow!("cannot resolve metrics address {}", addr))?;
        metrics::install_exporter(resolved)?;
    }

    let app = build_app();
    let listener = server::bind(&config).await.map_err(|e| {
        error!("{}", e);
        e
    })?;

    server::serve(listener, app, shutdown_signal()).await?;
    info!("Server stopped");

    Ok(())
}
