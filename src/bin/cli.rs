use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use liked_playlist_sync as lib;
use lib::api::spotify::SpotifyService;
use lib::config::Config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::subscriber as tracing_subscriber_global;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "liked-sync", version)]
struct Cli {
    /// Path to config TOML (environment variables override its values)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the most recent likes into the target playlist (default)
    Sync,
    /// Print the target playlist's name, description and track count
    Verify,
    /// Validate configuration and exit
    ConfigValidate,
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let etc_path = Path::new("/etc/liked-sync/config.toml");
            etc_path.exists().then(|| etc_path.to_path_buf())
        }
    };
    let cfg = match path {
        Some(p) => Config::from_path(&p)
            .with_context(|| format!("loading config from {}", p.display()))?
            .with_overrides(|key| std::env::var(key).ok())?,
        None => Config::from_env()?,
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Logs go to stdout and, when a log dir is configured, to a daily-rotated file.
fn init_logging(cfg: &Config) -> Result<Option<WorkerGuard>> {
    let _ = LogTracer::init();

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let (file_layer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "liked-sync.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().with_ansi(false).with_writer(non_blocking)), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer);
    tracing_subscriber_global::set_global_default(subscriber)
        .context("installing global tracing subscriber")?;
    Ok(guard)
}

/// Cancel in-flight requests on Ctrl-C instead of leaving them running.
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; cancelling in-flight requests");
            on_signal.cancel();
        }
    });
    cancel
}

async fn run_verify(cfg: &Config, cancel: CancellationToken) -> Result<()> {
    let service = SpotifyService::new(cfg, cancel);
    let token = service.acquire_token().await.context("acquiring access token")?;
    let info = service
        .fetch_playlist_info(&token)
        .await
        .context("reading playlist details")?;
    println!("name:        {}", info.name);
    println!("description: {}", info.description.as_deref().unwrap_or(""));
    match info.track_total {
        Some(n) => println!("tracks:      {}", n),
        None => println!("tracks:      unknown"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Sync);

    let cfg = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            return match command {
                Commands::ConfigValidate => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            };
        }
    };

    let _guard = match init_logging(&cfg) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup failed: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match command {
        Commands::Sync => {
            let service = SpotifyService::new(&cfg, cancel_on_interrupt());
            let report = lib::sync::run_sync(&service, chrono::Utc::now()).await;
            lib::report::render(&report);
            ExitCode::from(report.outcome.exit_code())
        }
        Commands::Verify => match run_verify(&cfg, cancel_on_interrupt()).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("verification failed: {:#}", e);
                ExitCode::FAILURE
            }
        },
        Commands::ConfigValidate => {
            let missing = cfg.missing_required();
            if missing.is_empty() {
                println!("OK");
                ExitCode::SUCCESS
            } else {
                eprintln!("Config validation failed: missing {}", missing.join(", "));
                ExitCode::from(2)
            }
        }
    }
}
