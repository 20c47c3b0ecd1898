mod connector;

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    chronicle_config::ChronicleConfig,
    chronicle_platform::{Outbound, RetryPolicy, replay::ReplayClient},
    chronicle_plugins::PluginRegistry,
    chronicle_store::{MessageStore, SqliteStore},
    chronicle_sync::{BackfillSynchronizer, Supervisor, SupervisorOptions},
};

use crate::connector::ReplayConnector;

#[derive(Parser)]
#[command(name = "chronicle", about = "chronicle — mirrors a group chat thread into a durable store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file path (overrides discovery).
    #[arg(long, global = true, env = "CHRONICLE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the monitored thread (default when no subcommand is given).
    Run,
    /// One-shot historical backfill, then exit.
    Backfill,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load the config, validate it, and report problems.
    Validate,
    /// Print the config file path in effect.
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match &cli.config {
        Some(path) => chronicle_config::load_config(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => chronicle_config::discover_and_load(),
    };

    let explicit_config = cli.config.clone();
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Backfill => backfill(config).await,
        Commands::Config { action } => config_command(explicit_config, &config, &action),
    }
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

/// Full pipeline: store, plugins, supervisor, and the configured driver.
async fn run(config: ChronicleConfig) -> anyhow::Result<()> {
    config.validate()?;
    let connector = ReplayConnector::from_config(&config.replay)?;

    let store: Arc<dyn MessageStore> = Arc::new(
        SqliteStore::new(&config.store.database_url)
            .await
            .with_context(|| format!("opening store at {}", config.store.database_url))?,
    );

    let outbound = Arc::new(Outbound::new(
        &config.platform.monitored_thread,
        config.outbound.enabled,
        config.outbound.silent,
    ));
    let plugins = Arc::new(PluginRegistry::build(
        &config.plugins.enabled,
        chronicle_plugins::bundled::catalog(),
        &config.platform.monitored_thread,
        Arc::clone(&outbound),
        Arc::clone(&store),
    ));
    info!(plugins = ?plugins.names(), "plugin registry ready");

    let options = SupervisorOptions {
        watchdog_timeout: std::time::Duration::from_secs(config.watchdog.timeout_secs),
        initial_backoff: std::time::Duration::from_secs(config.reconnect.initial_backoff_secs),
        max_backoff: std::time::Duration::from_secs(config.reconnect.max_backoff_secs),
        page_size: config.platform.page_size,
        retry: RetryPolicy::default(),
    };

    let supervisor = Supervisor::new(
        Box::new(connector),
        store,
        plugins,
        outbound,
        &config.platform.monitored_thread,
        &config.platform.self_user_id,
        options,
    );
    supervisor.run().await?;
    Ok(())
}

/// Standalone history synchronization against the configured archive.
async fn backfill(config: ChronicleConfig) -> anyhow::Result<()> {
    config.validate()?;
    let archive = config
        .replay
        .archive
        .as_deref()
        .context("backfill needs [replay] archive in the config")?;
    let client = Arc::new(ReplayClient::from_archive(archive)?);

    let store: Arc<dyn MessageStore> = Arc::new(
        SqliteStore::new(&config.store.database_url)
            .await
            .with_context(|| format!("opening store at {}", config.store.database_url))?,
    );

    let report = BackfillSynchronizer::new(client, store, &config.platform.monitored_thread)
        .with_page_size(config.platform.page_size)
        .synchronize()
        .await?;
    println!(
        "backfill: {} pages, {} new, {} already known",
        report.pages, report.stored_new, report.already_known
    );
    Ok(())
}

fn config_command(
    explicit_path: Option<PathBuf>,
    config: &ChronicleConfig,
    action: &ConfigAction,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Validate => {
            config.validate()?;
            println!("config ok");
        },
        ConfigAction::Path => {
            match explicit_path.or_else(chronicle_config::loader::find_config_file) {
                Some(path) => println!("{}", path.display()),
                None => println!("(no config file found, defaults in effect)"),
            }
        },
    }
    Ok(())
}
