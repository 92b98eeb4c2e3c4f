mod config_commands;
mod token_commands;

use {
    clap::{Parser, Subcommand},
    servicegenius_config::ServiceGeniusConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "servicegenius",
    about = "ServiceGenius: Salesforce dashboard and agent-builder gateway"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Custom config directory (overrides default ~/.config/servicegenius/).
    #[arg(long, global = true, env = "SERVICEGENIUS_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
    /// Print a signed session token.
    Token(token_commands::TokenArgs),
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load config with directory and CLI overrides applied.
fn load_config(cli: &Cli) -> ServiceGeniusConfig {
    if let Some(ref dir) = cli.config_dir {
        servicegenius_config::set_config_dir(dir.clone());
    }
    let mut config = servicegenius_config::discover_and_load();
    if let Some(ref bind) = cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "servicegenius starting");

    let config = load_config(&cli);
    match cli.command {
        None | Some(Commands::Gateway) => servicegenius_gateway::start_gateway(&config).await,
        Some(Commands::Config { action }) => config_commands::handle_config(action, &config),
        Some(Commands::Token(args)) => token_commands::handle_token(args, &config),
    }
}
