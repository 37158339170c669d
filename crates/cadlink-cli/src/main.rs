//! cadlink command line entry point

use std::path::Path;

use anyhow::Context;
use cadlink_cli::{ActionContext, Cli, dispatch_action};
use cadlink_core::{CONFIG_FILE_NAME, CadlinkConfig};
use cadlink_host::OfflineApplication;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadlink_cli=info,cadlink_core=info,cadlink_host=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CadlinkConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None if Path::new(CONFIG_FILE_NAME).is_file() => CadlinkConfig::load(CONFIG_FILE_NAME)
            .with_context(|| format!("failed to load config {CONFIG_FILE_NAME}"))?,
        None => CadlinkConfig::default(),
    };

    let application = OfflineApplication::new();
    let ctx = ActionContext::new(&application, &config);
    dispatch_action(cli.command, &ctx)
}
