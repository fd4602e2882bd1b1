use anyhow::Context;
use clap::Parser;
use spare_parts_draft::{cli, commands, config};
use cli::Cli;
use config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load().context("設定ファイルの読み込みに失敗しました")?;
    if let Some(origin) = cli.origin {
        config.set_origin(origin)?;
    }

    commands::run(cli.command, &mut config).await?;

    Ok(())
}
