use clap::Parser;
use tracing::debug;

use onceholder::cli::{Cli, run_cli};
use onceholder::config::{get_config, init_config, init_config_from};
use onceholder::system::init_logging;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match &cli.config {
        Some(path) => init_config_from(path)?,
        None => init_config(),
    }
    let config = get_config();

    // guard 必须在退出前释放，否则非阻塞日志不会被刷新
    let guard = init_logging(&config.logging)?;
    debug!("Configuration: {:?}", config);

    let result = run_cli(cli.command);
    drop(guard);

    if let Err(e) = result {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }

    Ok(())
}
