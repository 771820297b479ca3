use std::path::PathBuf;

use agms_client::utils::logging;
use agms_client::{App, Command, Config};
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let command = Command::parse(std::env::args().skip(1))?;

    // optional TOML file, env vars on top
    let config_path = std::env::var("AGMS_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    logging::init(config.verbose_logging);

    App::initialize(config).await?.run(command).await
}
