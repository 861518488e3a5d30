use anyhow::Result;
use std::path::PathBuf;
use taskboard::{config::GlobalConfig, logging, tui};

const USAGE: &str = "\
Usage: taskboard [STORE_PATH]

  STORE_PATH  SQLite file holding the board (default: platform data dir)

Config:  ~/.config/taskboard/config.toml
Logging: set TASKBOARD_LOG (e.g. debug) to override log_level";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let store_override = match args.get(1).map(|s| s.as_str()) {
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            return Ok(());
        }
        Some("-V") | Some("--version") => {
            println!("taskboard {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(path) => Some(PathBuf::from(path)),
        None => None,
    };

    // First run: write the defaults so there is a file to edit
    let config_path = GlobalConfig::config_path()?;
    let config = if config_path.exists() {
        GlobalConfig::load()?
    } else {
        let config = GlobalConfig::default();
        config.save()?;
        config
    };

    let _log_guard = logging::init(&GlobalConfig::log_dir()?, &config.log_level)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting taskboard");

    // Initialize and run the app
    let mut app = tui::App::new(config, store_override.as_deref())?;
    app.run().await?;

    Ok(())
}
