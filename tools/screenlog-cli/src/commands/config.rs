//! Show or initialize the configuration file.

use screenlog_common::config::{config_file_path, AppConfig};

pub fn run(app: &AppConfig, init: bool) -> anyhow::Result<()> {
    let path = config_file_path();

    if init {
        if path.exists() {
            println!("Config already exists: {}", path.display());
        } else {
            AppConfig::default().save()?;
            println!("Wrote default config: {}", path.display());
            return Ok(());
        }
    } else if !path.exists() {
        println!("No config file at {}; using defaults.", path.display());
    } else {
        println!("Config file: {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(app)?);
    Ok(())
}
