use std::path::PathBuf;

use crate::config::Config;

pub fn cmd_init(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(Config::default_config_path);

    if Config::create_default_if_missing(&path)? {
        println!("✓ Config file created at {}", path.display());
        println!("  A random session secret was generated for you.");
    } else {
        println!("Config file already exists at {}", path.display());
    }

    Ok(())
}
