//! Write a default config file.

use std::path::PathBuf;

use birthcard_common::config::{config_file_path, AppConfig};

pub fn run(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let config = AppConfig::default();
    config
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;

    println!("Config written: {}", path.display());
    println!("  Boy template: {}", config.templates.boy.display());
    println!("  Girl template: {}", config.templates.girl.display());
    println!("  Export directory: {}", config.export_dir.display());
    println!();
    println!("Set storage.endpoint and storage.folder_id before using `birthcard upload`.");

    Ok(())
}
