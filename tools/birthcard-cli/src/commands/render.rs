//! Compose an announcement and save it locally.

use std::path::PathBuf;

use birthcard_common::config::AppConfig;

use super::compose::ComposeArgs;

pub async fn run(
    config: &AppConfig,
    compose: ComposeArgs,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let engine = compose.open_engine(config, None).await?;
    let dir = output.unwrap_or_else(|| config.export_dir.clone());

    let path = engine
        .export_local(&dir)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let (width, height) = engine.template_dimensions();
    println!("Announcement saved: {}", path.display());
    println!("  Template: {} ({width}x{height})", engine.state().gender);
    if let Some(line) = engine.state().date_line() {
        println!("  Date line: {line}");
    }

    Ok(())
}
