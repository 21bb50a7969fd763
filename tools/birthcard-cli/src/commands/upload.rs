//! Compose an announcement for a record, upload it, and attach it.

use std::io::Write;
use std::path::PathBuf;

use birthcard_common::config::AppConfig;
use birthcard_render_engine::export::{ExportStage, UploadTarget};
use birthcard_storage_client::AppsScriptClient;

use super::compose::ComposeArgs;

pub async fn run(
    config: &AppConfig,
    record_id: usize,
    compose: ComposeArgs,
    save_local: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = AppsScriptClient::new(config.storage.clone())?;

    let records = client
        .fetch_records()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load records: {e}"))?;
    let record = records
        .into_iter()
        .find(|r| r.id == record_id)
        .ok_or_else(|| anyhow::anyhow!("No record with id {record_id}"))?;

    println!(
        "Record {}: {} / {} (row {})",
        record.id,
        record.father,
        record.baby,
        record.storage_row()
    );

    let mut engine = compose.open_engine(config, Some(record)).await?;

    if let Some(dir) = save_local {
        let path = engine
            .export_local(&dir)
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        println!("  Local copy: {}", path.display());
    }

    let on_stage = |stage: ExportStage| {
        let label = match stage {
            ExportStage::Encoding => "encoding",
            ExportStage::Uploading => "uploading",
            ExportStage::UpdatingRecord => "updating record",
            ExportStage::Complete => "done",
            ExportStage::Failed => "failed",
        };
        print!("\r  Upload: {label:<16}");
        let _ = std::io::stdout().flush();
    };

    let target = UploadTarget::from_config(&config.storage);
    match engine.export_remote(&client, &target, Some(&on_stage)).await {
        Ok(uploaded) => {
            println!();
            println!("Announcement uploaded and record updated:");
            println!("  File: {}", uploaded.file_name);
            println!("  URL: {}", uploaded.file_url);
            println!("  Row: {}", uploaded.row_index);
            Ok(())
        }
        Err(e) => {
            println!();
            Err(anyhow::anyhow!(e.user_message()))
        }
    }
}
