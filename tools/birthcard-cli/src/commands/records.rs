//! List records from storage.

use birthcard_common::config::AppConfig;
use birthcard_storage_client::AppsScriptClient;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let client = AppsScriptClient::new(config.storage.clone())?;
    let records = client
        .fetch_records()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load records: {e}"))?;

    if records.is_empty() {
        println!("No records in sheet '{}'", config.storage.sheet_name);
        return Ok(());
    }

    println!(
        "{:>4}  {:<8}  {:<24}  {:<12}  {:<10}  {:>3}  IMAGE",
        "ID", "SERIAL", "FATHER", "BABY", "DOB", "ROW"
    );
    for r in &records {
        println!(
            "{:>4}  {:<8}  {:<24}  {:<12}  {:<10}  {:>3}  {}",
            r.id,
            r.serial_no,
            r.father,
            r.baby,
            r.dob,
            r.storage_row(),
            if r.image.is_empty() { "-" } else { "yes" }
        );
    }
    println!();
    println!("{} record(s)", records.len());

    Ok(())
}
