//! Birthcard Storage Client
//!
//! Talks to the spreadsheet-backed storage script. Every request is a
//! single HTTP call answered with a JSON envelope:
//!
//! ```text
//! POST action=uploadFile  ──► { success, fileUrl | error }
//! POST action=updateCell  ──► { success | error }
//! GET  ?sheet=<name>      ──► { success, data: [[cell, ...], ...] | error }
//! ```
//!
//! Requests are never retried; a failed step is reported to the caller as is.

pub mod reply;

use async_trait::async_trait;

use birthcard_common::config::StorageConfig;
use birthcard_common::error::BirthcardResult;
use birthcard_composition_model::record::{records_from_rows, SourceRecord};
use birthcard_render_engine::export::{CellUpdate, StorageCollaborator, StorageError, UploadFile};

pub use reply::{parse_reply, ScriptReply};

pub const UPLOAD_FAILED_DEFAULT: &str = "Image upload failed";
pub const UPDATE_FAILED_DEFAULT: &str = "Failed to update record";
pub const LOAD_FAILED_DEFAULT: &str = "Failed to load data";

/// HTTP client for the storage script.
#[derive(Debug, Clone)]
pub struct AppsScriptClient {
    http: reqwest::Client,
    config: StorageConfig,
}

impl AppsScriptClient {
    /// Create a client after checking the storage settings are complete.
    pub fn new(config: StorageConfig) -> BirthcardResult<Self> {
        Self::with_http(config, reqwest::Client::new())
    }

    pub fn with_http(config: StorageConfig, http: reqwest::Client) -> BirthcardResult<Self> {
        config.validate()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    async fn post_form(
        &self,
        form: &[(&str, String)],
        default_error: &str,
    ) -> Result<ScriptReply, StorageError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        read_reply(response, default_error).await
    }

    /// Load every record from the configured sheet.
    pub async fn fetch_records(&self) -> Result<Vec<SourceRecord>, StorageError> {
        let sheet = self.config.sheet_name.as_str();
        tracing::debug!(sheet, "Fetching records");

        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[("sheet", sheet)])
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        let reply = read_reply(response, LOAD_FAILED_DEFAULT).await?;

        let rows = reply.data.unwrap_or_default();
        let records = records_from_rows(&rows);
        tracing::info!(sheet, rows = rows.len(), records = records.len(), "Loaded records");
        Ok(records)
    }
}

async fn read_reply(
    response: reqwest::Response,
    default_error: &str,
) -> Result<ScriptReply, StorageError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| StorageError::Transport(e.to_string()))?;

    match parse_reply(&body, default_error) {
        Err(StorageError::Transport(detail)) if !status.is_success() => Err(
            StorageError::Transport(format!("HTTP {status}: {detail}")),
        ),
        other => other,
    }
}

#[async_trait]
impl StorageCollaborator for AppsScriptClient {
    async fn upload_file(&self, file: &UploadFile) -> Result<String, StorageError> {
        tracing::debug!(file = %file.file_name, folder = %file.folder_id, "uploadFile");
        let form = [
            ("action", "uploadFile".to_string()),
            ("base64Data", file.base64_data.clone()),
            ("fileName", file.file_name.clone()),
            ("mimeType", file.mime_type.clone()),
            ("folderId", file.folder_id.clone()),
        ];
        let reply = self.post_form(&form, UPLOAD_FAILED_DEFAULT).await?;
        match reply.file_url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(StorageError::Rejected(
                "upload succeeded but no file URL was returned".to_string(),
            )),
        }
    }

    async fn update_cell(&self, update: &CellUpdate) -> Result<(), StorageError> {
        tracing::debug!(
            sheet = %update.sheet_name,
            row = update.row_index,
            column = update.column_index,
            "updateCell"
        );
        let form = [
            ("action", "updateCell".to_string()),
            ("sheetName", update.sheet_name.clone()),
            ("rowIndex", update.row_index.to_string()),
            ("columnIndex", update.column_index.to_string()),
            ("value", update.value.clone()),
        ];
        self.post_form(&form, UPDATE_FAILED_DEFAULT).await?;
        Ok(())
    }
}
