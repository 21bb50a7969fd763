//! Export of rendered rasters: local PNG files and remote upload.
//!
//! Remote export is two strictly sequential steps. The encoded PNG is first
//! uploaded to storage; only once that succeeds is the returned URL written
//! into the record's image column. Either step failing ends the export
//! with a step-specific error and nothing is retried.

use std::path::{Path, PathBuf};

use serde::Serialize;

use birthcard_common::clock::Clock;
use birthcard_common::config::StorageConfig;
use birthcard_common::error::{BirthcardError, BirthcardResult};
use birthcard_composition_model::gender::Gender;
use birthcard_composition_model::record::SourceRecord;

use crate::raster::{Raster, PNG_MIME};

/// File name for a locally downloaded announcement.
pub fn local_file_name(gender: Gender, unix_millis: i64) -> String {
    format!("birth-announcement-{}-{}.png", gender.as_str(), unix_millis)
}

/// Write the raster as a PNG into `dir`, returning the file path.
pub fn export_local(
    raster: &Raster,
    gender: Gender,
    dir: &Path,
    clock: &dyn Clock,
) -> BirthcardResult<PathBuf> {
    let path = dir.join(local_file_name(gender, clock.now_millis()));
    raster.save_png(&path)?;
    tracing::info!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        "Exported announcement locally"
    );
    Ok(path)
}

/// Failure reported by the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The backend answered but refused the request.
    #[error("{0}")]
    Rejected(String),

    /// The request never got a usable answer.
    #[error("network error: {0}")]
    Transport(String),
}

/// Payload of the `uploadFile` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// PNG bytes as a `data:` URL.
    pub base64_data: String,
    pub file_name: String,
    pub mime_type: String,
    pub folder_id: String,
}

/// Payload of the `updateCell` operation. Row and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub sheet_name: String,
    pub row_index: usize,
    pub column_index: u32,
    pub value: String,
}

/// The remote storage backend, as seen by the export adapter.
#[async_trait::async_trait]
pub trait StorageCollaborator: Send + Sync {
    /// Store a file and return its URL.
    async fn upload_file(&self, file: &UploadFile) -> Result<String, StorageError>;

    /// Write a value into one cell of the record sheet.
    async fn update_cell(&self, update: &CellUpdate) -> Result<(), StorageError>;
}

/// Where an uploaded image goes and which cell records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub folder_id: String,
    pub sheet_name: String,
    pub image_column: u32,
}

impl UploadTarget {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            folder_id: config.folder_id.clone(),
            sheet_name: config.sheet_name.clone(),
            image_column: config.image_column,
        }
    }
}

/// A successfully uploaded and recorded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedRef {
    pub file_url: String,
    pub file_name: String,
    pub row_index: usize,
}

/// Stages of a remote export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Encoding,
    Uploading,
    UpdatingRecord,
    Complete,
    Failed,
}

/// Stage callback for remote exports.
pub type StageCallback<'a> = &'a (dyn Fn(ExportStage) + Send + Sync);

/// Upload the raster and attach its URL to the record's row.
pub async fn export_remote(
    raster: &Raster,
    record: &SourceRecord,
    storage: &dyn StorageCollaborator,
    target: &UploadTarget,
    clock: &dyn Clock,
    on_stage: Option<StageCallback<'_>>,
) -> BirthcardResult<UploadedRef> {
    let report = |stage: ExportStage| {
        if let Some(cb) = on_stage {
            cb(stage);
        }
    };

    report(ExportStage::Encoding);
    let base64_data = match raster.to_data_url() {
        Ok(data) => data,
        Err(e) => {
            report(ExportStage::Failed);
            return Err(e);
        }
    };
    let file_name = record.upload_file_name(clock.now_millis());

    tracing::info!(
        file = %file_name,
        record = record.id,
        bytes = base64_data.len(),
        "Uploading announcement"
    );

    report(ExportStage::Uploading);
    let upload = UploadFile {
        base64_data,
        file_name: file_name.clone(),
        mime_type: PNG_MIME.to_string(),
        folder_id: target.folder_id.clone(),
    };
    let file_url = match storage.upload_file(&upload).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(file = %file_name, error = %e, "Upload failed");
            report(ExportStage::Failed);
            return Err(BirthcardError::upload(e.to_string()));
        }
    };

    report(ExportStage::UpdatingRecord);
    let update = CellUpdate {
        sheet_name: target.sheet_name.clone(),
        row_index: record.storage_row(),
        column_index: target.image_column,
        value: file_url.clone(),
    };
    if let Err(e) = storage.update_cell(&update).await {
        tracing::warn!(
            url = %file_url,
            row = update.row_index,
            error = %e,
            "Uploaded image but record update failed"
        );
        report(ExportStage::Failed);
        return Err(BirthcardError::record_update(e.to_string()));
    }

    tracing::info!(url = %file_url, row = update.row_index, "Announcement attached to record");
    report(ExportStage::Complete);

    Ok(UploadedRef {
        file_url,
        file_name,
        row_index: update.row_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use birthcard_common::clock::FixedClock;
    use chrono::NaiveDate;
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStorage {
        upload_reply: Option<Result<String, StorageError>>,
        update_reply: Option<Result<(), StorageError>>,
        uploads: Mutex<Vec<UploadFile>>,
        updates: Mutex<Vec<CellUpdate>>,
    }

    #[async_trait::async_trait]
    impl StorageCollaborator for FakeStorage {
        async fn upload_file(&self, file: &UploadFile) -> Result<String, StorageError> {
            self.uploads.lock().unwrap().push(file.clone());
            self.upload_reply
                .clone()
                .unwrap_or_else(|| Ok("https://files.example/abc".to_string()))
        }

        async fn update_cell(&self, update: &CellUpdate) -> Result<(), StorageError> {
            self.updates.lock().unwrap().push(update.clone());
            self.update_reply.clone().unwrap_or(Ok(()))
        }
    }

    fn clock() -> FixedClock {
        FixedClock::new(
            1_709_649_000_000,
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        )
    }

    fn raster() -> Raster {
        Raster::new(RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255])))
    }

    fn record() -> SourceRecord {
        SourceRecord {
            id: 4,
            father: "Ravi".into(),
            ..SourceRecord::default()
        }
    }

    fn target() -> UploadTarget {
        UploadTarget {
            folder_id: "folder-1".into(),
            sheet_name: "Data".into(),
            image_column: 8,
        }
    }

    #[test]
    fn test_local_file_name() {
        assert_eq!(
            local_file_name(Gender::Girl, 1_709_649_000_000),
            "birth-announcement-girl-1709649000000.png"
        );
    }

    #[test]
    fn test_export_local_writes_png() {
        let dir = std::env::temp_dir().join("birthcard_test_export_local");
        let _ = std::fs::remove_dir_all(&dir);

        let path = export_local(&raster(), Gender::Boy, &dir, &clock()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "birth-announcement-boy-1709649000000.png"
        );
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 8));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_export_remote_success_writes_row() {
        let storage = FakeStorage::default();
        let stages = Mutex::new(Vec::new());
        let on_stage = |stage: ExportStage| stages.lock().unwrap().push(stage);

        let uploaded = export_remote(
            &raster(),
            &record(),
            &storage,
            &target(),
            &clock(),
            Some(&on_stage),
        )
        .await
        .unwrap();

        assert_eq!(uploaded.file_url, "https://files.example/abc");
        assert_eq!(uploaded.file_name, "creative_Ravi_1709649000000.png");
        assert_eq!(uploaded.row_index, 6);

        let uploads = storage.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].base64_data.starts_with("data:image/png;base64,"));
        assert_eq!(uploads[0].mime_type, "image/png");
        assert_eq!(uploads[0].folder_id, "folder-1");

        let updates = storage.updates.lock().unwrap();
        assert_eq!(
            updates.as_slice(),
            &[CellUpdate {
                sheet_name: "Data".into(),
                row_index: 6,
                column_index: 8,
                value: "https://files.example/abc".into(),
            }]
        );

        assert_eq!(
            stages.lock().unwrap().as_slice(),
            &[
                ExportStage::Encoding,
                ExportStage::Uploading,
                ExportStage::UpdatingRecord,
                ExportStage::Complete
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_upload_skips_record_update() {
        let storage = FakeStorage {
            upload_reply: Some(Err(StorageError::Rejected("quota exceeded".into()))),
            ..FakeStorage::default()
        };

        let err = export_remote(&raster(), &record(), &storage, &target(), &clock(), None)
            .await
            .unwrap_err();

        match err {
            BirthcardError::UploadFailed { message } => assert_eq!(message, "quota exceeded"),
            other => panic!("expected UploadFailed, got {other:?}"),
        }
        assert!(storage.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_upload_failure() {
        let storage = FakeStorage {
            upload_reply: Some(Err(StorageError::Transport("connection reset".into()))),
            ..FakeStorage::default()
        };

        let err = export_remote(&raster(), &record(), &storage, &target(), &clock(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BirthcardError::UploadFailed { .. }));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_update_failure_is_distinct() {
        let storage = FakeStorage {
            update_reply: Some(Err(StorageError::Rejected("sheet locked".into()))),
            ..FakeStorage::default()
        };

        let err = export_remote(&raster(), &record(), &storage, &target(), &clock(), None)
            .await
            .unwrap_err();
        match err {
            BirthcardError::RecordUpdateFailed { message } => assert_eq!(message, "sheet locked"),
            other => panic!("expected RecordUpdateFailed, got {other:?}"),
        }
        assert_eq!(storage.uploads.lock().unwrap().len(), 1);
    }
}
