//! Patient records as produced by the record list.

use serde::{Deserialize, Serialize};

/// Number of header rows above the first record in the sheet.
pub const HEADER_ROWS: usize = 1;

/// One row of the patient sheet.
///
/// `id` is the record's zero-based position in the sheet body; it is what
/// ties an uploaded image back to the row it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    pub id: usize,
    #[serde(default)]
    pub serial_no: String,
    #[serde(default)]
    pub father: String,
    #[serde(default)]
    pub mother: String,
    /// Display form of the birth date.
    #[serde(default)]
    pub dob: String,
    /// Birth date exactly as stored in the sheet.
    #[serde(default)]
    pub raw_dob: String,
    /// Free-form baby description, e.g. "Baby Girl".
    #[serde(default)]
    pub baby: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub image: String,
}

impl SourceRecord {
    /// 1-based sheet row: one header row, then the zero-based body index.
    pub fn storage_row(&self) -> usize {
        storage_row_for(self.id)
    }

    /// Default caption: the baby label, or the father's name when it is blank.
    pub fn caption(&self) -> &str {
        if self.baby.trim().is_empty() {
            &self.father
        } else {
            &self.baby
        }
    }

    /// File name under which a creative for this record is uploaded.
    pub fn upload_file_name(&self, unix_millis: i64) -> String {
        format!("creative_{}_{}.png", self.father, unix_millis)
    }
}

/// Map a zero-based record index to its 1-based sheet row.
pub fn storage_row_for(index: usize) -> usize {
    index + HEADER_ROWS + 1
}

fn cell_text(row: &[serde_json::Value], column: usize) -> String {
    match row.get(column) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Convert raw sheet rows (header included) into records.
///
/// Ids are assigned by position before rows without a father's name are
/// dropped, so an id always points at the same sheet row.
pub fn records_from_rows(rows: &[Vec<serde_json::Value>]) -> Vec<SourceRecord> {
    rows.iter()
        .skip(HEADER_ROWS)
        .enumerate()
        .map(|(id, row)| {
            let raw_dob = cell_text(row, 4);
            SourceRecord {
                id,
                serial_no: cell_text(row, 1),
                father: cell_text(row, 2),
                mother: cell_text(row, 3),
                dob: display_dob(&raw_dob),
                raw_dob,
                baby: cell_text(row, 5),
                mobile: cell_text(row, 6),
                image: cell_text(row, 7),
            }
        })
        .filter(|record| !record.father.trim().is_empty())
        .collect()
}

fn display_dob(raw: &str) -> String {
    match crate::state::parse_record_date(raw) {
        Some(date) => date.format("%-d/%-m/%Y").to_string(),
        None => "N/A".to_string(),
    }
}
