//! The complete parameter set behind one announcement image.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use birthcard_common::clock::Clock;

use crate::datetime::date_time_line;
use crate::gender::Gender;
use crate::layer::Layout;
use crate::record::SourceRecord;

/// Everything that determines a render, apart from the decoded rasters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionState {
    pub gender: Gender,

    /// Name/caption line. Not drawn when empty.
    pub caption: String,

    /// Date picker value, `YYYY-MM-DD`.
    pub raw_date: String,

    /// Time picker value, `HH:MM` (24-hour).
    pub raw_time: String,

    pub layout: Layout,
}

impl CompositionState {
    /// Seed a fresh state when the generator opens.
    ///
    /// With a record: gender is inferred from its baby label, the caption
    /// comes from the baby label or father's name, and the date from its
    /// stored birth date. Anything missing falls back to the current local
    /// date; the time is always the current local time.
    pub fn seed(record: Option<&SourceRecord>, layout: Layout, clock: &dyn Clock) -> Self {
        let now = clock.now_local();
        let today = now.date();

        let gender = record
            .map(|r| Gender::infer_from(&r.baby))
            .unwrap_or_default();
        let caption = record.map(|r| r.caption().to_string()).unwrap_or_default();
        let date = record
            .and_then(|r| {
                let parsed = parse_record_date(&r.raw_dob);
                if parsed.is_none() && !r.raw_dob.trim().is_empty() {
                    tracing::warn!(raw_dob = %r.raw_dob, "Unparseable birth date, using today");
                }
                parsed
            })
            .unwrap_or(today);

        Self {
            gender,
            caption,
            raw_date: date.format("%Y-%m-%d").to_string(),
            raw_time: now.format("%H:%M").to_string(),
            layout,
        }
    }

    /// The date line as drawn, or `None` when neither date nor time is set.
    pub fn date_line(&self) -> Option<String> {
        date_time_line(&self.raw_date, &self.raw_time)
    }

    /// The caption as drawn, or `None` when it is empty.
    pub fn caption_line(&self) -> Option<&str> {
        if self.caption.is_empty() {
            None
        } else {
            Some(&self.caption)
        }
    }
}

/// Interpret a birth date cell from the sheet.
///
/// Accepts RFC 3339 timestamps (converted to the local calendar date, as
/// spreadsheet backends serialize dates at local midnight in UTC), naive
/// `YYYY-MM-DDTHH:MM:SS` timestamps, and plain `YYYY-MM-DD` dates.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local).date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
