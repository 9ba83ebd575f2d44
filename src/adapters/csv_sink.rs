use crate::domain::model::{AppendOutcome, ProfileRecord, PROFILE_HEADERS};
use crate::domain::ports::ProfileSink;
use crate::utils::error::Result;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const PHONE_COLUMN: usize = 1;

/// Tabular sink stored as CSV. Rows are appended; the phone column is the dedup key.
#[derive(Debug, Clone)]
pub struct CsvProfileSink {
    path: PathBuf,
}

impl CsvProfileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn has_content(&self) -> bool {
        fs::metadata(&self.path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false)
    }

    fn rows(&self) -> Result<Vec<StringRecord>> {
        if !self.has_content() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

impl ProfileSink for CsvProfileSink {
    fn contains_phone(&self, phone: &str) -> Result<bool> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Ok(false);
        }
        Ok(self
            .rows()?
            .iter()
            .any(|row| row.get(PHONE_COLUMN).map(str::trim) == Some(phone)))
    }

    fn append(&mut self, record: &ProfileRecord) -> Result<AppendOutcome> {
        if record.has_phone() && self.contains_phone(&record.phone)? {
            tracing::warn!("⚠️ Record with phone {} already exists", record.phone);
            return Ok(AppendOutcome::DuplicatePhone);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let write_header = !self.has_content();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if write_header {
            writer.write_record(PROFILE_HEADERS)?;
        }
        writer.serialize(record)?;
        writer.flush()?;

        tracing::info!("✅ Saved profile '{}' to {}", record.name, self.path.display());
        Ok(AppendOutcome::Appended)
    }

    fn row_count(&self) -> Result<usize> {
        Ok(self.rows()?.len())
    }
}
