use crate::utils::error::Result;
use chrono::{Local, NaiveDateTime};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only record of finished cycles.
#[derive(Debug, Clone)]
pub struct StatusLog {
    path: PathBuf,
}

impl StatusLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record_completion(&self) -> Result<()> {
        self.record_completion_at(Local::now().naive_local())
    }

    pub fn record_completion_at(&self, finished_at: NaiveDateTime) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "Cycle finished at {}",
            finished_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_appends_one_line_per_cycle() {
        let dir = TempDir::new().unwrap();
        let log = StatusLog::new(dir.path().join("status.txt"));
        let at = NaiveDate::from_ymd_opt(2025, 7, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        log.record_completion_at(at).unwrap();
        log.record_completion_at(at).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "Cycle finished at 2025-07-15 09:30:00\nCycle finished at 2025-07-15 09:30:00\n"
        );
    }
}
