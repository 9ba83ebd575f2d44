use crate::utils::error::Result;
use std::collections::{BTreeSet, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File-backed LinkSet: one profile URL per line, only ever appended to.
#[derive(Debug, Clone)]
pub struct LinkStore {
    path: PathBuf,
}

impl LinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load(&self) -> Result<HashSet<String>> {
        Ok(parse_links(&self.read_raw()?))
    }

    /// Append the candidates not yet stored, sorted. Returns how many were added.
    pub fn merge<I>(&self, candidates: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let raw = self.read_raw()?;
        let existing = parse_links(&raw);

        let to_add: BTreeSet<String> = candidates
            .into_iter()
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty() && !existing.contains(link))
            .collect();

        if to_add.is_empty() {
            tracing::warn!("No new links to add to {}", self.path.display());
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut buffer = String::new();
        // Keep the previous last line intact when the file lacks a trailing newline.
        if !raw.is_empty() && !raw.ends_with('\n') {
            buffer.push('\n');
        }
        for link in &to_add {
            buffer.push_str(link);
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buffer.as_bytes())?;

        tracing::info!(
            "🔗 Added {} new links. Total: {}",
            to_add.len(),
            existing.len() + to_add.len()
        );
        Ok(to_add.len())
    }
}

pub fn parse_links(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
