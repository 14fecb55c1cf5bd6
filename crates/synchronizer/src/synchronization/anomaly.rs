use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;

/// Append-only log of rejected bestlist rows, one JSON object per line.
///
/// The file is only created once the first anomaly is written.
#[derive(Debug, Clone)]
pub struct AnomalySink {
    path: PathBuf,
}

impl AnomalySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{data_dir}/anomalies/{discipline}_{millis}_errors.json`
    pub fn for_discipline(data_dir: &Path, discipline_name: &str) -> Self {
        let stripped: String = discipline_name.split_whitespace().collect();
        let millis = chrono::Utc::now().timestamp_millis();
        Self::new(
            data_dir
                .join("anomalies")
                .join(format!("{stripped}_{millis}_errors.json")),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entries: &[String]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for entry in entries {
            writeln!(file, "{entry}")?;
        }
        Ok(())
    }
}

/// Anomalies that were already triaged and should not be reported again.
#[derive(Debug, Clone, Default)]
pub struct IgnoredEntries {
    entries: HashSet<String>,
}

impl IgnoredEntries {
    /// Reads the line-delimited ignore file, creating it empty if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "")?;
        }

        let ignored = Self::parse(&fs::read_to_string(path)?);
        info!("Total ignored entries: {}", ignored.len());
        Ok(ignored)
    }

    pub fn parse(content: &str) -> Self {
        let mut entries = HashSet::new();
        for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if !entries.insert(line.to_string()) {
                warn!("Duplicate ignored entry '{}'", line);
            }
        }
        Self { entries }
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
