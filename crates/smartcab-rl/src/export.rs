//! Value-table export for offline inspection
//!
//! The agent hands its table to a [`TableSink`] at the start of every trial.
//! Sinks write CSV (one row per state, one column per action) or a JSON
//! snapshot that can be loaded back as a warm start.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use smartcab_core::{Action, Result, SmartcabError};

use crate::table::{TableSnapshot, ValueTable};

/// Destination for value-table dumps
pub trait TableSink: Send {
    /// Write the full table. `trial` is the trial about to start.
    fn export(&mut self, trial: u32, table: &ValueTable) -> Result<()>;
}

/// Discards every export
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TableSink for NullSink {
    fn export(&mut self, _trial: u32, _table: &ValueTable) -> Result<()> {
        Ok(())
    }
}

/// On-disk export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = SmartcabError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(SmartcabError::Config(format!("unknown export format: {other}"))),
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("q_table.csv"),
            format: ExportFormat::Csv,
        }
    }
}

impl ExportConfig {
    pub fn build_sink(&self) -> Box<dyn TableSink> {
        if !self.enabled {
            return Box::new(NullSink);
        }
        match self.format {
            ExportFormat::Csv => Box::new(CsvTableWriter::new(&self.path)),
            ExportFormat::Json => Box::new(JsonTableWriter::new(&self.path)),
        }
    }
}

/// Writes `state,left,right,forward,none` rows sorted by state key
#[derive(Debug, Clone)]
pub struct CsvTableWriter {
    path: PathBuf,
}

impl CsvTableWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn render(table: &ValueTable) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["state"];
        header.extend(Action::ALL.map(Action::as_str));
        writer.write_record(&header).map_err(csv_error)?;

        for (state, row) in table.sorted_rows() {
            let mut record = vec![state.to_string()];
            record.extend(row.iter().map(|(_, value)| value.to_string()));
            writer.write_record(&record).map_err(csv_error)?;
        }

        writer
            .into_inner()
            .map_err(|e| SmartcabError::Export(format!("failed to flush CSV: {e}")))
    }
}

fn csv_error(e: csv::Error) -> SmartcabError {
    SmartcabError::Export(format!("failed to write CSV record: {e}"))
}

impl TableSink for CsvTableWriter {
    fn export(&mut self, _trial: u32, table: &ValueTable) -> Result<()> {
        write_atomically(&self.path, &Self::render(table)?)
    }
}

/// JSON document written by [`JsonTableWriter`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub trial: u32,
    pub exported_at: DateTime<Utc>,
    pub table: TableSnapshot,
}

#[derive(Debug, Clone)]
pub struct JsonTableWriter {
    path: PathBuf,
}

impl JsonTableWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSink for JsonTableWriter {
    fn export(&mut self, trial: u32, table: &ValueTable) -> Result<()> {
        let file = SnapshotFile {
            trial,
            exported_at: Utc::now(),
            table: table.snapshot(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        write_atomically(&self.path, &json)
    }
}

/// Read a JSON snapshot written by [`JsonTableWriter`]
pub fn load_snapshot(path: &Path) -> Result<SnapshotFile> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Write to a sibling temp file then rename, so readers never see a torn dump
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path).map_err(|e| {
        SmartcabError::Export(format!("failed to move dump into {}: {e}", path.display()))
    })
}
