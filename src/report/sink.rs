//! Report sink: serialize a report tree to YAML or JSON

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::ReportNode;

/// Output encoding for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Yaml,
    Json,
}

impl ReportFormat {
    /// Guess the format from a file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ReportFormat::Json,
            _ => ReportFormat::Yaml,
        }
    }
}

/// Errors raised while writing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a report to any writer
pub fn write_report<W: Write>(
    mut writer: W,
    report: &ReportNode,
    format: ReportFormat,
) -> Result<(), ReportError> {
    match format {
        ReportFormat::Yaml => serde_yaml::to_writer(&mut writer, report)?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write a report to a file, creating parent directories as needed
pub fn write_report_file(
    path: &Path,
    report: &ReportNode,
    format: ReportFormat,
) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    write_report(BufWriter::new(file), report, format)?;
    tracing::info!("Wrote report to {}", path.display());
    Ok(())
}
