use std::fs::OpenOptions;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricLogError {
    #[error("failed to open metric log at {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to append metric row: {0}")]
    Append(#[from] csv::Error),
}

/// One evaluation result. The log is an audit trail: rows are appended on
/// every training run and never rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLogEntry {
    pub timestamp: DateTime<Utc>,
    pub precision_at_k: f64,
}

impl MetricLogEntry {
    pub fn new(precision_at_k: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            precision_at_k,
        }
    }
}

/// Append one row to the metric log, creating the file with a header first
/// when absent. Single-writer: only the offline training job calls this.
pub fn append_metric<P: AsRef<Path>>(
    path: P,
    entry: &MetricLogEntry,
) -> Result<(), MetricLogError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| MetricLogError::Open {
                path: path.display().to_string(),
                source,
            })?;
        }
    }

    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| MetricLogError::Open {
            path: path.display().to_string(),
            source,
        })?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if is_new {
        writer.write_record(["timestamp", "precision_at_k"])?;
    }
    writer.write_record([
        entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        entry.precision_at_k.to_string(),
    ])?;
    writer.flush().map_err(csv::Error::from)?;

    tracing::info!(
        path = %path.display(),
        precision_at_k = entry.precision_at_k,
        "appended metric log entry"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(precision: f64) -> MetricLogEntry {
        MetricLogEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 8, 8, 12, 0, 0).unwrap(),
            precision_at_k: precision,
        }
    }

    #[test]
    fn creates_log_with_header_then_appends_without() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("precision_log.csv");

        append_metric(&path, &entry(0.75)).expect("first append");
        append_metric(&path, &entry(0.8)).expect("second append");

        let contents = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,precision_at_k");
        assert_eq!(lines[1], "2026-08-08 12:00:00,0.75");
        assert_eq!(lines[2], "2026-08-08 12:00:00,0.8");
    }

    #[test]
    fn earlier_rows_are_never_rewritten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("precision_log.csv");

        append_metric(&path, &entry(0.25)).expect("append");
        let before = std::fs::read_to_string(&path).expect("read");
        append_metric(&path, &entry(1.0)).expect("append");
        let after = std::fs::read_to_string(&path).expect("read");

        assert!(after.starts_with(&before));
    }

    #[test]
    fn zero_precision_is_still_logged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("precision_log.csv");

        append_metric(&path, &entry(0.0)).expect("append");

        let contents = std::fs::read_to_string(&path).expect("read");
        assert!(contents.contains(",0"));
    }
}
