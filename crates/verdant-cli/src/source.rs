//! File-backed reading source.
//!
//! Reads a JSON array of `{"timestamp": "<RFC 3339>", "value": <number>}`
//! objects and serves it as if it were a backend: the window is applied and
//! only the most recent `sample_cap` readings are returned.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::debug;

use verdant_core::{Error, QueryWindow, Reading, ReadingSource, Result};

/// Reading source backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Create a source for `path`. The file is read on every fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReadingSource for FileSource {
    async fn fetch_readings(
        &self,
        sensor_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
        sample_cap: u32,
    ) -> Result<Vec<Reading>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let all: Vec<Reading> = serde_json::from_str(&content).map_err(|e| {
            Error::InvalidData(format!("{}: {}", self.path.display(), e))
        })?;

        let window = QueryWindow {
            start,
            end,
            sample_cap,
        };
        let total = all.len();
        let readings = window.clip(all);
        debug!(
            sensor_id,
            path = %self.path.display(),
            total,
            returned = readings.len(),
            "Loaded readings from file"
        );
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use time::Duration;

    fn now() -> OffsetDateTime {
        // 2025-06-15 15:06:40 UTC
        OffsetDateTime::from_unix_timestamp(1_750_000_000).unwrap()
    }

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_window() {
        let file = write_file(
            r#"[
                {"timestamp": "2025-06-15T14:00:00Z", "value": 21.5},
                {"timestamp": "2025-06-10T14:00:00Z", "value": 18.0},
                {"timestamp": "2025-06-15T12:00:00+02:00", "value": 20.0}
            ]"#,
        );
        let source = FileSource::new(file.path());

        let day = source
            .fetch_readings("bed-3", now() - Duration::days(1), now(), 96)
            .await
            .unwrap();
        let values: Vec<f64> = day.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![20.0, 21.5]);

        let week = source
            .fetch_readings("bed-3", now() - Duration::days(7), now(), 168)
            .await
            .unwrap();
        assert_eq!(week.len(), 3);
    }

    #[tokio::test]
    async fn test_applies_cap() {
        let readings: Vec<String> = (0..10)
            .map(|h| format!(r#"{{"timestamp": "2025-06-15T{:02}:00:00Z", "value": {}}}"#, h, h))
            .collect();
        let file = write_file(&format!("[{}]", readings.join(",")));

        let result = FileSource::new(file.path())
            .fetch_readings("bed-3", now() - Duration::days(1), now(), 4)
            .await
            .unwrap();
        let values: Vec<f64> = result.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![6.0, 7.0, 8.0, 9.0]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("missing.json"));
        let err = source
            .fetch_readings("bed-3", now() - Duration::days(1), now(), 96)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_malformed_file_is_invalid_data() {
        let file = write_file(r#"[{"timestamp": "yesterday", "value": 1.0}]"#);
        let err = FileSource::new(file.path())
            .fetch_readings("bed-3", now() - Duration::days(1), now(), 96)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
