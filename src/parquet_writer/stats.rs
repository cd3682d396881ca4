//! Export run statistics, written alongside the Parquet file so CI jobs can
//! surface them without opening the output.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::WriterError;

#[derive(Debug, Clone, Serialize)]
pub struct ExportStats {
    pub total_climbs: usize,
    pub json_size_mb: f64,
    pub parquet_size_mb: f64,
    /// JSON size over Parquet size, 0 when the Parquet file is empty.
    pub compression_ratio: f64,
    pub space_saved_pct: f64,
    pub generated_at: DateTime<Utc>,
}

impl ExportStats {
    pub fn new(total_climbs: usize, json_bytes: u64, parquet_bytes: u64) -> Self {
        const MB: f64 = 1024.0 * 1024.0;
        let json_size_mb = json_bytes as f64 / MB;
        let parquet_size_mb = parquet_bytes as f64 / MB;
        let compression_ratio = if parquet_size_mb > 0.0 {
            json_size_mb / parquet_size_mb
        } else {
            0.0
        };
        let space_saved_pct = if json_size_mb > 0.0 {
            (1.0 - parquet_size_mb / json_size_mb) * 100.0
        } else {
            0.0
        };

        ExportStats {
            total_climbs,
            json_size_mb: round2(json_size_mb),
            parquet_size_mb: round2(parquet_size_mb),
            compression_ratio: round1(compression_ratio),
            space_saved_pct: round1(space_saved_pct),
            generated_at: Utc::now(),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<(), WriterError> {
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body).map_err(|source| WriterError::Stats {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
