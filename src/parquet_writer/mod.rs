//! Arrow-backed Parquet output.
//!
//! Rows are projected into one in-memory [`RecordBatch`] whose schema mirrors
//! the export column order, then written in a single pass with the configured
//! compression codec. Exports are small enough (a few hundred thousand rows)
//! that batching is not worth the bookkeeping.

pub mod stats;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use thiserror::Error;

use crate::config::CompressionKind;
use crate::flattener::ExportRow;

pub use stats::ExportStats;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("failed to create {}: {}", .path.display(), .source)]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to assemble record batch: {0}")]
    Batch(#[from] ArrowError),
    #[error("parquet write failed: {0}")]
    Parquet(#[from] ParquetError),
    #[error("failed to write stats to {}: {}", .path.display(), .source)]
    Stats {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode stats: {0}")]
    StatsEncode(#[from] serde_json::Error),
}

/// Arrow schema for the export table. `climb_id` is the only non-nullable
/// column; everything else may be missing in the source records.
pub fn export_schema(include_description: bool) -> SchemaRef {
    let mut fields = vec![
        Field::new("climb_id", DataType::Utf8, false),
        Field::new("climb_name", DataType::Utf8, true),
        Field::new("grade_yds", DataType::Utf8, true),
        Field::new("grade_vscale", DataType::Utf8, true),
        Field::new("grade_french", DataType::Utf8, true),
        Field::new("is_sport", DataType::Boolean, true),
        Field::new("is_trad", DataType::Boolean, true),
        Field::new("is_boulder", DataType::Boolean, true),
        Field::new("is_alpine", DataType::Boolean, true),
        Field::new("is_top_rope", DataType::Boolean, true),
        Field::new("country", DataType::Utf8, true),
        Field::new("state_province", DataType::Utf8, true),
        Field::new("region", DataType::Utf8, true),
        Field::new("area", DataType::Utf8, true),
        Field::new("crag", DataType::Utf8, true),
        Field::new("latitude", DataType::Float64, true),
        Field::new("longitude", DataType::Float64, true),
        Field::new("length_meters", DataType::Float64, true),
        Field::new("bolts_count", DataType::Int64, true),
        Field::new("first_ascent", DataType::Utf8, true),
        Field::new("safety", DataType::Utf8, true),
    ];
    if include_description {
        fields.push(Field::new("description", DataType::Utf8, true));
    }
    Arc::new(Schema::new(fields))
}

/// Assemble all rows into a single record batch in export column order.
pub fn build_record_batch(
    rows: &[ExportRow],
    include_description: bool,
) -> Result<RecordBatch, WriterError> {
    let schema = export_schema(include_description);
    let mut columns: Vec<ArrayRef> = vec![
        string_array(rows, |r| Some(r.climb_id.as_str())),
        string_array(rows, |r| r.climb_name.as_deref()),
        string_array(rows, |r| r.grade_yds.as_deref()),
        string_array(rows, |r| r.grade_vscale.as_deref()),
        string_array(rows, |r| r.grade_french.as_deref()),
        bool_array(rows, |r| r.is_sport),
        bool_array(rows, |r| r.is_trad),
        bool_array(rows, |r| r.is_boulder),
        bool_array(rows, |r| r.is_alpine),
        bool_array(rows, |r| r.is_top_rope),
        string_array(rows, |r| r.country.as_deref()),
        string_array(rows, |r| r.state_province.as_deref()),
        string_array(rows, |r| r.region.as_deref()),
        string_array(rows, |r| r.area.as_deref()),
        string_array(rows, |r| r.crag.as_deref()),
        float_array(rows, |r| r.latitude),
        float_array(rows, |r| r.longitude),
        float_array(rows, |r| r.length_meters),
        int_array(rows, |r| r.bolts_count),
        string_array(rows, |r| r.first_ascent.as_deref()),
        string_array(rows, |r| r.safety.as_deref()),
    ];
    if include_description {
        columns.push(string_array(rows, |r| r.description.as_deref()));
    }
    RecordBatch::try_new(schema, columns).map_err(WriterError::Batch)
}

/// Write all rows to a Parquet file at `path`.
pub fn write_parquet(
    rows: &[ExportRow],
    path: &Path,
    include_description: bool,
    compression: CompressionKind,
) -> Result<(), WriterError> {
    let batch = build_record_batch(rows, include_description)?;
    let file = File::create(path).map_err(|source| WriterError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let props = WriterProperties::builder()
        .set_compression(parquet_compression(compression))
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn parquet_compression(kind: CompressionKind) -> Compression {
    match kind {
        CompressionKind::Snappy => Compression::SNAPPY,
        CompressionKind::Zstd => Compression::ZSTD(ZstdLevel::default()),
        CompressionKind::Gzip => Compression::GZIP(GzipLevel::default()),
        CompressionKind::Lz4 => Compression::LZ4_RAW,
        CompressionKind::Uncompressed => Compression::UNCOMPRESSED,
    }
}

fn string_array(rows: &[ExportRow], get: impl Fn(&ExportRow) -> Option<&str>) -> ArrayRef {
    let mut builder = StringBuilder::with_capacity(rows.len(), rows.len() * 16);
    for row in rows {
        builder.append_option(get(row));
    }
    Arc::new(builder.finish())
}

fn bool_array(rows: &[ExportRow], get: impl Fn(&ExportRow) -> Option<bool>) -> ArrayRef {
    let mut builder = BooleanBuilder::with_capacity(rows.len());
    for row in rows {
        builder.append_option(get(row));
    }
    Arc::new(builder.finish())
}

fn float_array(rows: &[ExportRow], get: impl Fn(&ExportRow) -> Option<f64>) -> ArrayRef {
    let mut builder = Float64Builder::with_capacity(rows.len());
    for row in rows {
        builder.append_option(get(row));
    }
    Arc::new(builder.finish())
}

fn int_array(rows: &[ExportRow], get: impl Fn(&ExportRow) -> Option<i64>) -> ArrayRef {
    let mut builder = Int64Builder::with_capacity(rows.len());
    for row in rows {
        builder.append_option(get(row));
    }
    Arc::new(builder.finish())
}
