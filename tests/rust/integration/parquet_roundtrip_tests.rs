/// Write rows to Parquet and read them back with the Arrow reader, checking
/// schema, row counts, cell values and null slots survive every codec.
use std::fs::File;

use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;
use tempfile::tempdir;
use test_case::test_case;

use cragflat::climb_model::{Climb, ClimbContent, ClimbMetadata, ClimbType, Grades};
use cragflat::config::CompressionKind;
use cragflat::flattener::{export_columns, flatten_climbs, ExportRow, FlattenOptions};
use cragflat::parquet_writer::{write_parquet, ExportStats};
use cragflat::row_filter::RowPredicate;

fn sample_rows() -> Vec<ExportRow> {
    let climbs = vec![
        Climb {
            uuid: "11111111-aaaa-5bbb-8ccc-dddddddddddd".to_string(),
            name: Some("Cat in the Hat".to_string()),
            grades: Some(Grades {
                yds: Some(json!("5.6")),
                vscale: None,
                french: None,
            }),
            kind: Some(ClimbType {
                trad: Some(true),
                sport: Some(false),
                ..ClimbType::default()
            }),
            path_tokens: ["USA", "Nevada", "Southern Nevada", "Red Rock", "Pine Creek"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            metadata: Some(ClimbMetadata {
                lat: Some(36.12),
                lng: Some(-115.42),
            }),
            length: Some(150.0),
            bolts_count: None,
            fa: None,
            safety: None,
            content: Some(ClimbContent {
                description: Some("Classic moderate.".to_string()),
            }),
        },
        Climb {
            uuid: "22222222-aaaa-5bbb-8ccc-dddddddddddd".to_string(),
            name: Some("Unknown Sport Route".to_string()),
            kind: Some(ClimbType {
                sport: Some(true),
                ..ClimbType::default()
            }),
            path_tokens: ["Spain"].iter().map(|s| s.to_string()).collect(),
            bolts_count: Some(8),
            ..Climb::default()
        },
        // A nearly-empty record: everything but the uuid flows through as null.
        Climb {
            uuid: "33333333-aaaa-5bbb-8ccc-dddddddddddd".to_string(),
            ..Climb::default()
        },
    ];
    flatten_climbs(&climbs, &FlattenOptions::default()).expect("flatten should succeed")
}

#[test]
fn test_roundtrip_preserves_schema_and_rows() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("climbs.parquet");
    let rows = sample_rows();

    write_parquet(&rows, &path, true, CompressionKind::Snappy).expect("write should succeed");

    let file = File::open(&path).expect("open parquet file");
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).expect("read parquet metadata");
    let schema = builder.schema().clone();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, export_columns(true));

    let mut reader = builder.build().expect("build reader");
    let batch = reader
        .next()
        .expect("one batch expected")
        .expect("batch should decode");
    assert_eq!(batch.num_rows(), rows.len());
    assert_eq!(batch.num_columns(), 22);
    assert!(reader.next().is_none(), "single batch expected");

    let ids = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("climb_id is utf8");
    assert_eq!(ids.value(0), "11111111-aaaa-5bbb-8ccc-dddddddddddd");
    assert_eq!(ids.value(2), "33333333-aaaa-5bbb-8ccc-dddddddddddd");

    let is_trad = batch
        .column(6)
        .as_any()
        .downcast_ref::<BooleanArray>()
        .expect("is_trad is boolean");
    assert!(is_trad.value(0));
    assert!(is_trad.is_null(1));

    let latitude = batch
        .column(15)
        .as_any()
        .downcast_ref::<Float64Array>()
        .expect("latitude is float64");
    assert!((latitude.value(0) - 36.12).abs() < 1e-9);
    assert!(latitude.is_null(2));

    let bolts = batch
        .column(18)
        .as_any()
        .downcast_ref::<Int64Array>()
        .expect("bolts_count is int64");
    assert!(bolts.is_null(0));
    assert_eq!(bolts.value(1), 8);

    let country = batch
        .column(10)
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("country is utf8");
    assert_eq!(country.value(0), "USA");
    assert_eq!(country.value(1), "Spain");
    assert!(country.is_null(2));
}

#[test]
fn test_roundtrip_without_description_column() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("climbs.parquet");
    let options = FlattenOptions {
        include_description: false,
        ..FlattenOptions::default()
    };
    let climbs = vec![Climb {
        uuid: "u1".to_string(),
        content: Some(ClimbContent {
            description: Some("dropped".to_string()),
        }),
        ..Climb::default()
    }];
    let rows = flatten_climbs(&climbs, &options).expect("flatten should succeed");

    write_parquet(&rows, &path, false, CompressionKind::Snappy).expect("write should succeed");

    let file = File::open(&path).expect("open parquet file");
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).expect("read parquet metadata");
    let names: Vec<&str> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();
    assert_eq!(names.len(), 21);
    assert_eq!(names.last(), Some(&"safety"));
    assert!(!names.contains(&"description"));
}

#[test_case(CompressionKind::Snappy)]
#[test_case(CompressionKind::Zstd)]
#[test_case(CompressionKind::Gzip)]
#[test_case(CompressionKind::Lz4)]
#[test_case(CompressionKind::Uncompressed)]
fn test_every_codec_roundtrips(kind: CompressionKind) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("climbs.parquet");
    let rows = sample_rows();

    write_parquet(&rows, &path, true, kind).expect("write should succeed");

    let file = File::open(&path).expect("open parquet file");
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .expect("read parquet metadata")
        .build()
        .expect("build reader");
    let total: usize = reader.map(|b| b.expect("batch should decode").num_rows()).sum();
    assert_eq!(total, rows.len());
}

#[test]
fn test_stats_file_contents() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("export-stats.json");

    let stats = ExportStats::new(3, 4 * 1024 * 1024, 1024 * 1024);
    stats.write_to(&path).expect("stats write should succeed");

    let body = std::fs::read_to_string(&path).expect("read stats file");
    let value: serde_json::Value = serde_json::from_str(&body).expect("stats should be JSON");
    assert_eq!(value["total_climbs"], 3);
    assert_eq!(value["compression_ratio"], 4.0);
    assert_eq!(value["space_saved_pct"], 75.0);
    assert!(value["generated_at"].is_string());
}

#[test]
fn test_stats_baseline_measures_only_surviving_climbs() {
    // Filter first, then measure: the JSON size the stats compare against
    // covers the climbs that were actually written, not everything fetched.
    let mut climbs = vec![
        Climb {
            uuid: "kept-1".to_string(),
            path_tokens: vec!["USA".to_string(), "Nevada".to_string()],
            content: Some(ClimbContent {
                description: Some("Long pitch after pitch of varnished plates.".to_string()),
            }),
            ..Climb::default()
        },
        Climb {
            uuid: "dropped-1".to_string(),
            path_tokens: vec!["Spain".to_string(), "Siurana".to_string()],
            content: Some(ClimbContent {
                description: Some("Crimps all the way to the anchor chains.".to_string()),
            }),
            ..Climb::default()
        },
    ];
    let unfiltered_bytes = serde_json::to_vec(&climbs).expect("encode climbs").len() as u64;

    let predicate = RowPredicate {
        countries: Some(vec!["USA".to_string()]),
        required_types: Vec::new(),
    };
    let removed = predicate.apply(&mut climbs);
    assert_eq!(removed, 1);

    let surviving_bytes = serde_json::to_vec(&climbs).expect("encode climbs").len() as u64;
    assert!(surviving_bytes < unfiltered_bytes);

    let rows = flatten_climbs(&climbs, &FlattenOptions::default()).expect("flatten should succeed");
    let stats = ExportStats::new(rows.len(), surviving_bytes, surviving_bytes / 2);
    assert_eq!(stats.total_climbs, 1);
}
