/// Drive the flatten/write stages from a local JSON dump, the offline path
/// behind `--input-json`.
use std::fs;

use tempfile::tempdir;

use cragflat::config::CompressionKind;
use cragflat::flattener::{flatten_climbs, FlattenOptions};
use cragflat::openbeta_client::errors::ClientError;
use cragflat::openbeta_client::load_climbs_from_file;
use cragflat::parquet_writer::write_parquet;

const DUMP: &str = r#"[
  {
    "uuid": "5f1c1fcd-c21a-5e14-82be-2b8b1f32a4e9",
    "name": "Slabby Gabby",
    "fa": "unknown",
    "length": 18,
    "boltsCount": 6,
    "grades": {"yds": "5.9", "vscale": null, "french": "5c"},
    "type": {"sport": true, "trad": false, "bouldering": false},
    "safety": null,
    "metadata": {"lat": 44.35, "lng": -71.12},
    "content": {"description": "Friction climbing at its finest."},
    "pathTokens": ["USA", "New Hampshire", "Rumney", "Main Cliff"]
  },
  {
    "uuid": "0a2b3c4d-1111-5222-8333-944445555666",
    "name": "Le Surplomb",
    "grades": {"french": "7a"},
    "type": {"bouldering": true},
    "pathTokens": ["France", "Fontainebleau"],
    "metadata": null,
    "content": null
  }
]"#;

#[test]
fn test_load_and_flatten_json_dump() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("climbs.json");
    fs::write(&input, DUMP).expect("write dump");

    let climbs = load_climbs_from_file(&input).expect("dump should load");
    assert_eq!(climbs.len(), 2);
    assert_eq!(climbs[0].name.as_deref(), Some("Slabby Gabby"));
    assert_eq!(climbs[0].bolts_count, Some(6));
    assert_eq!(climbs[1].path_tokens, vec!["France".to_string(), "Fontainebleau".to_string()]);

    let rows = flatten_climbs(&climbs, &FlattenOptions::default()).expect("flatten should succeed");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].grade_yds.as_deref(), Some("5.9"));
    assert_eq!(rows[0].length_meters, Some(18.0));
    assert_eq!(rows[1].grade_french.as_deref(), Some("7a"));
    assert_eq!(rows[1].country.as_deref(), Some("France"));
    assert_eq!(rows[1].crag, None);
}

#[test]
fn test_dump_to_parquet_pipeline() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("climbs.json");
    let output = dir.path().join("climbs.parquet");
    fs::write(&input, DUMP).expect("write dump");

    let climbs = load_climbs_from_file(&input).expect("dump should load");
    let rows = flatten_climbs(&climbs, &FlattenOptions::default()).expect("flatten should succeed");
    write_parquet(&rows, &output, true, CompressionKind::Zstd).expect("write should succeed");

    let written = fs::metadata(&output).expect("output exists");
    assert!(written.len() > 0);
}

#[test]
fn test_malformed_dump_is_a_decode_error() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("broken.json");
    fs::write(&input, "{not json").expect("write dump");

    let err = load_climbs_from_file(&input).expect_err("broken JSON must fail");
    assert!(matches!(err, ClientError::Decode(_)), "got {err:?}");
}

#[test]
fn test_missing_dump_names_the_path() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("nope.json");

    let err = load_climbs_from_file(&input).expect_err("missing file must fail");
    assert!(matches!(err, ClientError::File { .. }), "got {err:?}");
    assert!(err.to_string().contains("nope.json"));
}
