//! Flattening of nested climb records into fixed-order scalar export rows.
//!
//! This is the heart of the exporter: a pure per-row projection. Each input
//! climb yields exactly one output row (or none, when a predicate is set and
//! the row does not match); columns are derived independently of one another
//! and missing nested fields propagate as nulls. The only hard failure is a
//! variant field holding a JSON array or object, which aborts the run and
//! names the offending climb.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::climb_model::{Climb, ScalarValue};
use crate::row_filter::RowPredicate;

/// Export column names in their fixed output order. `description` is always
/// last so it can be dropped without disturbing the rest of the layout.
pub const EXPORT_COLUMNS: [&str; 22] = [
    "climb_id",
    "climb_name",
    "grade_yds",
    "grade_vscale",
    "grade_french",
    "is_sport",
    "is_trad",
    "is_boulder",
    "is_alpine",
    "is_top_rope",
    "country",
    "state_province",
    "region",
    "area",
    "crag",
    "latitude",
    "longitude",
    "length_meters",
    "bolts_count",
    "first_ascent",
    "safety",
    "description",
];

/// Column manifest for a given description setting: all 22 columns, or the
/// leading 21 when descriptions are excluded.
pub fn export_columns(include_description: bool) -> &'static [&'static str] {
    if include_description {
        &EXPORT_COLUMNS
    } else {
        &EXPORT_COLUMNS[..EXPORT_COLUMNS.len() - 1]
    }
}

/// How discipline flags absent from the source surface in the export.
///
/// The upstream data contract does not say whether a missing flag means
/// "false" or "unknown", so the choice is left to the operator. Null is the
/// default: it preserves the distinction for downstream consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsentTypeFlags {
    #[default]
    #[serde(rename = "null_flags", alias = "null")]
    NullFlags,
    #[serde(rename = "false_flags", alias = "false")]
    FalseFlags,
}

/// Operator-facing knobs for one flattening pass.
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Emit the free-text `description` column. Descriptions dominate row
    /// size, so operators can drop them to shrink the output file.
    pub include_description: bool,
    pub absent_type_flags: AbsentTypeFlags,
    /// Rows failing the predicate are skipped before projection.
    pub predicate: Option<RowPredicate>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            include_description: true,
            absent_type_flags: AbsentTypeFlags::NullFlags,
            predicate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlattenError {
    #[error("climb {uuid}: field {field} holds a JSON {kind} where a scalar was expected")]
    MalformedField {
        uuid: String,
        field: &'static str,
        kind: &'static str,
    },
}

/// One flat export row. Field order matches [`EXPORT_COLUMNS`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRow {
    pub climb_id: String,
    pub climb_name: Option<String>,
    pub grade_yds: Option<String>,
    pub grade_vscale: Option<String>,
    pub grade_french: Option<String>,
    pub is_sport: Option<bool>,
    pub is_trad: Option<bool>,
    pub is_boulder: Option<bool>,
    pub is_alpine: Option<bool>,
    pub is_top_rope: Option<bool>,
    pub country: Option<String>,
    pub state_province: Option<String>,
    pub region: Option<String>,
    pub area: Option<String>,
    pub crag: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub length_meters: Option<f64>,
    pub bolts_count: Option<i64>,
    pub first_ascent: Option<String>,
    pub safety: Option<String>,
    pub description: Option<String>,
}

impl ExportRow {
    /// Cell values in column order, nulls as empty strings. Used for the
    /// sample table printed after an export.
    pub fn display_values(&self, include_description: bool) -> Vec<String> {
        fn text(value: &Option<String>) -> String {
            value.clone().unwrap_or_default()
        }
        fn flag(value: Option<bool>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }
        fn float(value: Option<f64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }
        fn int(value: Option<i64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        let mut cells = vec![
            self.climb_id.clone(),
            text(&self.climb_name),
            text(&self.grade_yds),
            text(&self.grade_vscale),
            text(&self.grade_french),
            flag(self.is_sport),
            flag(self.is_trad),
            flag(self.is_boulder),
            flag(self.is_alpine),
            flag(self.is_top_rope),
            text(&self.country),
            text(&self.state_province),
            text(&self.region),
            text(&self.area),
            text(&self.crag),
            float(self.latitude),
            float(self.longitude),
            float(self.length_meters),
            int(self.bolts_count),
            text(&self.first_ascent),
            text(&self.safety),
        ];
        if include_description {
            cells.push(text(&self.description));
        }
        cells
    }
}

/// Flatten every climb, applying the optional predicate first. Either every
/// surviving row is produced or the whole pass fails; there is no partial
/// output.
pub fn flatten_climbs(
    climbs: &[Climb],
    options: &FlattenOptions,
) -> Result<Vec<ExportRow>, FlattenError> {
    let mut rows = Vec::with_capacity(climbs.len());
    for climb in climbs {
        if let Some(predicate) = &options.predicate {
            if !predicate.matches(climb) {
                continue;
            }
        }
        rows.push(flatten_climb(climb, options)?);
    }
    Ok(rows)
}

/// Project one climb into one export row.
pub fn flatten_climb(climb: &Climb, options: &FlattenOptions) -> Result<ExportRow, FlattenError> {
    let grades = climb.grades.as_ref();
    let kind = climb.kind.as_ref();
    let metadata = climb.metadata.as_ref();
    let policy = options.absent_type_flags;

    Ok(ExportRow {
        climb_id: climb.uuid.clone(),
        climb_name: climb.name.clone(),
        grade_yds: scalar_text(climb, grades.and_then(|g| g.yds.as_ref()), "grades.yds")?,
        grade_vscale: scalar_text(climb, grades.and_then(|g| g.vscale.as_ref()), "grades.vscale")?,
        grade_french: scalar_text(climb, grades.and_then(|g| g.french.as_ref()), "grades.french")?,
        is_sport: flag(kind.and_then(|k| k.sport), policy),
        is_trad: flag(kind.and_then(|k| k.trad), policy),
        is_boulder: flag(kind.and_then(|k| k.bouldering), policy),
        is_alpine: flag(kind.and_then(|k| k.alpine), policy),
        is_top_rope: flag(kind.and_then(|k| k.tr), policy),
        country: path_token(&climb.path_tokens, 0),
        state_province: path_token(&climb.path_tokens, 1),
        region: path_token(&climb.path_tokens, 2),
        area: path_token(&climb.path_tokens, 3),
        crag: path_token(&climb.path_tokens, 4),
        latitude: metadata.and_then(|m| m.lat),
        longitude: metadata.and_then(|m| m.lng),
        length_meters: climb.length,
        bolts_count: climb.bolts_count,
        first_ascent: climb.fa.clone(),
        safety: scalar_text(climb, climb.safety.as_ref(), "safety")?,
        description: if options.include_description {
            climb.content.as_ref().and_then(|c| c.description.clone())
        } else {
            None
        },
    })
}

/// Checked hierarchy lookup: positions past the end of the token list are
/// null, never an error.
pub fn path_token(tokens: &[String], position: usize) -> Option<String> {
    tokens.get(position).cloned()
}

fn flag(value: Option<bool>, policy: AbsentTypeFlags) -> Option<bool> {
    match policy {
        AbsentTypeFlags::NullFlags => value,
        AbsentTypeFlags::FalseFlags => Some(value.unwrap_or(false)),
    }
}

fn scalar_text(
    climb: &Climb,
    value: Option<&Value>,
    field: &'static str,
) -> Result<Option<String>, FlattenError> {
    match value {
        None => Ok(None),
        Some(raw) => match ScalarValue::from_json(raw) {
            Ok(scalar) => Ok(scalar.render()),
            Err(err) => Err(FlattenError::MalformedField {
                uuid: climb.uuid.clone(),
                field,
                kind: err.kind,
            }),
        },
    }
}
