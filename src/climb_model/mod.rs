//! Nested climb records as the OpenBeta GraphQL API returns them.
//!
//! Every field except `uuid` is optional: the upstream dataset is
//! crowd-sourced and sparse, and a missing sub-field must flow through the
//! export as null rather than fail the run. Variant-typed fields (`grades.*`,
//! `safety`) stay as raw [`serde_json::Value`]s here and are only coerced to
//! strings during flattening, where a malformed value can be reported against
//! the climb's uuid.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod scalar;

pub use scalar::{NonScalarValue, ScalarValue};

/// One climbing route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Climb {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub grades: Option<Grades>,
    /// Discipline flags. `type` is a keyword, hence the rename.
    #[serde(default, rename = "type")]
    pub kind: Option<ClimbType>,
    /// Location hierarchy, broadest to narrowest: country, state/province,
    /// region, area, crag. May be shorter than five entries or empty.
    #[serde(
        default,
        rename = "pathTokens",
        deserialize_with = "null_to_default"
    )]
    pub path_tokens: Vec<String>,
    #[serde(default)]
    pub metadata: Option<ClimbMetadata>,
    /// Route length in meters.
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default, rename = "boltsCount")]
    pub bolts_count: Option<i64>,
    /// First-ascent attribution, free text.
    #[serde(default)]
    pub fa: Option<String>,
    /// Safety rating. Variant-typed upstream, coerced at flatten time.
    #[serde(default)]
    pub safety: Option<Value>,
    #[serde(default)]
    pub content: Option<ClimbContent>,
}

/// Grade labels per grading system. Variant-typed upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grades {
    #[serde(default)]
    pub yds: Option<Value>,
    #[serde(default)]
    pub vscale: Option<Value>,
    #[serde(default)]
    pub french: Option<Value>,
}

/// Discipline flags. Absent flags are kept as `None`; whether they surface as
/// null or false in the export is a flattening policy decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimbType {
    #[serde(default)]
    pub sport: Option<bool>,
    #[serde(default)]
    pub trad: Option<bool>,
    #[serde(default)]
    pub bouldering: Option<bool>,
    #[serde(default)]
    pub alpine: Option<bool>,
    #[serde(default)]
    pub tr: Option<bool>,
}

/// Geographic coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimbMetadata {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimbContent {
    #[serde(default)]
    pub description: Option<String>,
}

/// The API serializes empty collections as JSON null now and then; treat null
/// and missing the same way.
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
