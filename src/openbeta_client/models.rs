//! Wire-shape models for OpenBeta GraphQL responses.

use serde::Deserialize;

use crate::climb_model::{null_to_default, Climb, ClimbMetadata};

/// Standard GraphQL response envelope. A 200 response can still carry
/// `errors` instead of (or alongside) `data`.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlErrorMessage {
    pub message: String,
}

/// Payload of the countries query.
#[derive(Debug, Deserialize)]
pub struct CountriesData {
    #[serde(default)]
    pub countries: Vec<CountryRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryRef {
    #[serde(rename = "areaName")]
    pub area_name: String,
    pub uuid: String,
}

/// Payload of the children-by-uuid query. `area` is null when the UUID does
/// not resolve.
#[derive(Debug, Deserialize)]
pub struct UuidChildrenData {
    pub area: Option<AreaChildren>,
}

#[derive(Debug, Deserialize)]
pub struct AreaChildren {
    #[serde(default)]
    pub children: Vec<ChildRef>,
}

/// Payload of the children-by-path query.
#[derive(Debug, Deserialize)]
pub struct PathChildrenData {
    #[serde(default)]
    pub areas: Vec<PathAreaNode>,
}

#[derive(Debug, Deserialize)]
pub struct PathAreaNode {
    pub uuid: String,
    #[serde(default)]
    pub children: Vec<ChildRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChildRef {
    #[serde(rename = "areaName")]
    pub area_name: String,
}

/// Payload of the paginated areas query.
#[derive(Debug, Deserialize)]
pub struct AreasData {
    #[serde(default)]
    pub areas: Vec<Area>,
}

/// A leaf area with its climbs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Area {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub area_name: Option<String>,
    #[serde(default, rename = "pathTokens", deserialize_with = "null_to_default")]
    pub path_tokens: Vec<String>,
    #[serde(default)]
    pub metadata: Option<ClimbMetadata>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub climbs: Vec<Climb>,
}

impl Area {
    /// Climbs sometimes come back without their own path tokens or
    /// coordinates; in that case they inherit the enclosing area's.
    pub fn adopt_context(&self, climb: &mut Climb) {
        if climb.path_tokens.is_empty() {
            climb.path_tokens = self.path_tokens.clone();
        }

        let has_own_coordinates = climb.metadata.as_ref().and_then(|m| m.lat).is_some();
        if !has_own_coordinates {
            if let Some(area_meta) = &self.metadata {
                if area_meta.lat.is_some() {
                    let meta = climb.metadata.get_or_insert_with(ClimbMetadata::default);
                    meta.lat = area_meta.lat;
                    meta.lng = area_meta.lng;
                }
            }
        }
    }
}
