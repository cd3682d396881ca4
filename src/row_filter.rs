//! Optional row predicate applied before flattening.
//!
//! The predicate is a conjunction of two test kinds: membership of the
//! country-level path token in a configured set, and discipline flags that
//! must be true. A test over a field the row does not carry excludes the row;
//! it never raises.

use serde::{Deserialize, Serialize};

use crate::climb_model::{Climb, ClimbType};
use crate::config::FilterConfig;

/// Discipline flags a filter can require. Serialized names follow the
/// OpenBeta field names (`bouldering`, `tr`), with the common spellings
/// accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFlag {
    Sport,
    Trad,
    #[serde(alias = "boulder")]
    Bouldering,
    Alpine,
    #[serde(alias = "top_rope")]
    Tr,
}

impl TypeFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeFlag::Sport => "sport",
            TypeFlag::Trad => "trad",
            TypeFlag::Bouldering => "bouldering",
            TypeFlag::Alpine => "alpine",
            TypeFlag::Tr => "tr",
        }
    }

    fn value(self, kind: &ClimbType) -> Option<bool> {
        match self {
            TypeFlag::Sport => kind.sport,
            TypeFlag::Trad => kind.trad,
            TypeFlag::Bouldering => kind.bouldering,
            TypeFlag::Alpine => kind.alpine,
            TypeFlag::Tr => kind.tr,
        }
    }
}

/// Conjunctive predicate over source climb fields. An empty predicate
/// matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPredicate {
    /// Restrict to climbs whose first path token is one of these countries.
    pub countries: Option<Vec<String>>,
    /// Flags that must all be true on the climb.
    pub required_types: Vec<TypeFlag>,
}

impl RowPredicate {
    /// Build from the config section. An explicitly empty list means no
    /// restriction, the same as leaving the key out.
    pub fn from_config(filter: &FilterConfig) -> Self {
        RowPredicate {
            countries: filter.countries.clone().filter(|c| !c.is_empty()),
            required_types: filter.climb_types.clone().unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_none() && self.required_types.is_empty()
    }

    /// Drop non-matching climbs in place, returning how many were removed.
    pub fn apply(&self, climbs: &mut Vec<Climb>) -> usize {
        let before = climbs.len();
        climbs.retain(|climb| self.matches(climb));
        before - climbs.len()
    }

    /// Evaluate against one climb. Rows missing a tested field do not match.
    pub fn matches(&self, climb: &Climb) -> bool {
        if let Some(countries) = &self.countries {
            match climb.path_tokens.first() {
                Some(country) => {
                    if !countries.iter().any(|c| c == country) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        for flag in &self.required_types {
            let value = climb.kind.as_ref().and_then(|kind| flag.value(kind));
            if value != Some(true) {
                return false;
            }
        }

        true
    }
}
