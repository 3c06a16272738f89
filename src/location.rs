// src/location.rs
//! Location resolver: free-form "District, State" text into ordered geographic levels.
//!
//! No geocoding happens here. The parts are taken at face value and handed to the
//! dataset as filters; the cascade decides what to do when a level has no data.

use serde::{Deserialize, Serialize};

/// Default location used by the dashboard before a profile is filled in.
pub const NATIONAL_SENTINEL: &str = "India";

/// One filter combination for the structured dataset. `None` means unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationFilter {
    pub commodity: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub market: Option<String>,
}

impl LocationFilter {
    pub fn with_commodity(mut self, commodity: &str) -> Self {
        self.commodity = non_empty(commodity);
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.commodity.is_none()
            && self.state.is_none()
            && self.district.is_none()
            && self.market.is_none()
    }
}

/// Which level of the cascade produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedScope {
    District,
    State,
    National,
    #[serde(rename = "none")]
    Unresolved,
}

impl ResolvedScope {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolvedScope::District => "district",
            ResolvedScope::State => "state",
            ResolvedScope::National => "national",
            ResolvedScope::Unresolved => "none",
        }
    }
}

/// A geographic level derived from the location text, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoLevel {
    District { district: String },
    State { state: String },
    National,
}

impl GeoLevel {
    pub fn scope(&self) -> ResolvedScope {
        match self {
            GeoLevel::District { .. } => ResolvedScope::District,
            GeoLevel::State { .. } => ResolvedScope::State,
            GeoLevel::National => ResolvedScope::National,
        }
    }

    /// Geographic part of the filter; commodity is layered on by the cascade.
    pub fn to_filter(&self) -> LocationFilter {
        match self {
            GeoLevel::District { district } => LocationFilter {
                district: Some(district.clone()),
                ..LocationFilter::default()
            },
            GeoLevel::State { state } => LocationFilter {
                state: Some(state.clone()),
                ..LocationFilter::default()
            },
            GeoLevel::National => LocationFilter::default(),
        }
    }
}

/// Split on commas: two or more parts give `[district, state, national]`,
/// one part gives `[state, national]`, nothing gives `[national]`.
/// Parts beyond the second are ignored.
pub fn resolve_levels(location: &str) -> Vec<GeoLevel> {
    let parts: Vec<&str> = location
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut levels = Vec::with_capacity(3);
    match parts.as_slice() {
        [] => {}
        [only] if only.eq_ignore_ascii_case(NATIONAL_SENTINEL) => {}
        [state] => levels.push(GeoLevel::State {
            state: state.to_string(),
        }),
        [district, state, ..] => {
            levels.push(GeoLevel::District {
                district: district.to_string(),
            });
            levels.push(GeoLevel::State {
                state: state.to_string(),
            });
        }
    }
    levels.push(GeoLevel::National);
    levels
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn district_and_state_from_two_parts() {
        let levels = resolve_levels("Nashik, Maharashtra");
        assert_eq!(
            levels,
            vec![
                GeoLevel::District {
                    district: "Nashik".into()
                },
                GeoLevel::State {
                    state: "Maharashtra".into()
                },
                GeoLevel::National,
            ]
        );
    }

    #[test]
    fn single_part_is_state_only() {
        let levels = resolve_levels("  Punjab ");
        assert_eq!(
            levels,
            vec![
                GeoLevel::State {
                    state: "Punjab".into()
                },
                GeoLevel::National
            ]
        );
        assert!(levels
            .iter()
            .all(|l| !matches!(l, GeoLevel::District { .. })));
    }

    #[test]
    fn blank_and_sentinel_are_national_only() {
        assert_eq!(resolve_levels(""), vec![GeoLevel::National]);
        assert_eq!(resolve_levels("   "), vec![GeoLevel::National]);
        assert_eq!(resolve_levels("india"), vec![GeoLevel::National]);
        assert_eq!(resolve_levels(" , "), vec![GeoLevel::National]);
    }

    #[test]
    fn extra_parts_are_ignored() {
        let levels = resolve_levels("Lasalgaon, Nashik, Maharashtra");
        assert_eq!(levels[0].scope(), ResolvedScope::District);
        assert_eq!(
            levels[1],
            GeoLevel::State {
                state: "Nashik".into()
            }
        );
        assert_eq!(levels.len(), 3);
    }

    #[test]
    fn district_filter_is_district_only() {
        let levels = resolve_levels("Nashik, Maharastra");
        let f = levels[0].to_filter().with_commodity("Tomato");
        assert_eq!(f.district.as_deref(), Some("Nashik"));
        assert_eq!(f.commodity.as_deref(), Some("Tomato"));
        assert!(f.state.is_none());
    }

    #[test]
    fn filter_with_commodity_drops_blank() {
        let f = GeoLevel::National.to_filter().with_commodity("  ");
        assert!(f.is_unfiltered());
        let f = GeoLevel::State {
            state: "Punjab".into(),
        }
        .to_filter()
        .with_commodity("Wheat");
        assert_eq!(f.commodity.as_deref(), Some("Wheat"));
        assert_eq!(f.state.as_deref(), Some("Punjab"));
        assert!(f.district.is_none());
    }

    #[test]
    fn scope_serializes_as_lowercase_names() {
        let s = serde_json::to_string(&ResolvedScope::Unresolved).unwrap();
        assert_eq!(s, "\"none\"");
        let s = serde_json::to_string(&ResolvedScope::District).unwrap();
        assert_eq!(s, "\"district\"");
    }
}
