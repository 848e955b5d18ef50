//! Static zone table and coarse zone-to-zone distance estimates.
//!
//! Zones carry relative grid coordinates rather than geographic ones; one grid
//! unit corresponds to roughly 1.2 km of road. Unknown zones never fail, they
//! fall back to a default distance so partially configured data keeps working.

use serde::{Deserialize, Serialize};

/// Sentinel zone for visits outside the service area.
pub const OUTSIDE_ZONE: &str = "Außerhalb";

/// Distance used when either zone is missing or not in the table.
pub const DEFAULT_DISTANCE_KM: f64 = 5.0;

/// Distance assumed for trips inside a single zone.
pub const SAME_ZONE_DISTANCE_KM: f64 = 1.0;

/// Flat distance for trips to or from [`OUTSIDE_ZONE`].
pub const OUTSIDE_DISTANCE_KM: f64 = 8.0;

/// Kilometres per grid unit.
const GRID_SCALE_KM: f64 = 1.2;

/// Average urban speed in km/h.
pub const DEFAULT_SPEED_KMH: f64 = 25.0;

/// No trip is instantaneous.
const MIN_TRAVEL_MINUTES: u32 = 3;

/// Postal codes that map to a zone besides the zone's own code.
const EXTRA_POSTAL_CODES: &[(&str, &str)] = &[("45897", "Buer")];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub name: String,
    /// West to east.
    pub x: f64,
    /// South to north.
    pub y: f64,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl Zone {
    pub fn new(name: impl Into<String>, x: f64, y: f64, postal_code: Option<&str>) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            postal_code: postal_code.map(str::to_string),
        }
    }
}

/// Lookup table of named zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneTable {
    zones: Vec<Zone>,
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::gelsenkirchen()
    }
}

impl ZoneTable {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// City districts of Gelsenkirchen.
    pub fn gelsenkirchen() -> Self {
        Self::new(vec![
            Zone::new("Alt-/Neustadt", 4.0, 3.5, Some("45879")),
            Zone::new("Beckhausen", 3.5, 8.0, Some("45899")),
            Zone::new("Bismarck", 4.0, 5.0, Some("45889")),
            Zone::new("Buer", 5.0, 8.0, Some("45894")),
            Zone::new("Bulmke-Hüllen", 6.0, 4.0, Some("45888")),
            Zone::new("Erle", 6.0, 6.0, Some("45891")),
            Zone::new("Feldmark", 4.0, 4.0, Some("45883")),
            Zone::new("Hassel", 3.0, 8.0, Some("45768")),
            Zone::new("Heßler", 3.0, 3.0, Some("45883")),
            Zone::new("Horst", 2.0, 5.0, Some("45899")),
            Zone::new("Resser Mark", 6.0, 9.0, Some("45892")),
            Zone::new("Resse", 4.0, 9.0, Some("45892")),
            Zone::new("Rotthausen", 7.0, 2.0, Some("45884")),
            Zone::new("Schalke", 5.0, 5.0, Some("45881")),
            Zone::new("Scholven", 2.0, 8.0, Some("45896")),
            Zone::new("Ückendorf", 6.0, 3.0, Some("45886")),
            Zone::new(OUTSIDE_ZONE, 5.0, 5.0, None),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(|zone| zone.name.as_str())
    }

    /// Approximate road distance in km between two zones.
    pub fn distance(&self, from: &str, to: &str) -> f64 {
        if from.is_empty() || to.is_empty() {
            return DEFAULT_DISTANCE_KM;
        }
        if from == to {
            return SAME_ZONE_DISTANCE_KM;
        }
        if from == OUTSIDE_ZONE || to == OUTSIDE_ZONE {
            return OUTSIDE_DISTANCE_KM;
        }

        let (Some(a), Some(b)) = (self.get(from), self.get(to)) else {
            return DEFAULT_DISTANCE_KM;
        };

        let dx = a.x - b.x;
        let dy = a.y - b.y;
        let km = (dx * dx + dy * dy).sqrt() * GRID_SCALE_KM;

        (km * 10.0).round() / 10.0
    }

    /// Travel time in minutes at `speed_kmh`, never below three minutes.
    pub fn travel_time(&self, from: &str, to: &str, speed_kmh: f64) -> u32 {
        let km = self.distance(from, to);
        let minutes = (km / speed_kmh * 60.0).round();
        if minutes.is_finite() && minutes > 0.0 {
            (minutes as u32).max(MIN_TRAVEL_MINUTES)
        } else {
            MIN_TRAVEL_MINUTES
        }
    }

    pub fn travel_time_default(&self, from: &str, to: &str) -> u32 {
        self.travel_time(from, to, DEFAULT_SPEED_KMH)
    }

    /// Resolves a postal code to a zone name.
    pub fn zone_for_postal_code(&self, postal_code: &str) -> Option<&str> {
        let normalized = postal_code.trim();
        if normalized.is_empty() {
            return None;
        }

        if let Some((_, zone)) = EXTRA_POSTAL_CODES.iter().find(|(code, _)| *code == normalized) {
            return self.get(zone).map(|zone| zone.name.as_str());
        }

        self.zones
            .iter()
            .find(|zone| zone.postal_code.as_deref().map(str::trim) == Some(normalized))
            .map(|zone| zone.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_zone_is_one_km() {
        let table = ZoneTable::gelsenkirchen();
        for name in table.names() {
            assert_eq!(table.distance(name, name), 1.0, "zone {}", name);
        }
    }

    #[test]
    fn test_distance_symmetric() {
        let table = ZoneTable::gelsenkirchen();
        let names: Vec<&str> = table.names().collect();
        for a in &names {
            for b in &names {
                assert_eq!(table.distance(a, b), table.distance(b, a), "{} <-> {}", a, b);
            }
        }
    }

    #[test]
    fn test_known_distances() {
        let table = ZoneTable::gelsenkirchen();
        // (4,5) -> (5,5): 1 unit * 1.2
        assert_eq!(table.distance("Bismarck", "Schalke"), 1.2);
        // (7,2) -> (4,9): sqrt(9 + 49) * 1.2 = 9.139 -> 9.1
        assert_eq!(table.distance("Rotthausen", "Resse"), 9.1);
    }

    #[test]
    fn test_outside_and_unknown() {
        let table = ZoneTable::gelsenkirchen();
        assert_eq!(table.distance(OUTSIDE_ZONE, "Buer"), 8.0);
        assert_eq!(table.distance("Buer", OUTSIDE_ZONE), 8.0);
        assert_eq!(table.distance(OUTSIDE_ZONE, OUTSIDE_ZONE), 1.0);
        assert_eq!(table.distance("Atlantis", "Buer"), 5.0);
        assert_eq!(table.distance("", "Buer"), 5.0);
    }

    #[test]
    fn test_travel_time_floor() {
        let table = ZoneTable::gelsenkirchen();
        let names: Vec<&str> = table.names().collect();
        for a in &names {
            for b in &names {
                assert!(table.travel_time_default(a, b) >= 3);
            }
        }
        // 1 km at 25 km/h = 2.4 min -> floored to 3
        assert_eq!(table.travel_time_default("Buer", "Buer"), 3);
        // 9.1 km at 25 km/h = 21.84 -> 22
        assert_eq!(table.travel_time_default("Rotthausen", "Resse"), 22);
    }

    #[test]
    fn test_postal_code_lookup() {
        let table = ZoneTable::gelsenkirchen();
        assert_eq!(table.zone_for_postal_code("45889"), Some("Bismarck"));
        assert_eq!(table.zone_for_postal_code(" 45897 "), Some("Buer"));
        // 45883 is shared by Feldmark and Heßler; first entry wins
        assert_eq!(table.zone_for_postal_code("45883"), Some("Feldmark"));
        assert_eq!(table.zone_for_postal_code("10115"), None);
        assert_eq!(table.zone_for_postal_code(""), None);
    }
}
