//! Map overlay - plotted units and threat rings
//!
//! Units are keyed by name plus position rounded to [`UNIT_KEY_PRECISION`]
//! decimal degrees: re-plotting the same unit at the same place overwrites
//! it, moving it creates a second entry under the same name.

pub mod coord;
pub mod geodesy;
pub mod threat;

pub use coord::{parse_coordinates, GridConverter, GridReference};
pub use geodesy::UtmGridConverter;
pub use threat::{ThreatProfile, ThreatTable};

use geo::HaversineDistance;
use geo_types::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::Allegiance;

/// Decimal places of latitude/longitude that participate in unit identity
pub const UNIT_KEY_PRECISION: i32 = 4;

/// Derived identity of a plotted unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitKey(pub String);

impl UnitKey {
    pub fn derive(name: &str, latitude: f64, longitude: f64) -> Self {
        Self(format!(
            "{}@{:.prec$},{:.prec$}",
            name,
            round_coord(latitude),
            round_coord(longitude),
            prec = UNIT_KEY_PRECISION as usize
        ))
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn round_coord(value: f64) -> f64 {
    let scale = 10f64.powi(UNIT_KEY_PRECISION);
    // + 0.0 folds -0.0 into 0.0 so both render the same key
    (value * scale).round() / scale + 0.0
}

/// A unit plotted on the overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapUnit {
    pub id: UnitKey,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub allegiance: Allegiance,
    pub system_type: String,
}

impl MapUnit {
    pub fn new(
        name: &str,
        latitude: f64,
        longitude: f64,
        allegiance: Allegiance,
        system_type: &str,
    ) -> Self {
        Self {
            id: UnitKey::derive(name, latitude, longitude),
            name: name.to_string(),
            latitude,
            longitude,
            allegiance,
            system_type: system_type.to_string(),
        }
    }

    /// Position as a geo point (x = longitude, y = latitude)
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Plotted units in insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapModel {
    units: Vec<MapUnit>,
    #[serde(skip)]
    threats: ThreatTable,
}

impl MapModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite by derived key. Returns true if an entry was replaced.
    pub fn add(&mut self, unit: MapUnit) -> bool {
        if let Some(existing) = self.units.iter_mut().find(|u| u.id == unit.id) {
            *existing = unit;
            return true;
        }
        self.units.push(unit);
        false
    }

    /// Remove every unit whose name equals `name`; returns how many went
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.units.len();
        self.units.retain(|u| u.name != name);
        before - self.units.len()
    }

    /// Remove by derived key (manual UI action)
    pub fn remove_key(&mut self, key: &UnitKey) -> bool {
        let before = self.units.len();
        self.units.retain(|u| &u.id != key);
        before != self.units.len()
    }

    /// Clear one side, or everything when `allegiance` is None
    pub fn clear(&mut self, allegiance: Option<Allegiance>) -> usize {
        let before = self.units.len();
        match allegiance {
            Some(side) => self.units.retain(|u| u.allegiance != side),
            None => self.units.clear(),
        }
        before - self.units.len()
    }

    pub fn units(&self) -> &[MapUnit] {
        &self.units
    }

    pub fn units_of(&self, allegiance: Allegiance) -> impl Iterator<Item = &MapUnit> {
        self.units.iter().filter(move |u| u.allegiance == allegiance)
    }

    pub fn get(&self, key: &UnitKey) -> Option<&MapUnit> {
        self.units.iter().find(|u| &u.id == key)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Threat-ring radius in kilometers for a system, if it is in the table
    pub fn threat_radius(&self, allegiance: Allegiance, system: &str) -> Option<f64> {
        self.threats.lookup(allegiance, system).map(|p| p.range_km)
    }

    pub fn threat_profile(&self, unit: &MapUnit) -> Option<&'static ThreatProfile> {
        self.threats.lookup(unit.allegiance, &unit.system_type)
    }

    /// Units whose threat ring contains the given point
    pub fn threats_covering(&self, latitude: f64, longitude: f64) -> Vec<&MapUnit> {
        let target = Point::new(longitude, latitude);
        self.units
            .iter()
            .filter(|u| {
                self.threat_radius(u.allegiance, &u.system_type)
                    .map(|km| u.point().haversine_distance(&target) <= km * 1000.0)
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sam(name: &str, lat: f64, lon: f64) -> MapUnit {
        MapUnit::new(name, lat, lon, Allegiance::Red, "HQ-9")
    }

    #[test]
    fn test_key_rounds_position() {
        let a = UnitKey::derive("SAM", 15.50001, 120.3);
        let b = UnitKey::derive("SAM", 15.5, 120.30004);
        assert_eq!(a, b);
        assert_eq!(a.0, "SAM@15.5000,120.3000");
        assert_ne!(a, UnitKey::derive("SAM", 15.5002, 120.3));
        assert_eq!(
            UnitKey::derive("X", -0.00001, 0.0),
            UnitKey::derive("X", 0.0, 0.0)
        );
    }

    #[test]
    fn test_readd_same_position_overwrites() {
        let mut map = MapModel::new();
        assert!(!map.add(sam("SAM 1", 15.5, 120.3)));
        let mut moved_system = sam("SAM 1", 15.50001, 120.3);
        moved_system.system_type = "HQ-16".into();
        assert!(map.add(moved_system));
        assert_eq!(map.len(), 1);
        assert_eq!(map.units()[0].system_type, "HQ-16");
    }

    #[test]
    fn test_remove_is_one_to_many() {
        let mut map = MapModel::new();
        map.add(sam("SAM 1", 15.5, 120.3));
        map.add(sam("SAM 1", 15.7, 120.3));
        map.add(sam("SAM 2", 15.9, 120.3));
        assert_eq!(map.remove("SAM 1"), 2);
        assert_eq!(map.remove("SAM 1"), 0);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_clear_by_allegiance() {
        let mut map = MapModel::new();
        map.add(sam("SAM 1", 15.5, 120.3));
        map.add(MapUnit::new("Btry A", 14.0, 120.0, Allegiance::Blue, "HIMARS"));
        assert_eq!(map.clear(Some(Allegiance::Red)), 1);
        assert_eq!(map.units_of(Allegiance::Blue).count(), 1);
        assert_eq!(map.clear(None), 1);
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_key() {
        let mut map = MapModel::new();
        let unit = sam("SAM 1", 15.5, 120.3);
        let key = unit.id.clone();
        map.add(unit);
        assert!(map.get(&key).is_some());
        assert!(map.remove_key(&key));
        assert!(!map.remove_key(&key));
    }

    #[test]
    fn test_threat_radius_lookup() {
        let map = MapModel::new();
        assert_eq!(map.threat_radius(Allegiance::Red, "HQ-9"), Some(200.0));
        assert_eq!(map.threat_radius(Allegiance::Red, "hq-16"), Some(40.0));
        assert_eq!(map.threat_radius(Allegiance::Blue, "HQ-9"), None);
        assert_eq!(map.threat_radius(Allegiance::Red, "Unknown Radar"), None);
    }

    #[test]
    fn test_threats_covering_point() {
        let mut map = MapModel::new();
        map.add(MapUnit::new("Short SAM", 15.0, 120.0, Allegiance::Red, "HQ-7"));
        map.add(MapUnit::new("Long SAM", 15.0, 120.0, Allegiance::Red, "HQ-9"));
        // ~0.5 degrees of latitude is ~55 km: inside HQ-9, outside HQ-7
        let covering = map.threats_covering(15.5, 120.0);
        assert_eq!(covering.len(), 1);
        assert_eq!(covering[0].name, "Long SAM");
    }
}
