//! Static threat profiles: (allegiance, system) -> ring radius and styling

use crate::core::types::Allegiance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatCategory {
    AirDefense,
    AntiShip,
    Rocket,
    Cannon,
    NavalGun,
    Mortar,
    LandAttack,
}

impl ThreatCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AirDefense => "Air Defense",
            Self::AntiShip => "Anti-Ship",
            Self::Rocket => "Rocket Artillery",
            Self::Cannon => "Cannon Artillery",
            Self::NavalGun => "Naval Gun",
            Self::Mortar => "Mortar",
            Self::LandAttack => "Land Attack Missile",
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ThreatProfile {
    pub allegiance: Allegiance,
    pub system: &'static str,
    pub range_km: f64,
    pub category: ThreatCategory,
    pub display_color: &'static str,
}

const fn profile(
    allegiance: Allegiance,
    system: &'static str,
    range_km: f64,
    category: ThreatCategory,
    display_color: &'static str,
) -> ThreatProfile {
    ThreatProfile {
        allegiance,
        system,
        range_km,
        category,
        display_color,
    }
}

use Allegiance::{Blue, Red};
use ThreatCategory::*;

/// Longer names sit before their prefixes (GMLRS-ER before GMLRS) so the
/// substring pass picks the more specific system
pub static THREAT_PROFILES: &[ThreatProfile] = &[
    // Red air defense
    profile(Red, "HQ-9", 200.0, AirDefense, "#dc2626"),
    profile(Red, "HQ-16", 40.0, AirDefense, "#ef4444"),
    profile(Red, "HQ-7", 15.0, AirDefense, "#f87171"),
    // Red anti-ship
    profile(Red, "YJ-18", 540.0, AntiShip, "#b91c1c"),
    profile(Red, "YJ-83", 180.0, AntiShip, "#991b1b"),
    profile(Red, "YJ-12", 400.0, AntiShip, "#7f1d1d"),
    // Red rocket and cannon
    profile(Red, "PHL-16", 300.0, Rocket, "#f97316"),
    profile(Red, "PHL-03", 130.0, Rocket, "#fb923c"),
    profile(Red, "PLZ-05", 50.0, Cannon, "#fdba74"),
    // Blue
    profile(Blue, "GMLRS-ER", 150.0, Rocket, "#1d4ed8"),
    profile(Blue, "GMLRS", 70.0, Rocket, "#2563eb"),
    profile(Blue, "HIMARS", 70.0, Rocket, "#2563eb"),
    profile(Blue, "ATACMS", 300.0, Rocket, "#1e40af"),
    profile(Blue, "PrSM", 400.0, Rocket, "#1e3a8a"),
    profile(Blue, "Excalibur", 40.0, Cannon, "#0ea5e9"),
    profile(Blue, "M777", 24.0, Cannon, "#38bdf8"),
    profile(Blue, "Mk 45", 24.0, NavalGun, "#06b6d4"),
    profile(Blue, "NMESIS", 185.0, AntiShip, "#0891b2"),
    profile(Blue, "Tomahawk", 1667.0, LandAttack, "#312e81"),
    profile(Blue, "81mm", 5.6, Mortar, "#60a5fa"),
];

/// Read-only view over the threat profiles
#[derive(Debug, Clone, Copy)]
pub struct ThreatTable {
    profiles: &'static [ThreatProfile],
}

impl Default for ThreatTable {
    fn default() -> Self {
        Self {
            profiles: THREAT_PROFILES,
        }
    }
}

impl ThreatTable {
    /// Exact (case-insensitive) system name first, then the first profile of
    /// the same side whose name appears inside `system`
    pub fn lookup(&self, allegiance: Allegiance, system: &str) -> Option<&'static ThreatProfile> {
        let system = system.trim();
        let same_side = || self.profiles.iter().filter(move |p| p.allegiance == allegiance);

        if let Some(p) = same_side().find(|p| p.system.eq_ignore_ascii_case(system)) {
            return Some(p);
        }

        let lowered = system.to_lowercase();
        same_side().find(|p| lowered.contains(&p.system.to_lowercase()))
    }

    pub fn profiles(&self) -> &'static [ThreatProfile] {
        self.profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        let table = ThreatTable::default();
        let p = table.lookup(Red, "yj-18").unwrap();
        assert_eq!(p.range_km, 540.0);
        assert_eq!(p.category, AntiShip);
    }

    #[test]
    fn test_substring_prefers_specific_system() {
        let table = ThreatTable::default();
        assert_eq!(table.lookup(Blue, "M30A2 GMLRS-ER pod").unwrap().range_km, 150.0);
        assert_eq!(table.lookup(Blue, "GMLRS unitary").unwrap().range_km, 70.0);
        assert_eq!(table.lookup(Red, "HQ-9B battalion").unwrap().system, "HQ-9");
    }

    #[test]
    fn test_sides_do_not_mix() {
        let table = ThreatTable::default();
        assert!(table.lookup(Blue, "HQ-9").is_none());
        assert!(table.lookup(Red, "HIMARS").is_none());
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(AirDefense.label(), "Air Defense");
        assert_eq!(LandAttack.label(), "Land Attack Missile");
    }
}
