//! Platform basic loads for `PLATFORM:`/`UNIT:` loadout directives
//!
//! A count of platforms (or firing units) expands into one loadout-set per
//! ammunition type: `max = per_platform * count`.

/// Basic load carried by a single platform or unit
#[derive(Debug, PartialEq, Eq)]
pub struct PlatformLoad {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub basic_load: &'static [(&'static str, u32)],
}

/// Table order is lookup priority for substring matches
pub static PLATFORMS: &[PlatformLoad] = &[
    PlatformLoad {
        name: "HIMARS Battery",
        aliases: &["himars battery", "himars btry", "rocket battery"],
        basic_load: &[("GMLRS", 108), ("ATACMS", 12), ("PrSM", 24)],
    },
    PlatformLoad {
        name: "Artillery Battery",
        aliases: &["artillery battery", "m777 battery", "cannon battery"],
        basic_load: &[("155mm_HE", 600), ("Excalibur", 36)],
    },
    PlatformLoad {
        name: "Mortar Platoon",
        aliases: &["mortar platoon", "mortar plt"],
        basic_load: &[("Mortar_HE", 200), ("Mortar_Illum", 48), ("Mortar_Smoke", 24)],
    },
    PlatformLoad {
        name: "HIMARS",
        aliases: &["himars", "m142", "launcher"],
        basic_load: &[("GMLRS", 18), ("ATACMS", 2), ("PrSM", 4)],
    },
    PlatformLoad {
        name: "M777",
        aliases: &["m777", "m777a2", "howitzer"],
        basic_load: &[("155mm_HE", 100), ("Excalibur", 6)],
    },
    PlatformLoad {
        name: "DDG",
        aliases: &["ddg", "destroyer", "arleigh burke"],
        basic_load: &[("5in_Naval", 600), ("VLS_Cells", 96), ("Harpoon_LRASM", 8)],
    },
    PlatformLoad {
        name: "81mm Mortar",
        aliases: &["81mm mortar", "mortar tube", "mortar", "m252"],
        basic_load: &[("Mortar_HE", 50), ("Mortar_Illum", 12), ("Mortar_Smoke", 6)],
    },
];

#[derive(Debug, Clone, Copy)]
pub struct PlatformTable {
    entries: &'static [PlatformLoad],
}

impl Default for PlatformTable {
    fn default() -> Self {
        Self { entries: PLATFORMS }
    }
}

impl PlatformTable {
    /// Exact (case-insensitive) name or alias first, then substring either
    /// way in table order
    pub fn resolve(&self, text: &str) -> Option<&'static PlatformLoad> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }

        let exact = self.entries.iter().find(|p| {
            p.name.eq_ignore_ascii_case(&lowered) || p.aliases.iter().any(|a| *a == lowered)
        });
        if exact.is_some() {
            return exact;
        }

        self.entries.iter().find(|p| {
            p.aliases
                .iter()
                .any(|a| lowered.contains(a) || a.contains(lowered.as_str()))
        })
    }
}
