//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side classification of a map unit or weapon system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Allegiance {
    Blue,
    Red,
}

impl Allegiance {
    /// Resolve free text from a directive or UI field.
    ///
    /// Returns None for anything outside the accepted vocabulary.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "blue" | "friendly" | "blufor" => Some(Self::Blue),
            "red" | "enemy" | "hostile" | "opfor" => Some(Self::Red),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Blue => "BLUE",
            Self::Red => "RED",
        }
    }
}

impl fmt::Display for Allegiance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Supply status tier derived from a current/max percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusTier {
    Green,
    Amber,
    Red,
}

impl StatusTier {
    /// `>50` is GREEN, `>25` is AMBER, everything else (25 itself included) is RED
    pub fn from_percentage(pct: f64) -> Self {
        if pct > 50.0 {
            Self::Green
        } else if pct > 25.0 {
            Self::Amber
        } else {
            Self::Red
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Amber => "AMBER",
            Self::Red => "RED",
        }
    }

    /// Display color used by the status readout
    pub fn color(&self) -> &'static str {
        match self {
            Self::Green => "#22c55e",
            Self::Amber => "#f59e0b",
            Self::Red => "#ef4444",
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
