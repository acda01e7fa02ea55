//! Pk-based weaponeering and the Hughes salvo model

use serde::{Deserialize, Serialize};

/// Slack for ln ratios that land a hair above an integer
const CEIL_EPSILON: f64 = 1e-9;

fn is_probability(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

/// Rounds needed to reach `pk_desired` with independent shots of
/// `pk_single`: n = ceil(ln(1 - Pk_desired) / ln(1 - Pk_single)).
///
/// None when either probability is outside [0, 1], when `pk_desired` is 1
/// (unreachable), when `pk_single` is 0 or when the count overflows u32.
pub fn rounds_required(pk_single: f64, pk_desired: f64) -> Option<u32> {
    if !is_probability(pk_single) || !is_probability(pk_desired) {
        return None;
    }
    if pk_desired == 0.0 {
        return Some(0);
    }
    if pk_desired >= 1.0 || pk_single == 0.0 {
        return None;
    }
    if pk_single >= 1.0 {
        return Some(1);
    }
    let n = (-pk_desired).ln_1p() / (-pk_single).ln_1p();
    if !n.is_finite() || n > u32::MAX as f64 {
        return None;
    }
    Some((n - CEIL_EPSILON).ceil().max(1.0) as u32)
}

/// Probability at least one of `rounds` shots kills
pub fn cumulative_pk(pk_single: f64, rounds: u32) -> Option<f64> {
    if !is_probability(pk_single) {
        return None;
    }
    Some(1.0 - (1.0 - pk_single).powi(rounds as i32))
}

/// One side of a salvo exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalvoForce {
    /// Ship count (A or B)
    pub ships: f64,
    /// Good shots per ship per salvo (alpha or beta)
    pub offense: f64,
    /// Intercepts per ship per salvo (y or z)
    pub defense: f64,
    /// Hits to mission-kill one ship (a or b)
    pub staying_power: f64,
}

impl SalvoForce {
    pub fn new(ships: f64, offense: f64, defense: f64, staying_power: f64) -> Self {
        Self {
            ships,
            offense,
            defense,
            staying_power,
        }
    }

    fn is_valid(&self) -> bool {
        [self.ships, self.offense, self.defense]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
            && self.staying_power.is_finite()
            && self.staying_power > 0.0
    }
}

/// Ships put out of action on each side by one simultaneous salvo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalvoExchange {
    pub blue_losses: f64,
    pub red_losses: f64,
    pub blue_remaining: f64,
    pub red_remaining: f64,
}

/// dB = max(0, alpha*A - y*B) / b, dA = max(0, beta*B - z*A) / a.
/// Losses are capped at the ships present.
pub fn hughes_exchange(blue: &SalvoForce, red: &SalvoForce) -> Option<SalvoExchange> {
    if !blue.is_valid() || !red.is_valid() {
        return None;
    }
    let red_losses = ((blue.offense * blue.ships - red.defense * red.ships).max(0.0)
        / red.staying_power)
        .min(red.ships);
    let blue_losses = ((red.offense * red.ships - blue.defense * blue.ships).max(0.0)
        / blue.staying_power)
        .min(blue.ships);
    Some(SalvoExchange {
        blue_losses,
        red_losses,
        blue_remaining: blue.ships - blue_losses,
        red_remaining: red.ships - red_losses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_required() {
        // ln(0.1) / ln(0.3) = 1.91 -> 2
        assert_eq!(rounds_required(0.7, 0.9), Some(2));
        // ln(0.25) / ln(0.5) = 2 exactly
        assert_eq!(rounds_required(0.5, 0.75), Some(2));
        assert_eq!(rounds_required(0.3, 0.9), Some(7));
        assert_eq!(rounds_required(1.0, 0.99), Some(1));
        assert_eq!(rounds_required(0.5, 0.0), Some(0));
    }

    #[test]
    fn test_rounds_required_invalid() {
        assert_eq!(rounds_required(0.0, 0.9), None);
        assert_eq!(rounds_required(0.5, 1.0), None);
        assert_eq!(rounds_required(1.2, 0.9), None);
        assert_eq!(rounds_required(f64::NAN, 0.9), None);
    }

    #[test]
    fn test_rounds_required_tiny_single_pk() {
        // ~2.3e17 rounds
        assert_eq!(rounds_required(1e-17, 0.9), None);
        // ~1.4e13 rounds does not fit in u32
        assert_eq!(rounds_required(1e-12, 0.999_999), None);
        // ln(0.1) / ln(1 - 1e-6) = 2_302_583.94
        assert_eq!(rounds_required(1e-6, 0.9), Some(2_302_584));
    }

    #[test]
    fn test_cumulative_pk() {
        let pk = cumulative_pk(0.5, 3).unwrap();
        assert!((pk - 0.875).abs() < 1e-12);
        assert_eq!(cumulative_pk(0.5, 0), Some(0.0));
        assert_eq!(cumulative_pk(-0.1, 2), None);
    }

    #[test]
    fn test_cumulative_meets_required() {
        for (single, desired) in [(0.7, 0.9), (0.3, 0.9), (0.45, 0.99)] {
            let n = rounds_required(single, desired).unwrap();
            assert!(cumulative_pk(single, n).unwrap() >= desired - 1e-9);
            assert!(cumulative_pk(single, n - 1).unwrap() < desired);
        }
    }

    #[test]
    fn test_hughes_exchange() {
        // 4 blue DDGs, 8 shots each; 6 red ships, 3 intercepts each, 2 hits to kill
        let blue = SalvoForce::new(4.0, 8.0, 4.0, 2.0);
        let red = SalvoForce::new(6.0, 4.0, 3.0, 2.0);
        let result = hughes_exchange(&blue, &red).unwrap();
        // (32 - 18) / 2 = 7 -> capped at 6
        assert_eq!(result.red_losses, 6.0);
        assert_eq!(result.red_remaining, 0.0);
        // (24 - 16) / 2 = 4 -> capped at 4
        assert_eq!(result.blue_losses, 4.0);
    }

    #[test]
    fn test_hughes_defense_absorbs_salvo() {
        let blue = SalvoForce::new(2.0, 2.0, 10.0, 1.5);
        let red = SalvoForce::new(3.0, 1.0, 2.0, 1.0);
        let result = hughes_exchange(&blue, &red).unwrap();
        assert_eq!(result.blue_losses, 0.0);
        assert_eq!(result.red_losses, 0.0);
        assert!(hughes_exchange(&blue, &SalvoForce::new(1.0, 1.0, 1.0, 0.0)).is_none());
    }
}
