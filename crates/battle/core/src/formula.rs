//! Damage and cost formulas.
//!
//! Pure functions with no state. Everything an action computes before it
//! touches a combatant goes through here.

use crate::element::Element;
use crate::stats::round_amount;

/// Calculate damage from an attack stat against a defense stat.
///
/// # Formula
///
/// ```text
/// damage = max(1, round(attack * k / (k + defense)))
/// ```
///
/// The bigger the damage constant `k`, the less the defense can block.
pub fn calculate_damage(attack: f64, defense: f64, damage_constant: f64) -> i64 {
    let denominator = damage_constant + defense;
    if denominator <= 0.0 {
        return round_amount(attack).max(1);
    }
    round_amount(attack * (damage_constant / denominator)).max(1)
}

/// Combined multiplier of an attacking element against every defending affinity.
///
/// Each defending affinity contributes the attacker's listed multiplier
/// against it (1.0 when unlisted); the contributions multiply together. A
/// defender with no affinities takes 1x.
pub fn elemental_multiplier<'a>(
    attacking: &Element,
    defending: impl IntoIterator<Item = &'a Element>,
) -> f64 {
    defending
        .into_iter()
        .map(|element| attacking.multiplier_against(element.kind))
        .product()
}

/// Apply an elemental multiplier to base damage. Never below 1.
pub fn elemental_damage(base_damage: i64, multiplier: f64) -> i64 {
    round_amount(base_damage as f64 * multiplier).max(1)
}

/// Nova cost of attacking with an element.
pub fn elemental_cost(element: &Element, base_cost: i32) -> i32 {
    round_amount(base_cost as f64 * element.apply_cost_multiplier).clamp(0, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn damage_is_at_least_one() {
        assert_eq!(calculate_damage(1.0, 10_000.0, 10.0), 1);
        assert_eq!(calculate_damage(1.0, 10_000.0, 1.0), 1);
        assert_eq!(calculate_damage(1.0, 10_000.0, 1000.0), 1);
    }

    #[test]
    fn damage_matches_reference_scenario() {
        // 10 * 10 / (10 + 40) = 2
        assert_eq!(calculate_damage(10.0, 40.0, 10.0), 2);
    }

    #[test]
    fn multiplier_defaults_to_neutral() {
        let fire = Element::new(ElementKind::Fire, "Fire").with_multiplier(ElementKind::Water, 2.0);
        let stone = Element::new(ElementKind::Stone, "Stone");
        let water = Element::new(ElementKind::Water, "Water");

        assert_eq!(elemental_multiplier(&fire, [&stone]), 1.0);
        assert_eq!(elemental_multiplier(&fire, [&water]), 2.0);
        let none: [&Element; 0] = [];
        assert_eq!(elemental_multiplier(&fire, none), 1.0);
    }

    #[test]
    fn multipliers_compound_across_affinities() {
        let fire = Element::new(ElementKind::Fire, "Fire")
            .with_multiplier(ElementKind::Water, 2.0)
            .with_multiplier(ElementKind::Ice, 4.0);
        let water = Element::new(ElementKind::Water, "Water");
        let ice = Element::new(ElementKind::Ice, "Ice");

        assert_eq!(elemental_multiplier(&fire, [&water, &ice]), 8.0);
    }

    #[test]
    fn elemental_damage_clamps_to_one() {
        assert_eq!(elemental_damage(2, 2.0), 4);
        assert_eq!(elemental_damage(7, 0.0), 1);
    }

    #[test]
    fn elemental_cost_scales() {
        let air = Element::new(ElementKind::Air, "Air").with_cost_multiplier(3.0);
        assert_eq!(elemental_cost(&air, 2), 6);
    }

    #[test]
    fn huge_cost_multipliers_saturate() {
        let fire = Element::new(ElementKind::Fire, "Fire").with_cost_multiplier(1e12);
        assert_eq!(elemental_cost(&fire, 5), i32::MAX);
        let free = Element::new(ElementKind::Fire, "Fire").with_cost_multiplier(-1e12);
        assert_eq!(elemental_cost(&free, 5), 0);
    }
}
