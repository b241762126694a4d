//! Battle unit component.
//!
//! Base attributes come from the `Units` table and are scaled by level and
//! star rank:
//!
//! ```text
//! bonus = (1 + 0.1 * (level - 1)) * (1 + 0.2 * star)
//! ```
//!
//! The bonus multiplies max health, attack and defense, truncating toward
//! zero. Health always stays within `[0, max_hp]`.

use crate::resources::assetcache::AssetCache;
use crate::resources::tablereader::{TableReader, field_i64, field_str};
use bevy_ecs::prelude::Component;
use log::{debug, warn};

pub const UNITS_TABLE: &str = "Units";

/// Marker for units fighting on the enemy side of a battle.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Enemy;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: u32,
    pub name: String,
    pub level: u32,
    pub star: u32,
    hp: i32,
    max_hp: i32,
    attack: i32,
    defense: i32,
}

/// Combined level and star multiplier.
pub fn stat_bonus(level: u32, star: u32) -> f32 {
    let level_bonus = 1.0 + (level as f32 - 1.0) * 0.1;
    let star_bonus = 1.0 + star as f32 * 0.2;
    level_bonus * star_bonus
}

impl Unit {
    /// Build a unit from base stats, applying the level/star bonus.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        level: u32,
        star: u32,
        base_hp: i32,
        base_attack: i32,
        base_defense: i32,
    ) -> Self {
        let bonus = stat_bonus(level, star);
        let max_hp = (base_hp as f32 * bonus) as i32;
        Unit {
            id,
            name: name.into(),
            level,
            star,
            hp: max_hp,
            max_hp,
            attack: (base_attack as f32 * bonus) as i32,
            defense: (base_defense as f32 * bonus) as i32,
        }
    }

    /// Build a unit from its `Units` table record.
    ///
    /// A missing or incomplete record is logged and yields a zero-stat unit
    /// named `"Unknown"`.
    pub fn from_table(
        tables: &mut TableReader,
        cache: &mut AssetCache,
        id: u32,
        level: u32,
        star: u32,
    ) -> Self {
        let Some(record) = tables.record(cache, UNITS_TABLE, &id.to_string()) else {
            warn!("[Unit] Unit record not found: {}", id);
            return Unit::new(id, "Unknown", level, star, 0, 0, 0);
        };
        let stats = (
            field_str(record, "name"),
            field_i64(record, "hp"),
            field_i64(record, "attack"),
            field_i64(record, "defense"),
        );
        match stats {
            (Some(name), Some(hp), Some(attack), Some(defense)) => Unit::new(
                id,
                name,
                level,
                star,
                hp as i32,
                attack as i32,
                defense as i32,
            ),
            _ => {
                warn!("[Unit] Unit record {} is missing fields", id);
                Unit::new(id, "Unknown", level, star, 0, 0, 0)
            }
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn attack(&self) -> i32 {
        self.attack
    }

    pub fn defense(&self) -> i32 {
        self.defense
    }

    /// Apply incoming damage reduced by defense. At least 1 point always lands.
    /// Returns the damage actually dealt.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        let actual = (damage - self.defense).max(1);
        self.hp = (self.hp - actual).max(0);
        debug!(
            "[Unit] {} took {} damage. HP: {}/{}",
            self.name, actual, self.hp, self.max_hp
        );
        actual
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn bonus_is_identity_at_level_one_star_zero() {
        assert!((stat_bonus(1, 0) - 1.0).abs() < EPSILON);
        let u = Unit::new(1, "Knight", 1, 0, 100, 20, 5);
        assert_eq!(u.max_hp(), 100);
        assert_eq!(u.attack(), 20);
        assert_eq!(u.defense(), 5);
        assert_eq!(u.hp(), 100);
    }

    #[test]
    fn bonus_at_level_three_star_two() {
        assert!((stat_bonus(3, 2) - 1.68).abs() < EPSILON);
        let u = Unit::new(1, "Knight", 3, 2, 100, 50, 10);
        assert_eq!(u.max_hp(), 168);
        assert_eq!(u.attack(), 84);
        assert_eq!(u.defense(), 16);
    }

    #[test]
    fn damage_always_at_least_one() {
        let mut u = Unit::new(1, "Wall", 1, 0, 10, 0, 100);
        assert_eq!(u.take_damage(5), 1);
        assert_eq!(u.hp(), 9);
    }

    #[test]
    fn damage_never_below_zero() {
        let mut u = Unit::new(1, "Scout", 1, 0, 10, 0, 2);
        assert_eq!(u.take_damage(50), 48);
        assert_eq!(u.hp(), 0);
        assert!(u.is_dead());
        u.take_damage(50);
        assert_eq!(u.hp(), 0);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut u = Unit::new(1, "Cleric", 1, 0, 30, 0, 0);
        u.take_damage(10);
        u.heal(100);
        assert_eq!(u.hp(), 30);
        u.heal(-5);
        assert_eq!(u.hp(), 30);
    }
}
