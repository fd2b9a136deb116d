//! World records and the shared context consumed by the rule stages.

use serde::{Deserialize, Serialize};

use crate::uwp::{self, Starport, UwpError};

/// War-zone severity tiers applied as roll modifiers across stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WarZone {
    #[default]
    Safe,
    War,
    Intense,
    BlackWar,
}

impl WarZone {
    /// Clamp an arbitrary severity level into the 0-3 tier range.
    #[must_use]
    pub const fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => Self::Safe,
            1 => Self::War,
            2 => Self::Intense,
            _ => Self::BlackWar,
        }
    }

    /// Roll modifier contributed by this tier.
    #[must_use]
    pub const fn dm(self) -> i32 {
        match self {
            Self::Safe => 0,
            Self::War => 1,
            Self::Intense => 2,
            Self::BlackWar => 3,
        }
    }
}

/// Frontier classification of the surrounding region, consumed by the
/// starport attrition stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrontierStatus {
    #[default]
    Safe,
    Frontier,
    Outlands,
    Wilds,
}

/// One mainworld's demographic and technology profile.
///
/// Records are passed by value through the stages; every stage returns a new
/// record and retains nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorldRecord {
    pub starport: Starport,
    pub size: i32,
    pub atmosphere: i32,
    pub hydrographics: i32,
    pub population: i32,
    pub government: i32,
    pub law: i32,
    pub tech_level: i32,
    /// Leading significant digit of the actual population, 0-9.
    pub population_exponent: i32,
    #[serde(default)]
    pub naval_base: bool,
    #[serde(default)]
    pub scout_base: bool,
    #[serde(default)]
    pub way_station: bool,
    #[serde(default)]
    pub depot: bool,
}

impl WorldRecord {
    /// Canonical textual rendering, e.g. `A566999-E`.
    ///
    /// # Errors
    ///
    /// Returns [`UwpError::OutOfRange`] when an attribute has drifted past
    /// the codec domain (an unclamped law level, for instance).
    pub fn profile(&self) -> Result<String, UwpError> {
        uwp::format_profile(
            self.starport,
            self.size,
            self.atmosphere,
            self.hydrographics,
            self.population,
            self.government,
            self.law,
            self.tech_level,
        )
    }

    /// Whether any facility flag is still set.
    #[must_use]
    pub const fn has_facilities(&self) -> bool {
        self.naval_base || self.scout_base || self.way_station || self.depot
    }

    pub(crate) fn clear_facilities(&mut self) {
        self.naval_base = false;
        self.scout_base = false;
        self.way_station = false;
        self.depot = false;
    }

    /// A world with no population cannot sustain institutions: zero the
    /// government, law, and exponent and clear every facility flag.
    /// Stages apply this as an unconditional post-condition.
    pub(crate) fn enforce_depopulation(&mut self) {
        if self.population > 0 {
            return;
        }
        self.population = 0;
        self.population_exponent = 0;
        self.government = 0;
        self.law = 0;
        self.clear_facilities();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn war_zone_clamps_out_of_range_levels() {
        assert_eq!(WarZone::from_level(-5), WarZone::Safe);
        assert_eq!(WarZone::from_level(0), WarZone::Safe);
        assert_eq!(WarZone::from_level(2), WarZone::Intense);
        assert_eq!(WarZone::from_level(10), WarZone::BlackWar);
    }

    #[test]
    fn war_zone_dm_matches_tier() {
        assert_eq!(WarZone::Safe.dm(), 0);
        assert_eq!(WarZone::War.dm(), 1);
        assert_eq!(WarZone::Intense.dm(), 2);
        assert_eq!(WarZone::BlackWar.dm(), 3);
    }

    #[test]
    fn depopulation_wipes_institutions() {
        let mut world = WorldRecord {
            starport: Starport::C,
            population: 0,
            population_exponent: 4,
            government: 9,
            law: 11,
            naval_base: true,
            scout_base: true,
            way_station: true,
            depot: true,
            ..WorldRecord::default()
        };
        world.enforce_depopulation();
        assert_eq!(world.government, 0);
        assert_eq!(world.law, 0);
        assert_eq!(world.population_exponent, 0);
        assert!(!world.has_facilities());
    }

    #[test]
    fn depopulation_leaves_populated_worlds_alone() {
        let mut world = WorldRecord {
            population: 5,
            government: 7,
            law: 6,
            population_exponent: 3,
            naval_base: true,
            ..WorldRecord::default()
        };
        world.enforce_depopulation();
        assert_eq!(world.government, 7);
        assert!(world.naval_base);
    }

    #[test]
    fn profile_round_trips_through_serde() {
        let world = WorldRecord {
            starport: Starport::B,
            size: 7,
            atmosphere: 5,
            hydrographics: 5,
            population: 9,
            government: 9,
            law: 9,
            tech_level: 12,
            population_exponent: 5,
            naval_base: true,
            ..WorldRecord::default()
        };
        assert_eq!(world.profile().unwrap(), "B755999-C");
        let json = serde_json::to_string(&world).unwrap();
        let back: WorldRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, world);
    }
}
