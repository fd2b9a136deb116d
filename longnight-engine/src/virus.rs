//! Virus collapse pipeline.
//!
//! Runs a mainworld profile through the Collapse procedure from the
//! Traveller: The New Era rulebook (pp190-191): sustainable-population
//! clamp, tech decline, population decay, port and base reduction, and the
//! government re-roll. One ordered pass per invocation; every draw comes
//! from the injected dice capability.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::dice::Dice;
use crate::uwp::Starport;
use crate::world::WorldRecord;

/// Balkanized anarchy, the government of worlds that fragment.
const GOV_BALKANIZED: i32 = 7;

/// Non-charismatic dictatorship. Technologically elevated dictators are
/// folded into this code.
const GOV_DICTATOR: i32 = 11;

/// Post-collapse government by `2D - 7 + population`, translated back to
/// classic codes. Indexed 0-15; anything higher is a dictatorship.
const GOV_TABLE: [i32; 16] = [0, 0, 2, 4, 10, 12, 11, 13, 15, 14, 8, 3, 9, 9, 9, 9];

/// Pipeline steps recorded in the collapse ledger, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseStep {
    /// The world cannot sustain any population; everything civic is gone.
    FullCollapse,
    /// Population clamped down to the sustainable ceiling.
    PopulationClamped,
    /// Tech level declined.
    TechDecline,
    /// Population exponent decayed alongside the tech decline.
    ExponentDecay,
    /// A low-population world lost another tech level.
    LowPopulationPenalty,
    /// Starport reduced by one or two classes.
    PortReduced,
    /// Starport destroyed outright.
    PortDestroyed,
    /// Government collapsed into balkanized anarchy.
    Balkanized,
    /// A technologically elevated dictator seized the remains.
    DictatorSeized,
    /// Government re-rolled from the post-collapse table.
    GovernmentRerolled,
}

/// Inline capacity covers the longest possible step trail.
pub type StepTagSet = SmallVec<[CollapseStep; 8]>;

/// Result of one collapse pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseOutcome {
    /// Updated world record.
    pub world: WorldRecord,
    /// Tech-level decline rolled in the industry step; the port and
    /// government steps compare their rolls against it.
    pub tech_decline: i32,
    /// Ledger of the steps that fired, in pipeline order.
    pub steps: StepTagSet,
}

/// Maximum sustainable population from the physical profile.
///
/// Vacuum, trace, and insidious-band atmospheres support nobody outright.
/// Otherwise start from 10 and stack penalties for small size, marginal or
/// corrosive atmospheres, and dry or steaming hydrographics.
#[must_use]
pub fn max_sustainable_population(size: i32, atmosphere: i32, hydrographics: i32) -> i32 {
    if matches!(atmosphere, 0..=3 | 10..=12) {
        return 0;
    }
    let mut msp = 10;
    if size < 8 {
        msp -= 1;
    }
    if size < 5 {
        msp -= 1;
    }
    if matches!(atmosphere, 5 | 7 | 9) {
        msp -= 1;
    }
    if atmosphere == 4 {
        msp -= 2;
    }
    if matches!(atmosphere, 13..=15) {
        msp -= 3;
    }
    if matches!(hydrographics, 1 | 2 | 10) {
        msp -= 3;
    }
    if hydrographics == 0 {
        msp -= 2;
    }
    msp
}

/// Roll the Virus-driven tech decline for the current tech band.
/// Returns the decline amount, not the new tech level.
pub fn tech_level_decline<D>(tech_level: i32, dice: &mut D) -> i32
where
    D: Dice + ?Sized,
{
    if tech_level < 9 {
        (dice.roll(1, 6) - 3).max(0)
    } else if tech_level < 11 {
        dice.roll(1, 6)
    } else if tech_level < 15 {
        dice.roll(2, 6)
    } else {
        dice.roll(3, 6)
    }
}

/// Post-collapse government for a surviving population.
pub fn post_collapse_government<D>(population: i32, dice: &mut D) -> i32
where
    D: Dice + ?Sized,
{
    let index = (dice.throw2() - 7 + population).max(0);
    usize::try_from(index)
        .ok()
        .and_then(|idx| GOV_TABLE.get(idx).copied())
        .unwrap_or(GOV_DICTATOR)
}

/// Integer division rounding half up, for non-negative operands.
const fn div_round_half_up(value: i32, divisor: i32) -> i32 {
    (value + divisor / 2) / divisor
}

/// Run one world through the full collapse.
pub fn collapse<D>(world: &WorldRecord, dice: &mut D) -> CollapseOutcome
where
    D: Dice + ?Sized,
{
    let mut world = world.clone();
    let mut steps = StepTagSet::new();

    // Sustainable-population ceiling. Worlds that cannot feed anyone
    // collapse completely; the physical profile and tech level survive as
    // ruins.
    let msp = max_sustainable_population(world.size, world.atmosphere, world.hydrographics);
    if msp <= 0 {
        world.starport = Starport::X;
        world.population = 0;
        world.enforce_depopulation();
        steps.push(CollapseStep::FullCollapse);
        return CollapseOutcome {
            world,
            tech_decline: 0,
            steps,
        };
    }
    if msp < world.population {
        world.population = msp;
        world.population_exponent = dice.roll(1, 9);
        steps.push(CollapseStep::PopulationClamped);
    }

    // Industry decays, and the population digit follows it down.
    let tech_decline = tech_level_decline(world.tech_level, dice);
    if tech_decline > 0 {
        world.tech_level = (world.tech_level - tech_decline).max(0);
        steps.push(CollapseStep::TechDecline);
        let exponent_decline = div_round_half_up(tech_decline, 4);
        if exponent_decline > 0 {
            world.population_exponent -= exponent_decline;
            if world.population_exponent < 1 {
                world.population -= 1;
                if world.population < 1 {
                    world.population = 0;
                    world.population_exponent = 0;
                } else {
                    // Borrow a digit: the exponent wraps below the new
                    // leading digit.
                    world.population_exponent += 9;
                }
            }
            steps.push(CollapseStep::ExponentDecay);
        }
    }

    // Small populations cannot keep the machines running.
    if world.population < 6 {
        world.tech_level = (world.tech_level - 1).max(0);
        if world.population_exponent == 1 {
            world.population -= 1;
            if world.population < 1 {
                world.population = 0;
                world.population_exponent = 0;
            } else {
                world.population_exponent = 5;
            }
        } else {
            world.population_exponent = div_round_half_up(world.population_exponent, 2);
        }
        steps.push(CollapseStep::LowPopulationPenalty);
    }

    // The port and its tenants.
    if world.population < 1 {
        world.starport = Starport::X;
        world.clear_facilities();
        steps.push(CollapseStep::PortDestroyed);
    } else {
        let roll = dice.roll(1, 6);
        if roll > tech_decline {
            world.starport = world.starport.reduce(1);
            steps.push(CollapseStep::PortReduced);
            if world.starport == Starport::X {
                world.clear_facilities();
            } else {
                if dice.roll(1, 10) < 9 {
                    world.naval_base = false;
                }
                if dice.roll(1, 10) < 8 {
                    world.scout_base = false;
                }
                if dice.roll(1, 10) < 10 {
                    world.way_station = false;
                }
                if dice.roll(1, 10) < 10 {
                    world.depot = false;
                }
            }
        } else if roll == tech_decline {
            world.starport = world.starport.reduce(2);
            world.clear_facilities();
            steps.push(CollapseStep::PortReduced);
        } else {
            world.starport = Starport::X;
            world.clear_facilities();
            steps.push(CollapseStep::PortDestroyed);
        }
    }

    // Whatever government is left.
    if world.population < 1 {
        world.government = 0;
        world.law = 0;
    } else {
        let balkanization = world.population + world.size - world.tech_level;
        if dice.throw2() <= balkanization {
            world.government = GOV_BALKANIZED;
            steps.push(CollapseStep::Balkanized);
        } else if world.population > 4 && dice.roll(1, 10) < tech_decline {
            world.government = GOV_DICTATOR;
            steps.push(CollapseStep::DictatorSeized);
        } else {
            world.government = post_collapse_government(world.population, dice);
            steps.push(CollapseStep::GovernmentRerolled);
        }
        // Law follows the new government; the rules leave it unclamped.
        world.law = dice.throw2() - 7 + world.government;
    }

    world.enforce_depopulation();
    CollapseOutcome {
        world,
        tech_decline,
        steps,
    }
}
