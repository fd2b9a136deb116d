//! Hard Times attrition stages.
//!
//! War and disaster degradation for mainworld profiles, per the Hard Times
//! rules (pp19-25): a biosphere shock stage and a starport/base attrition
//! stage. Stages share nothing beyond what the caller threads between them;
//! the shock stage hands a tech-level DM forward for the industry stage
//! rather than applying it itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dice::Dice;
use crate::uwp::Starport;
use crate::world::{FrontierStatus, WarZone, WorldRecord};

/// Atmosphere code forced onto worlds rendered insidious by dieback.
const ATMOSPHERE_INSIDIOUS: i32 = 12;

/// Tech-level DM handed forward when the biosphere shock costs population.
const SHOCK_TECH_DM: i32 = -3;

const DEGREES_OF_CHANGE: &str = "degrees of change";

/// Outcome of the biosphere shock stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShockOutcome {
    /// Updated world record.
    pub world: WorldRecord,
    /// The modified throw that selected the outcome band.
    pub roll: i32,
    /// Tech-level DM for the later industry stage. Returned to the caller
    /// to thread forward; nothing applies it here.
    pub tech_dm: i32,
}

/// Biosphere shock: roll 2D with war-zone, port, and population DMs.
///
/// Bands: 5- no effect. 6-10 the atmosphere taints toward the nearest
/// standard band (3 and 5 drop by one, 6 and 8 rise by one). 9-10 also cost
/// a population digit and hand a -3 tech DM forward. 11-12 is a reserved
/// band with no transcribed effect. 13+ is dieback: population, government,
/// law, and exponent all collapse to zero, the port falls to at least D,
/// and the atmosphere turns insidious.
pub fn biosphere_shock<D>(world: &WorldRecord, war_zone: WarZone, dice: &mut D) -> ShockOutcome
where
    D: Dice + ?Sized,
{
    let mut world = world.clone();
    let mut roll = dice.throw2() + war_zone.dm();
    if world.starport == Starport::A {
        roll += 1;
    }
    if world.population >= 9 {
        roll += 1;
    }

    let mut tech_dm = 0;
    if roll > 5 {
        if roll < 11 {
            match world.atmosphere {
                3 | 5 => world.atmosphere -= 1,
                6 | 8 => world.atmosphere += 1,
                _ => {}
            }
        }
        match roll {
            9 | 10 => {
                world.population -= 1;
                tech_dm = SHOCK_TECH_DM;
            }
            // Reserved band; the rules text here is unreadable and no
            // effect is transcribed.
            11 | 12 => {}
            r if r > 12 => {
                world.population = 0;
                world.government = 0;
                world.law = 0;
                world.population_exponent = 0;
                world.starport = world.starport.worsen_to(Starport::D);
                world.atmosphere = ATMOSPHERE_INSIDIOUS;
            }
            _ => {}
        }
    }

    world.population = world.population.max(0);
    world.enforce_depopulation();

    ShockOutcome {
        world,
        roll,
        tech_dm,
    }
}

/// Context flags consumed by starport attrition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttritionContext {
    pub frontier: FrontierStatus,
    pub war_zone: WarZone,
    /// Worlds cut off from the main trade routes fare worse.
    pub isolated: bool,
}

/// Errors raised by the starport attrition stage and its rule tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttritionError {
    /// A rule table has not been transcribed from the rulebook; the stage
    /// reports the gap instead of guessing values.
    #[error("the {0} table is not transcribed; supply a DegreesOfChange implementation")]
    Untranscribed(&'static str),
    /// A degree table failed to parse from JSON.
    #[error("degree table could not be parsed: {0}")]
    Parse(String),
    /// A degree table band violates the documented shape.
    #[error("degree table band {index} is invalid: {reason}")]
    InvalidBand { index: usize, reason: &'static str },
}

/// Maps a modified attrition roll to degrees of starport class reduction.
///
/// The canonical mapping lives in the Hard Times "Degrees of Change" table,
/// which has not been transcribed yet; implementations supply it so the
/// stage machinery does not change when the table lands.
pub trait DegreesOfChange {
    /// Degrees of class reduction for a modified attrition roll.
    ///
    /// # Errors
    ///
    /// Returns [`AttritionError::Untranscribed`] when no mapping exists for
    /// the roll.
    fn degrees(&self, roll: i32) -> Result<u32, AttritionError>;
}

/// Placeholder strategy for the untranscribed degrees-of-change table.
/// Every lookup reports the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Untranscribed;

impl DegreesOfChange for Untranscribed {
    fn degrees(&self, _roll: i32) -> Result<u32, AttritionError> {
        Err(AttritionError::Untranscribed(DEGREES_OF_CHANGE))
    }
}

/// One contiguous roll band mapping to a class reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeBand {
    pub min_roll: i32,
    pub max_roll: i32,
    pub degrees: u32,
}

/// Degrees-of-change mapping loadable from JSON once transcribed.
///
/// Bands must be ascending and non-overlapping. Rolls below the first band
/// reduce nothing; rolls above the last band apply the last band's degrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeTable {
    pub bands: Vec<DegreeBand>,
}

impl DegreeTable {
    /// Load and validate a degree table from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AttritionError::Parse`] on malformed JSON and
    /// [`AttritionError::InvalidBand`] when the bands overlap, run out of
    /// order, or invert their bounds.
    pub fn from_json(json: &str) -> Result<Self, AttritionError> {
        let table: Self =
            serde_json::from_str(json).map_err(|e| AttritionError::Parse(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), AttritionError> {
        for (index, band) in self.bands.iter().enumerate() {
            if band.min_roll > band.max_roll {
                return Err(AttritionError::InvalidBand {
                    index,
                    reason: "minimum roll exceeds maximum",
                });
            }
            if let Some(prev) = index.checked_sub(1).and_then(|i| self.bands.get(i))
                && band.min_roll <= prev.max_roll
            {
                return Err(AttritionError::InvalidBand {
                    index,
                    reason: "bands overlap or are out of order",
                });
            }
        }
        Ok(())
    }
}

impl DegreesOfChange for DegreeTable {
    fn degrees(&self, roll: i32) -> Result<u32, AttritionError> {
        let Some(last) = self.bands.last() else {
            return Err(AttritionError::Untranscribed(DEGREES_OF_CHANGE));
        };
        if roll > last.max_roll {
            return Ok(last.degrees);
        }
        Ok(self
            .bands
            .iter()
            .find(|band| roll >= band.min_roll && roll <= band.max_roll)
            .map_or(0, |band| band.degrees))
    }
}

/// Outcome of the starport attrition stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttritionOutcome {
    /// Updated world record.
    pub world: WorldRecord,
    /// Modified 1D roll fed through the degrees-of-change mapping.
    pub roll: i32,
    /// Classes of starport reduction applied.
    pub degrees: u32,
}

/// Starport and base attrition.
///
/// Rolls 1D with the transcribed per-class DMs, maps the result through the
/// injected degrees-of-change strategy, reduces the port, and then checks
/// the naval and scout bases: a port falling two or more classes loses both
/// outright, otherwise each survives a separate 2D throw (naval eliminated
/// on 7+, scout on 8+, with frontier and war-zone DMs). In the Wilds any
/// war zone eliminates the bases without a throw. E and X ports pass
/// through untouched.
///
/// # Errors
///
/// Propagates [`AttritionError::Untranscribed`] from the strategy when the
/// degrees-of-change mapping is unavailable.
pub fn starport_attrition<S, D>(
    world: &WorldRecord,
    ctx: &AttritionContext,
    rules: &S,
    dice: &mut D,
) -> Result<AttritionOutcome, AttritionError>
where
    S: DegreesOfChange + ?Sized,
    D: Dice + ?Sized,
{
    let mut world = world.clone();

    let Some(dm) = attrition_dm(world.starport, ctx, world.population, world.tech_level) else {
        // Nothing left worth attriting.
        return Ok(AttritionOutcome {
            world,
            roll: 0,
            degrees: 0,
        });
    };

    let roll = dice.roll(1, 6) + dm;
    let degrees = rules.degrees(roll)?;
    world.starport = world.starport.reduce(degrees);

    if degrees >= 2 {
        world.naval_base = false;
        world.scout_base = false;
    } else if ctx.frontier == FrontierStatus::Wilds && ctx.war_zone != WarZone::Safe {
        world.naval_base = false;
        world.scout_base = false;
    } else {
        let elimination_dm = base_elimination_dm(ctx);
        if world.naval_base && dice.throw2() + elimination_dm >= 7 {
            world.naval_base = false;
        }
        if world.scout_base && dice.throw2() + elimination_dm >= 8 {
            world.scout_base = false;
        }
    }

    Ok(AttritionOutcome {
        world,
        roll,
        degrees,
    })
}

/// Attrition roll DM for the port class, per the transcribed tables.
/// Returns `None` for E and X ports, which the stage skips.
fn attrition_dm(
    port: Starport,
    ctx: &AttritionContext,
    population: i32,
    tech_level: i32,
) -> Option<i32> {
    let wz = ctx.war_zone.dm();
    let dm = match port {
        Starport::A => {
            let mut dm = match ctx.frontier {
                FrontierStatus::Safe => 0,
                FrontierStatus::Frontier => 2,
                FrontierStatus::Outlands | FrontierStatus::Wilds => 3,
            };
            dm += wz;
            if ctx.isolated {
                dm += 2;
            }
            if population < 5 {
                dm += 1;
            }
            if population < 3 {
                dm += 1;
            }
            dm + (11 - tech_level).min(8)
        }
        Starport::B => {
            let mut dm = match ctx.frontier {
                FrontierStatus::Safe | FrontierStatus::Frontier => 0,
                FrontierStatus::Outlands => 2,
                FrontierStatus::Wilds => 3,
            };
            dm += wz.min(2);
            if ctx.isolated {
                dm += 3;
            }
            if population < 5 {
                dm += 1;
            }
            if population < 3 {
                dm += 1;
            }
            dm + (9 - tech_level).min(7)
        }
        Starport::C => {
            let mut dm = match ctx.frontier {
                FrontierStatus::Safe | FrontierStatus::Frontier => 0,
                FrontierStatus::Outlands => 1,
                FrontierStatus::Wilds => 2,
            };
            dm += if wz > 1 { wz - 1 } else { wz };
            if ctx.isolated {
                dm += 4;
            }
            if population < 3 {
                dm += 1;
            }
            if tech_level < 7 {
                dm += (8 - tech_level).min(5);
            }
            dm
        }
        Starport::D => {
            let mut dm = i32::from(ctx.frontier == FrontierStatus::Wilds);
            if ctx.war_zone == WarZone::BlackWar {
                dm += 1;
            }
            if ctx.isolated {
                dm += 1;
            }
            if tech_level < 7 {
                dm += (7 - tech_level).min(3);
            }
            dm
        }
        Starport::E | Starport::X => return None,
    };
    Some(dm)
}

/// DM applied to base-elimination throws. Wilds worlds contribute no
/// numeric DM; their transcribed effect is the automatic elimination under
/// any war zone, handled by the stage itself.
fn base_elimination_dm(ctx: &AttritionContext) -> i32 {
    let frontier = match ctx.frontier {
        FrontierStatus::Safe | FrontierStatus::Wilds => 0,
        FrontierStatus::Frontier => 3,
        FrontierStatus::Outlands => 5,
    };
    let war = match ctx.war_zone {
        WarZone::Safe => 0,
        WarZone::War => 1,
        WarZone::Intense | WarZone::BlackWar => 2,
    };
    frontier + war
}
