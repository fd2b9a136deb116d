//! Long Night world-degradation engine.
//!
//! Platform-agnostic rules for degrading a mainworld's Universal World
//! Profile through the Hard Times war-attrition stages and the Virus
//! collapse procedure. The crate holds no I/O, no persistence, and no
//! ambient randomness: every stage is a pure function over a world record
//! and an injected dice capability, so callers can run worlds in parallel
//! with one dice stream each and replay any outcome from a seed.

pub mod dice;
pub mod hard_times;
pub mod uwp;
pub mod virus;
pub mod world;

// Re-export commonly used types
pub use dice::{Dice, DiceBundle, ScriptedDice, SeededDice};
pub use hard_times::{
    AttritionContext, AttritionError, AttritionOutcome, DegreeBand, DegreeTable, DegreesOfChange,
    ShockOutcome, Untranscribed, biosphere_shock, starport_attrition,
};
pub use uwp::{Starport, UwpError, decode, encode, format_profile};
pub use virus::{
    CollapseOutcome, CollapseStep, StepTagSet, collapse, max_sustainable_population,
    post_collapse_government, tech_level_decline,
};
pub use world::{FrontierStatus, WarZone, WorldRecord};
