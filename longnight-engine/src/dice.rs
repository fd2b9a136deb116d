//! Dice capability consumed by the rule stages.
//!
//! Stages never reach for an ambient RNG; every roll goes through [`Dice`]
//! so deterministic seeded streams or scripted results can stand in.

use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;

/// Uniform dice capability.
///
/// `roll(count, sides)` sums `count` independent uniform results over
/// `1..=sides`. The derived throws are convenience compositions used
/// throughout the rules.
pub trait Dice {
    /// Sum of `count` uniform rolls over `1..=sides`.
    fn roll(&mut self, count: u32, sides: u32) -> i32;

    /// Standard 2D throw.
    fn throw2(&mut self) -> i32 {
        self.roll(2, 6)
    }

    /// Flux roll, 1D - 1D (distributed identically to 2D - 7).
    fn flux(&mut self) -> i32 {
        self.roll(1, 6) - self.roll(1, 6)
    }

    /// D66 roll: the first die is the tens digit, the second the ones.
    fn d66(&mut self) -> i32 {
        self.roll(1, 6) * 10 + self.roll(1, 6)
    }
}

/// Deterministic dice stream with draw instrumentation.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: SmallRng,
    draws: u64,
}

impl SeededDice {
    /// Seed a stream directly.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Derive a domain-separated stream from a user-visible seed, so the
    /// same seed yields independent sequences per rule domain.
    #[must_use]
    pub fn from_user_seed(seed: u64, domain_tag: &[u8]) -> Self {
        Self::from_seed(derive_stream_seed(seed, domain_tag))
    }

    /// Number of individual dice rolled on this stream so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, count: u32, sides: u32) -> i32 {
        let sides = sides.max(1);
        let mut total = 0_i32;
        for _ in 0..count {
            self.draws = self.draws.saturating_add(1);
            total += i32::try_from(self.rng.gen_range(1..=sides)).unwrap_or(0);
        }
        total
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}

/// Deterministic bundle of dice streams segregated by rule domain, so a
/// draw in one stage never shifts the sequence seen by another.
#[derive(Debug, Clone)]
pub struct DiceBundle {
    shock: RefCell<SeededDice>,
    attrition: RefCell<SeededDice>,
    collapse: RefCell<SeededDice>,
}

impl DiceBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            shock: RefCell::new(SeededDice::from_user_seed(seed, b"shock")),
            attrition: RefCell::new(SeededDice::from_user_seed(seed, b"attrition")),
            collapse: RefCell::new(SeededDice::from_user_seed(seed, b"collapse")),
        }
    }

    /// Access the biosphere-shock stream.
    #[must_use]
    pub fn shock(&self) -> RefMut<'_, SeededDice> {
        self.shock.borrow_mut()
    }

    /// Access the port-attrition stream.
    #[must_use]
    pub fn attrition(&self) -> RefMut<'_, SeededDice> {
        self.attrition.borrow_mut()
    }

    /// Access the collapse stream.
    #[must_use]
    pub fn collapse(&self) -> RefMut<'_, SeededDice> {
        self.collapse.borrow_mut()
    }
}

/// Replays a fixed sequence of individual die results.
///
/// Each queued value answers one die, so `roll(2, 6)` consumes two entries.
/// An exhausted queue yields 0; [`ScriptedDice::remaining`] lets callers
/// assert the script was consumed exactly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    queue: VecDeque<i32>,
}

impl ScriptedDice {
    /// Queue up a script of individual die results.
    #[must_use]
    pub fn new(results: &[i32]) -> Self {
        Self {
            queue: results.iter().copied().collect(),
        }
    }

    /// Unconsumed results left in the script.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, count: u32, _sides: u32) -> i32 {
        (0..count)
            .map(|_| self.queue.pop_front().unwrap_or_default())
            .sum()
    }
}
