//! Pseudohex codec and the starport quality scale.
//!
//! UWP attributes render as single characters: digits for 0-9, then letters
//! with `I` skipped per the canonical Traveller table. Tech levels run to 33
//! and the codec domain tops out at 34 (`Z`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display symbols for attribute values 0 through 34. `I` is omitted.
const SYMBOLS: [char; 35] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J',
    'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Errors raised when a value or symbol falls outside the codec's domain.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UwpError {
    /// The value has no pseudohex symbol; nothing above 34 is representable.
    #[error("value {0} exceeds the pseudohex range 0-34")]
    OutOfRange(i32),
    /// The character is not part of the pseudohex alphabet.
    #[error("unrecognized pseudohex symbol {0:?}")]
    InvalidSymbol(char),
}

/// Encode an attribute value as its pseudohex symbol.
///
/// Negative values clamp to 0 before encoding.
///
/// # Errors
///
/// Returns [`UwpError::OutOfRange`] for values above 34 rather than wrapping.
pub fn encode(value: i32) -> Result<char, UwpError> {
    let clamped = value.max(0);
    usize::try_from(clamped)
        .ok()
        .and_then(|idx| SYMBOLS.get(idx).copied())
        .ok_or(UwpError::OutOfRange(value))
}

/// Decode a pseudohex symbol back into its attribute value.
///
/// Exact inverse of [`encode`] over 0-34. Unknown symbols are reported, not
/// coerced to 0.
///
/// # Errors
///
/// Returns [`UwpError::InvalidSymbol`] for characters outside the table.
pub fn decode(symbol: char) -> Result<i32, UwpError> {
    SYMBOLS
        .iter()
        .position(|&s| s == symbol)
        .and_then(|idx| i32::try_from(idx).ok())
        .ok_or(UwpError::InvalidSymbol(symbol))
}

/// Render the canonical profile line, e.g. `A566999-E`.
///
/// # Errors
///
/// Returns [`UwpError::OutOfRange`] if any attribute exceeds the codec
/// domain. Law levels left unclamped by the collapse rules surface here.
#[allow(clippy::too_many_arguments)]
pub fn format_profile(
    starport: Starport,
    size: i32,
    atmosphere: i32,
    hydrographics: i32,
    population: i32,
    government: i32,
    law: i32,
    tech_level: i32,
) -> Result<String, UwpError> {
    let mut profile = String::with_capacity(9);
    profile.push(starport.symbol());
    for value in [
        size,
        atmosphere,
        hydrographics,
        population,
        government,
        law,
    ] {
        profile.push(encode(value)?);
    }
    profile.push('-');
    profile.push(encode(tech_level)?);
    Ok(profile)
}

/// Starport quality classes, best to worst. `X` means no port at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Starport {
    A,
    B,
    C,
    D,
    E,
    #[default]
    X,
}

/// Degradation order walked by [`Starport::reduce`], one class per degree.
const CLASS_ORDER: [Starport; 6] = [
    Starport::A,
    Starport::B,
    Starport::C,
    Starport::D,
    Starport::E,
    Starport::X,
];

impl Starport {
    /// The UWP character for this class.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::X => 'X',
        }
    }

    /// Parse a UWP starport character.
    ///
    /// # Errors
    ///
    /// Returns [`UwpError::InvalidSymbol`] for anything outside `A-E`, `X`.
    pub fn from_symbol(symbol: char) -> Result<Self, UwpError> {
        match symbol {
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            'E' => Ok(Self::E),
            'X' => Ok(Self::X),
            other => Err(UwpError::InvalidSymbol(other)),
        }
    }

    fn rank(self) -> usize {
        CLASS_ORDER
            .iter()
            .position(|&class| class == self)
            .unwrap_or(CLASS_ORDER.len() - 1)
    }

    /// Reduce the port by `degrees` classes.
    ///
    /// Any degree that would pass `E` lands on `X`; reducing from `E` always
    /// yields `X` and `X` is terminal. Zero degrees is the identity.
    #[must_use]
    pub fn reduce(self, degrees: u32) -> Self {
        if degrees == 0 || self == Self::X {
            return self;
        }
        let steps = usize::try_from(degrees).unwrap_or(usize::MAX);
        CLASS_ORDER
            .get(self.rank().saturating_add(steps))
            .copied()
            .unwrap_or(Self::X)
    }

    /// Worsen the port to at least `floor` quality; never improves it.
    #[must_use]
    pub fn worsen_to(self, floor: Self) -> Self {
        if self.rank() < floor.rank() { floor } else { self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_round_trips_full_domain() {
        for value in 0..=34 {
            let symbol = encode(value).unwrap();
            assert_eq!(decode(symbol).unwrap(), value);
        }
        for symbol in SYMBOLS {
            let value = decode(symbol).unwrap();
            assert_eq!(encode(value).unwrap(), symbol);
        }
    }

    #[test]
    fn encode_clamps_negative_and_rejects_high() {
        assert_eq!(encode(-5).unwrap(), '0');
        assert_eq!(encode(35), Err(UwpError::OutOfRange(35)));
        assert_eq!(encode(100), Err(UwpError::OutOfRange(100)));
    }

    #[test]
    fn letter_i_is_skipped() {
        assert_eq!(decode('I'), Err(UwpError::InvalidSymbol('I')));
        assert_eq!(encode(18).unwrap(), 'J');
        assert_eq!(decode('O').unwrap(), 23);
    }

    #[test]
    fn decode_rejects_unknown_symbols() {
        assert_eq!(decode('i'), Err(UwpError::InvalidSymbol('i')));
        assert_eq!(decode('@'), Err(UwpError::InvalidSymbol('@')));
        assert_eq!(decode(' '), Err(UwpError::InvalidSymbol(' ')));
    }

    #[test]
    fn profile_renders_canonical_line() {
        let line = format_profile(Starport::A, 5, 6, 6, 9, 9, 9, 14).unwrap();
        assert_eq!(line, "A566999-E");
    }

    #[test]
    fn profile_reports_out_of_band_law() {
        let result = format_profile(Starport::B, 5, 6, 6, 9, 9, 40, 10);
        assert_eq!(result, Err(UwpError::OutOfRange(40)));
    }

    #[test]
    fn reduce_walks_the_class_table() {
        assert_eq!(Starport::A.reduce(2), Starport::C);
        assert_eq!(Starport::A.reduce(4), Starport::E);
        assert_eq!(Starport::A.reduce(5), Starport::X);
        assert_eq!(Starport::E.reduce(1), Starport::X);
        assert_eq!(Starport::D.reduce(5), Starport::X);
        assert_eq!(Starport::X.reduce(3), Starport::X);
        assert_eq!(Starport::B.reduce(0), Starport::B);
    }

    #[test]
    fn worsen_never_improves() {
        assert_eq!(Starport::A.worsen_to(Starport::D), Starport::D);
        assert_eq!(Starport::E.worsen_to(Starport::D), Starport::E);
        assert_eq!(Starport::X.worsen_to(Starport::D), Starport::X);
        assert_eq!(Starport::D.worsen_to(Starport::D), Starport::D);
    }

    #[test]
    fn starport_symbols_round_trip() {
        for class in CLASS_ORDER {
            assert_eq!(Starport::from_symbol(class.symbol()).unwrap(), class);
        }
        assert_eq!(Starport::from_symbol('F'), Err(UwpError::InvalidSymbol('F')));
    }
}
