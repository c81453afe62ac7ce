//! Card decks.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// The set of cards a participant may vote with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Deck {
    /// `0 1 2 3 5 8 13 21 34 55 89 ?`
    #[default]
    Fibonacci,
    /// `0 ½ 1 2 3 5 8 13 20 40 100 ? ☕`
    ModifiedFibonacci,
    /// `XS S M L XL XXL ?`
    TShirt,
    /// `0 1 2 4 8 16 32 64 ?`
    PowersOfTwo,
}

impl Deck {
    /// Every deck, in menu order.
    pub const ALL: [Self; 4] =
        [Self::Fibonacci, Self::ModifiedFibonacci, Self::TShirt, Self::PowersOfTwo];

    /// Card values in display order.
    #[must_use]
    pub fn cards(self) -> &'static [&'static str] {
        match self {
            Self::Fibonacci => &["0", "1", "2", "3", "5", "8", "13", "21", "34", "55", "89", "?"],
            Self::ModifiedFibonacci => {
                &["0", "½", "1", "2", "3", "5", "8", "13", "20", "40", "100", "?", "☕"]
            },
            Self::TShirt => &["XS", "S", "M", "L", "XL", "XXL", "?"],
            Self::PowersOfTwo => &["0", "1", "2", "4", "8", "16", "32", "64", "?"],
        }
    }

    /// Whether `card` belongs to this deck.
    #[must_use]
    pub fn contains(self, card: &str) -> bool {
        self.cards().contains(&card)
    }

    /// Stable name, accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Fibonacci => "fibonacci",
            Self::ModifiedFibonacci => "modified-fibonacci",
            Self::TShirt => "t-shirt",
            Self::PowersOfTwo => "powers-of-two",
        }
    }
}

impl fmt::Display for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown deck name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown deck `{0}` (expected fibonacci, modified-fibonacci, t-shirt or powers-of-two)")]
pub struct ParseDeckError(String);

impl FromStr for Deck {
    type Err = ParseDeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|deck| deck.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseDeckError(s.to_owned()))
    }
}
