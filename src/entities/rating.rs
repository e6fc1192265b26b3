//! Rating entity - The ordinal star scale shared by products and reviews.
//!
//! Ratings are compared by ordinal position. The discount attached to each tier
//! lives in [`crate::config::DiscountTable`], not here.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Star rating from `NotRated` (ordinal 0) to `FiveStar` (ordinal 5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    /// No rating yet
    NotRated,
    /// One star
    OneStar,
    /// Two stars
    TwoStar,
    /// Three stars
    ThreeStar,
    /// Four stars
    FourStar,
    /// Five stars
    FiveStar,
}

impl Rating {
    /// Every tier in ordinal order.
    pub const ALL: [Self; 6] = [
        Self::NotRated,
        Self::OneStar,
        Self::TwoStar,
        Self::ThreeStar,
        Self::FourStar,
        Self::FiveStar,
    ];

    /// Highest valid ordinal.
    pub const MAX_ORDINAL: u8 = 5;

    /// Position of this tier on the scale.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Star-display label, e.g. `★★★☆☆`.
    #[must_use]
    pub const fn stars(self) -> &'static str {
        match self {
            Self::NotRated => "☆☆☆☆☆",
            Self::OneStar => "★☆☆☆☆",
            Self::TwoStar => "★★☆☆☆",
            Self::ThreeStar => "★★★☆☆",
            Self::FourStar => "★★★★☆",
            Self::FiveStar => "★★★★★",
        }
    }

    /// Lenient conversion: anything outside `0..=5` becomes `NotRated`.
    #[must_use]
    pub fn convert(ordinal: i64) -> Self {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(Self::NotRated)
    }

    /// Aggregate of a set of ratings: the arithmetic mean of their ordinals,
    /// rounded half-up to the nearest tier. An empty set is `NotRated`.
    pub fn average<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u64, 0u64), |(sum, count), rating| {
                (sum + u64::from(rating.ordinal()), count + 1)
            });

        if count == 0 {
            return Self::NotRated;
        }

        // floor(sum / count + 1/2) in integer arithmetic
        let rounded = (2 * sum + count) / (2 * count);
        Self::convert(i64::try_from(rounded.min(u64::from(Self::MAX_ORDINAL))).unwrap_or(0))
    }
}

impl TryFrom<i64> for Rating {
    type Error = Error;

    fn try_from(ordinal: i64) -> Result<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .ok_or_else(|| Error::parse(format!("rating ordinal {ordinal} is outside 0..=5")))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stars())
    }
}
