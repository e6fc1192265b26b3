//! Discount table configuration.
//!
//! Which rating tiers earn a discount, and how much, is configuration rather than
//! logic. The table is read from the `[discounts]` section of `config.toml` and
//! defaults to 10% for three stars and above.

use crate::{
    entities::Rating,
    errors::{Error, Result},
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Default percentage per rating ordinal (`NotRated` first).
pub const DEFAULT_PERCENTAGES: [u8; 6] = [0, 0, 0, 10, 10, 10];

/// Tier → discount percentage, indexed by rating ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTable {
    /// Whole-number percentages for `NotRated`, `OneStar` .. `FiveStar`
    #[serde(default = "default_percentages")]
    pub percentages: [u8; 6],
}

const fn default_percentages() -> [u8; 6] {
    DEFAULT_PERCENTAGES
}

impl Default for DiscountTable {
    fn default() -> Self {
        Self {
            percentages: DEFAULT_PERCENTAGES,
        }
    }
}

impl DiscountTable {
    /// Builds a validated table.
    ///
    /// # Errors
    /// Returns `Error::Config` if any percentage exceeds 100.
    pub fn new(percentages: [u8; 6]) -> Result<Self> {
        let table = Self { percentages };
        table.validate()?;
        Ok(table)
    }

    /// Checks every percentage is within `0..=100`.
    ///
    /// # Errors
    /// Returns `Error::Config` naming the first offending tier.
    pub fn validate(&self) -> Result<()> {
        for rating in Rating::ALL {
            let percentage = self.percentage(rating);
            if percentage > 100 {
                return Err(Error::Config {
                    message: format!(
                        "discount for {rating:?} is {percentage}%, must be between 0 and 100"
                    ),
                });
            }
        }
        Ok(())
    }

    /// Whole-number percentage for a tier.
    #[must_use]
    pub fn percentage(&self, rating: Rating) -> u8 {
        self.percentages[usize::from(rating.ordinal())]
    }

    /// Discount rate for a tier as a fraction, e.g. `0.10`.
    #[must_use]
    pub fn rate(&self, rating: Rating) -> Decimal {
        Decimal::new(i64::from(self.percentage(rating)), 2)
    }

    /// `price × rate`, rounded half-up to two decimal places.
    #[must_use]
    pub fn apply(&self, price: Decimal, rating: Rating) -> Decimal {
        (price * self.rate(rating)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}
