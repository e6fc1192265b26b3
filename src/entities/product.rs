//! Product entity - One immutable catalog item.
//!
//! Products come in two kinds that differ only in discount eligibility and the
//! best-before date they carry. A product never changes after construction; a
//! new rating produces a new value with the same id via [`apply_rating`].
//! Equality and hashing look at the id alone, so two values with the same id are
//! the same catalog entry whatever their other fields say.

use crate::{config::DiscountTable, entities::Rating};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Stable product identifier.
pub type ProductId = i32;

/// Variant data distinguishing perishable from non-perishable goods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductKind {
    /// Goods with a best-before date; discounted only on that exact day
    Perishable {
        /// Last day the product is good
        best_before: NaiveDate,
    },
    /// Goods without an expiry; always discount-eligible
    NonPerishable,
}

/// A catalog item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    #[serde(with = "rust_decimal::serde::str")]
    price: Decimal,
    rating: Rating,
    kind: ProductKind,
}

impl Product {
    /// Builds a perishable product when `best_before` is given, otherwise a
    /// non-perishable one.
    #[must_use]
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        rating: Rating,
        best_before: Option<NaiveDate>,
    ) -> Self {
        let kind = best_before.map_or(ProductKind::NonPerishable, |best_before| {
            ProductKind::Perishable { best_before }
        });
        Self {
            id,
            name: name.into(),
            price,
            rating,
            kind,
        }
    }

    /// Builds a perishable product.
    #[must_use]
    pub fn perishable(
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        rating: Rating,
        best_before: NaiveDate,
    ) -> Self {
        Self::new(id, name, price, rating, Some(best_before))
    }

    /// Builds a non-perishable product.
    #[must_use]
    pub fn non_perishable(
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        rating: Rating,
    ) -> Self {
        Self::new(id, name, price, rating, None)
    }

    /// Stable product id.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// List price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Current aggregate rating.
    #[must_use]
    pub const fn rating(&self) -> Rating {
        self.rating
    }

    /// Perishable or not.
    #[must_use]
    pub const fn kind(&self) -> ProductKind {
        self.kind
    }

    /// Best-before date, present only for perishable products.
    #[must_use]
    pub const fn best_before(&self) -> Option<NaiveDate> {
        match self.kind {
            ProductKind::Perishable { best_before } => Some(best_before),
            ProductKind::NonPerishable => None,
        }
    }

    /// Whether the product has a best-before date.
    #[must_use]
    pub const fn is_perishable(&self) -> bool {
        matches!(self.kind, ProductKind::Perishable { .. })
    }

    /// Discount this product earns on `today` under `table`.
    ///
    /// Perishable products are only eligible on their best-before day itself.
    #[must_use]
    pub fn discount(&self, table: &DiscountTable, today: NaiveDate) -> Decimal {
        match self.kind {
            ProductKind::Perishable { best_before } if best_before != today => Decimal::ZERO,
            ProductKind::Perishable { .. } | ProductKind::NonPerishable => {
                table.apply(self.price, self.rating)
            }
        }
    }

    /// Field-by-field comparison, unlike `==` which only looks at the id.
    #[must_use]
    pub fn same_values(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.price == other.price
            && self.rating == other.rating
            && self.kind == other.kind
    }
}

/// Returns a copy of `product` carrying `rating`; id, name, price and kind are kept.
#[must_use]
pub fn apply_rating(product: &Product, rating: Rating) -> Product {
    Product {
        rating,
        ..product.clone()
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.id, self.name, self.price, self.rating)?;
        if let ProductKind::Perishable { best_before } = self.kind {
            write!(f, ", best before {best_before}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::Days;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn price(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_new_picks_kind_from_best_before() {
        let tea = Product::new(101, "Tea", price("1.99"), Rating::NotRated, None);
        assert!(!tea.is_perishable());
        assert_eq!(tea.best_before(), None);

        let cake = Product::new(103, "Cake", price("3.99"), Rating::FiveStar, Some(today()));
        assert!(cake.is_perishable());
        assert_eq!(cake.best_before(), Some(today()));
    }

    #[test]
    fn test_identity_is_the_id() {
        let drink = Product::non_perishable(104, "Chocolate", price("2.99"), Rating::FiveStar);
        let food = Product::perishable(104, "Chocolate", price("3.49"), Rating::OneStar, today());
        assert_eq!(drink, food);
        assert!(!drink.same_values(&food));

        let set: HashSet<Product> = [drink, food].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_apply_rating_keeps_everything_else() {
        let cake = Product::perishable(103, "Cake", price("3.99"), Rating::FiveStar, today());
        let rerated = apply_rating(&cake, Rating::ThreeStar);

        assert_eq!(rerated.rating(), Rating::ThreeStar);
        assert_eq!(rerated.id(), 103);
        assert_eq!(rerated.name(), "Cake");
        assert_eq!(rerated.price(), price("3.99"));
        assert_eq!(rerated.best_before(), Some(today()));
        // The input product is untouched
        assert_eq!(cake.rating(), Rating::FiveStar);
    }

    #[test]
    fn test_non_perishable_discount_follows_table() {
        let table = DiscountTable::default();
        let coffee = Product::non_perishable(102, "Coffee", price("1.99"), Rating::FourStar);
        assert_eq!(coffee.discount(&table, today()), price("0.20"));

        let tea = Product::non_perishable(101, "Tea", price("1.99"), Rating::TwoStar);
        assert_eq!(tea.discount(&table, today()), Decimal::ZERO);
    }

    #[test]
    fn test_perishable_discount_only_on_best_before_day() {
        let table = DiscountTable::default();
        let yesterday = today().checked_sub_days(Days::new(1)).unwrap();
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();

        let cookie = |best_before| {
            Product::perishable(105, "Cookie", price("3.99"), Rating::FiveStar, best_before)
        };

        assert_eq!(cookie(today()).discount(&table, today()), price("0.40"));
        assert_eq!(cookie(yesterday).discount(&table, today()), Decimal::ZERO);
        assert_eq!(cookie(tomorrow).discount(&table, today()), Decimal::ZERO);
    }

    #[test]
    fn test_display() {
        let cake = Product::perishable(103, "Cake", price("3.99"), Rating::FiveStar, today());
        assert_eq!(cake.to_string(), "103, Cake, 3.99, ★★★★★, best before 2024-03-15");
    }
}
