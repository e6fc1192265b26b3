//! Composable product orderings for listings and reports.
//!
//! ```
//! use shelf_keeper::core::ordering::{ProductComparator, by_price, by_rating};
//!
//! // Best rated first, cheapest first among equals
//! let order = by_rating.reversed().then_by(by_price);
//! # let _ = order;
//! ```

use crate::entities::Product;
use std::cmp::Ordering;

/// Orders by product id.
#[must_use]
pub fn by_id(a: &Product, b: &Product) -> Ordering {
    a.id().cmp(&b.id())
}

/// Orders by product name.
#[must_use]
pub fn by_name(a: &Product, b: &Product) -> Ordering {
    a.name().cmp(b.name())
}

/// Orders by price, cheapest first.
#[must_use]
pub fn by_price(a: &Product, b: &Product) -> Ordering {
    a.price().cmp(&b.price())
}

/// Orders by rating, lowest first.
#[must_use]
pub fn by_rating(a: &Product, b: &Product) -> Ordering {
    a.rating().cmp(&b.rating())
}

/// Combinators available on every product comparison function.
pub trait ProductComparator: Fn(&Product, &Product) -> Ordering + Sized {
    /// Breaks ties of `self` with `next`.
    fn then_by<C>(self, next: C) -> impl Fn(&Product, &Product) -> Ordering
    where
        C: Fn(&Product, &Product) -> Ordering,
    {
        move |a: &Product, b: &Product| self(a, b).then_with(|| next(a, b))
    }

    /// The opposite order.
    fn reversed(self) -> impl Fn(&Product, &Product) -> Ordering {
        move |a: &Product, b: &Product| self(a, b).reverse()
    }
}

impl<F> ProductComparator for F where F: Fn(&Product, &Product) -> Ordering {}
