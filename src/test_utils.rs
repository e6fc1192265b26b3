//! Shared test utilities for `shelf-keeper`.
//!
//! This module provides common helpers for building catalogs and fixture
//! directories with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{config::DiscountTable, core::Catalog, entities::Rating};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::{path::Path, str::FromStr};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer tracing subscriber once per test binary.
/// Honors `RUST_LOG`, defaulting to `debug`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Parses a decimal literal such as `"1.99"`.
pub fn price(text: &str) -> Decimal {
    Decimal::from_str(text).unwrap()
}

/// Fixed "today" so date-dependent tests do not depend on the clock.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

/// A catalog holding only product 101, "Tea", 1.99, not rated.
pub async fn catalog_with_tea() -> Catalog {
    let catalog = Catalog::new(DiscountTable::default());
    catalog
        .create_product(101, "Tea", price("1.99"), Rating::NotRated, None)
        .await;
    catalog
}

/// Sets up a catalog with five products of mixed kinds and ratings.
///
/// | id  | name      | price | rating | best before   |
/// |-----|-----------|-------|--------|---------------|
/// | 101 | Tea       | 1.99  | 4      | -             |
/// | 102 | Coffee    | 2.49  | 4      | -             |
/// | 103 | Cake      | 3.99  | 5      | `test_date()` |
/// | 104 | Chocolate | 2.99  | 3      | -             |
/// | 105 | Cookie    | 3.99  | 2      | `test_date()` |
pub async fn sample_catalog() -> Catalog {
    let catalog = Catalog::new(DiscountTable::default());
    catalog
        .create_product(101, "Tea", price("1.99"), Rating::FourStar, None)
        .await;
    catalog
        .create_product(102, "Coffee", price("2.49"), Rating::FourStar, None)
        .await;
    catalog
        .create_product(103, "Cake", price("3.99"), Rating::FiveStar, Some(test_date()))
        .await;
    catalog
        .create_product(104, "Chocolate", price("2.99"), Rating::ThreeStar, None)
        .await;
    catalog
        .create_product(105, "Cookie", price("3.99"), Rating::TwoStar, Some(test_date()))
        .await;
    catalog
}

/// Writes `contents` to `dir/name`, creating `dir` if needed.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), contents).unwrap();
}
