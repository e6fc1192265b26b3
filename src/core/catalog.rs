//! Catalog business logic - The concurrent product ↔ review store.
//!
//! Entries are indexed by the stable product id. Re-rating a product replaces
//! the `product` field of its entry in place, so the review list never moves
//! and there is no remove-then-insert window.
//!
//! All state sits behind one `tokio::sync::RwLock`. Queries share it; creating a
//! product, reviewing one and taking a snapshot hold it exclusively for their
//! whole read-modify-write sequence. The lock is never taken re-entrantly.

use crate::{
    config::DiscountTable,
    core::locale::Locale,
    entities::{Product, ProductId, Rating, Review, apply_rating},
    errors::{Error, Result},
};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};

/// A product together with its review history, oldest review first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Current product value
    pub product: Product,
    /// Reviews in submission order
    pub reviews: Vec<Review>,
}

impl CatalogEntry {
    /// A freshly created entry with no reviews.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            reviews: Vec::new(),
        }
    }
}

pub(crate) type Entries = HashMap<ProductId, CatalogEntry>;

/// Shared handle to the catalog. Cloning is cheap and every clone sees the same
/// entries.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Arc<RwLock<Entries>>,
    discounts: DiscountTable,
}

impl Catalog {
    /// An empty catalog using `discounts` for every discount calculation.
    #[must_use]
    pub fn new(discounts: DiscountTable) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            discounts,
        }
    }

    /// Builds a catalog from pre-existing entries. When two entries share an id
    /// the first one wins.
    pub fn from_entries<I>(discounts: DiscountTable, entries: I) -> Self
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let mut map = HashMap::new();
        for entry in entries {
            let id = entry.product.id();
            if map.contains_key(&id) {
                warn!("Duplicate entry for product {}, keeping the first one", id);
                continue;
            }
            map.insert(id, entry);
        }
        Self {
            entries: Arc::new(RwLock::new(map)),
            discounts,
        }
    }

    /// The discount table this catalog prices with.
    #[must_use]
    pub const fn discount_table(&self) -> &DiscountTable {
        &self.discounts
    }

    /// Adds a product unless one with the same id already exists.
    ///
    /// A `best_before` date makes the product perishable. On a duplicate id the
    /// stored product is returned unchanged and its reviews are left alone.
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        id: ProductId,
        name: &str,
        price: Decimal,
        rating: Rating,
        best_before: Option<NaiveDate>,
    ) -> Product {
        let mut entries = self.entries.write().await;

        if let Some(existing) = entries.get(&id) {
            debug!("Product {} already exists, leaving it untouched", id);
            return existing.product.clone();
        }

        let product = Product::new(id, name, price, rating, best_before);
        entries.insert(id, CatalogEntry::new(product.clone()));
        info!("Added new product '{}' (ID: {}) with price {}", name, id, price);
        product
    }

    /// Returns the current product for `id`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no product has that id.
    pub async fn find_product(&self, id: ProductId) -> Result<Product> {
        self.entries
            .read()
            .await
            .get(&id)
            .map(|entry| entry.product.clone())
            .ok_or(Error::NotFound { id })
    }

    /// Returns the review history of `id` in submission order.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no product has that id.
    pub async fn reviews(&self, id: ProductId) -> Result<Vec<Review>> {
        self.entries
            .read()
            .await
            .get(&id)
            .map(|entry| entry.reviews.clone())
            .ok_or(Error::NotFound { id })
    }

    /// Product and reviews of `id`, read together under one lock acquisition.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no product has that id.
    pub async fn entry(&self, id: ProductId) -> Result<CatalogEntry> {
        self.entries
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { id })
    }

    /// Records a review and re-rates the product.
    ///
    /// Lookup, append, aggregate recomputation and product replacement all
    /// happen under a single exclusive lock, so readers see either the old entry
    /// or the new one and concurrent reviews are never lost.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no product has that id; nothing is recorded.
    #[instrument(skip(self, comments))]
    pub async fn review_product(
        &self,
        id: ProductId,
        rating: Rating,
        comments: &str,
    ) -> Result<Product> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&id).ok_or_else(|| {
            info!("Review rejected, product {} not found", id);
            Error::NotFound { id }
        })?;

        entry.reviews.push(Review::new(rating, comments));
        let aggregate = Rating::average(entry.reviews.iter().map(Review::rating));
        entry.product = apply_rating(&entry.product, aggregate);

        debug!(
            "Product {} now has {} reviews, rated {:?}",
            id,
            entry.reviews.len(),
            aggregate
        );
        Ok(entry.product.clone())
    }

    /// Discount totals per rating tier as of `today`.
    ///
    /// Only tiers with at least one product appear.
    pub async fn discount_totals_on(&self, today: NaiveDate) -> BTreeMap<Rating, Decimal> {
        let entries = self.entries.read().await;
        let mut totals = BTreeMap::new();
        for entry in entries.values() {
            let product = &entry.product;
            *totals.entry(product.rating()).or_insert(Decimal::ZERO) +=
                product.discount(&self.discounts, today);
        }
        totals
    }

    /// Star label → locale-formatted discount total, as of `today`.
    pub async fn discounts_on(&self, today: NaiveDate, locale: Locale) -> BTreeMap<String, String> {
        self.discount_totals_on(today)
            .await
            .into_iter()
            .map(|(rating, total)| (rating.stars().to_string(), locale.format_money(total)))
            .collect()
    }

    /// Star label → locale-formatted discount total, as of the local date.
    pub async fn discounts(&self, locale: Locale) -> BTreeMap<String, String> {
        self.discounts_on(Local::now().date_naive(), locale).await
    }

    /// Products accepted by `filter`, sorted by `comparator`.
    ///
    /// The matching products are copied out under the shared lock; the returned
    /// one-shot iterator does not hold it.
    pub async fn list_products<F, C>(
        &self,
        filter: F,
        comparator: C,
    ) -> std::vec::IntoIter<Product>
    where
        F: Fn(&Product) -> bool,
        C: Fn(&Product, &Product) -> Ordering,
    {
        let mut products: Vec<Product> = {
            let entries = self.entries.read().await;
            entries
                .values()
                .map(|entry| &entry.product)
                .filter(|product| filter(product))
                .cloned()
                .collect()
        };
        products.sort_by(|a, b| comparator(a, b));
        products.into_iter()
    }

    /// Every product, sorted by `comparator`.
    pub async fn all_products<C>(&self, comparator: C) -> std::vec::IntoIter<Product>
    where
        C: Fn(&Product, &Product) -> Ordering,
    {
        self.list_products(|_: &Product| true, comparator).await
    }

    /// Point-in-time copy of every entry, ordered by product id.
    pub async fn entries(&self) -> Vec<CatalogEntry> {
        let entries = self.entries.read().await;
        let mut copy: Vec<CatalogEntry> = entries.values().cloned().collect();
        copy.sort_by_key(|entry| entry.product.id());
        copy
    }

    /// Number of products in the catalog.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the catalog has no products.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Exclusive access for operations that must serialize with every mutation.
    pub(crate) async fn lock_exclusive(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().await
    }
}
