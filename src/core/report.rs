//! Report generation business logic.
//!
//! Reports are built from a consistent copy of one catalog entry and rendered
//! for a locale after the catalog lock is released. Writing a report to disk is
//! plain I/O outside the lock as well.

use crate::{
    config::CatalogSettings,
    core::{Catalog, locale::Locale},
    entities::{Product, ProductId, Review, review},
    errors::Result,
};
use chrono::NaiveDate;
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// A product and its reviews, ready for rendering.
#[derive(Debug, Clone)]
pub struct ProductReport {
    /// The product being reported on
    pub product: Product,
    /// Reviews, best rating first, ties in submission order
    pub reviews: Vec<Review>,
}

impl ProductReport {
    /// Renders the report: the product line, then one line per review or the
    /// locale's "no reviews" placeholder. Every line ends with a newline.
    #[must_use]
    pub fn render(&self, locale: Locale, today: NaiveDate) -> String {
        let mut text = locale.format_product(&self.product, today);
        text.push('\n');

        if self.reviews.is_empty() {
            text.push_str(locale.no_reviews());
            text.push('\n');
        } else {
            for review in &self.reviews {
                text.push_str(&locale.format_review(review));
                text.push('\n');
            }
        }
        text
    }
}

/// Generates the report for product `id`.
///
/// # Errors
/// Returns `Error::NotFound` if no product has that id.
pub async fn generate_product_report(catalog: &Catalog, id: ProductId) -> Result<ProductReport> {
    let entry = catalog.entry(id).await?;
    let mut reviews = entry.reviews;
    review::sort_for_display(&mut reviews);
    Ok(ProductReport {
        product: entry.product,
        reviews,
    })
}

/// Renders the report for product `id` in `locale`.
///
/// # Errors
/// Returns `Error::NotFound` if no product has that id.
pub async fn product_report(
    catalog: &Catalog,
    id: ProductId,
    locale: Locale,
    today: NaiveDate,
) -> Result<String> {
    Ok(generate_product_report(catalog, id)
        .await?
        .render(locale, today))
}

/// Writes the report for product `id` requested by `client` into `reports_dir`
/// and returns the file path. The directory is created if needed and an
/// existing report for the same product and client is replaced.
///
/// # Errors
/// Returns `Error::NotFound` if no product has that id and `Error::Io` if the
/// report cannot be written.
#[instrument(skip(catalog, reports_dir))]
pub async fn write_product_report(
    catalog: &Catalog,
    id: ProductId,
    locale: Locale,
    client: &str,
    reports_dir: &Path,
    today: NaiveDate,
) -> Result<PathBuf> {
    let text = product_report(catalog, id, locale, today).await?;

    tokio::fs::create_dir_all(reports_dir).await?;
    let path = reports_dir.join(CatalogSettings::report_file_name(id, client));
    tokio::fs::write(&path, text).await?;

    info!("Report for product {} written to {}", id, path.display());
    Ok(path)
}

/// Renders one product line per matching product, in `comparator` order.
pub async fn render_products<F, C>(
    catalog: &Catalog,
    filter: F,
    comparator: C,
    locale: Locale,
    today: NaiveDate,
) -> String
where
    F: Fn(&Product) -> bool,
    C: Fn(&Product, &Product) -> Ordering,
{
    catalog
        .list_products(filter, comparator)
        .await
        .map(|product| locale.format_product(&product, today) + "\n")
        .collect()
}
