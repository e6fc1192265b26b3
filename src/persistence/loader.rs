//! Bulk loading of the catalog from a directory of record files.
//!
//! Every file whose name starts with the configured product prefix holds one
//! product record on its first line. The reviews of product `id` live next to it
//! in `<reviews prefix><id>.txt`; a missing review file means no reviews yet.
//! A bad record is logged and skipped, it never aborts the load.

use crate::{
    config::{CatalogSettings, DiscountTable, REPORT_FILE_SUFFIX},
    core::{Catalog, CatalogEntry},
    entities::{Product, Review},
    errors::{Error, Result},
    persistence::records,
};
use std::{io::ErrorKind, path::Path};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Builds a fresh catalog from the records in `settings.data_dir`.
///
/// Product files are read in file name order; if two records share an id the
/// first one is kept.
///
/// # Errors
/// Returns `Error::Io` only if the data directory itself cannot be listed.
/// Individual product or review failures are logged and skipped.
#[instrument(skip_all, fields(data_dir = %settings.data_dir.display()))]
pub async fn bulk_load(settings: &CatalogSettings, discounts: DiscountTable) -> Result<Catalog> {
    let data_dir = &settings.data_dir;
    let mut listing = fs::read_dir(data_dir).await?;

    let mut product_files = Vec::new();
    loop {
        let item = match listing.next_entry().await {
            Ok(Some(item)) => item,
            Ok(None) => break,
            Err(e) => {
                warn!("Stopped listing {} early: {}", data_dir.display(), e);
                break;
            }
        };
        if !is_product_file(&item.file_name().to_string_lossy(), settings) {
            continue;
        }
        match item.file_type().await {
            Ok(file_type) if file_type.is_file() => product_files.push(item.path()),
            Ok(_) => {}
            Err(e) => warn!("Skipping {}: {}", item.path().display(), e),
        }
    }
    product_files.sort();
    debug!("Found {} product files", product_files.len());

    let mut entries = Vec::with_capacity(product_files.len());
    let mut skipped = 0usize;
    for path in product_files {
        let product = match load_product(&path).await {
            Ok(product) => product,
            Err(e) => {
                warn!("Skipping product file {}: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };

        let reviews_path = data_dir.join(settings.reviews_file_name(product.id()));
        match load_reviews(&reviews_path).await {
            Ok(reviews) => entries.push(CatalogEntry { product, reviews }),
            Err(e) => {
                warn!(
                    "Skipping product {}, reviews at {} unreadable: {}",
                    product.id(),
                    reviews_path.display(),
                    e
                );
                skipped += 1;
            }
        }
    }

    let catalog = Catalog::from_entries(discounts, entries);
    info!(
        "Loaded {} products from {} ({} skipped)",
        catalog.len().await,
        data_dir.display(),
        skipped
    );
    Ok(catalog)
}

/// Product record files carry the product prefix. Report files share that
/// prefix and are left out in case reports are written into the data directory.
fn is_product_file(name: &str, settings: &CatalogSettings) -> bool {
    name.starts_with(&settings.product_file_prefix) && !name.ends_with(REPORT_FILE_SUFFIX)
}

/// Reads the product record on the first line of `path`.
///
/// # Errors
/// Returns `Error::Io` if the file cannot be read and `Error::Parse` if it is
/// empty or malformed.
pub async fn load_product(path: &Path) -> Result<Product> {
    let contents = fs::read_to_string(path).await?;
    let line = contents
        .lines()
        .next()
        .ok_or_else(|| Error::parse(format!("{} is empty", path.display())))?;
    records::parse_product(line)
}

/// Reads a review history file. A missing file is an empty history; blank and
/// malformed lines are skipped.
///
/// # Errors
/// Returns `Error::Io` for any read failure other than the file not existing.
pub async fn load_reviews(path: &Path) -> Result<Vec<Review>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let reviews = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match records::parse_review(line) {
            Ok(review) => Some(review),
            Err(e) => {
                warn!("Skipping review {}:{}: {}", path.display(), index + 1, e);
                None
            }
        })
        .collect();
    Ok(reviews)
}

/// Writes every catalog entry back out as record files under `settings.data_dir`,
/// in the layout [`bulk_load`] reads.
///
/// Returns the number of products written.
///
/// # Errors
/// Returns `Error::Parse` if a product or review cannot be encoded and
/// `Error::Io` if a file cannot be written.
#[instrument(skip_all, fields(data_dir = %settings.data_dir.display()))]
pub async fn export(catalog: &Catalog, settings: &CatalogSettings) -> Result<usize> {
    let entries = catalog.entries().await;
    fs::create_dir_all(&settings.data_dir).await?;

    for entry in &entries {
        let id = entry.product.id();
        let product_line = records::format_product(&entry.product)?;
        fs::write(
            settings.data_dir.join(settings.product_file_name(id)),
            format!("{product_line}\n"),
        )
        .await?;

        let mut review_lines = String::new();
        for review in &entry.reviews {
            review_lines.push_str(&records::format_review(review)?);
            review_lines.push('\n');
        }
        fs::write(settings.data_dir.join(settings.reviews_file_name(id)), review_lines).await?;
    }

    info!("Exported {} products", entries.len());
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::Rating;
    use crate::test_utils::*;

    fn settings_in(root: &Path) -> CatalogSettings {
        CatalogSettings::rooted_at(root)
    }

    #[tokio::test]
    async fn test_bulk_load_reads_products_and_reviews() -> Result<()> {
        init_test_tracing();
        let root = tempfile::tempdir()?;
        let settings = settings_in(root.path());
        let data = &settings.data_dir;
        write_fixture(data, "product101.txt", "D,101,Tea,1.99,4\n");
        write_fixture(data, "product103.txt", "F,103,Cake,3.99,5,2024-03-15\n");
        write_fixture(
            data,
            "reviews101.txt",
            "4,Nice hot cup of tea\n2,Rather weak tea\n\n3,Just add some lemon, really\n",
        );

        let catalog = bulk_load(&settings, DiscountTable::default()).await?;

        assert_eq!(catalog.len().await, 2);
        let tea = catalog.entry(101).await?;
        assert_eq!(tea.product.rating(), Rating::FourStar);
        assert_eq!(tea.reviews.len(), 3);
        assert_eq!(tea.reviews[2].comments(), "Just add some lemon, really");

        let cake = catalog.entry(103).await?;
        assert_eq!(cake.product.best_before(), Some(test_date()));
        assert!(cake.reviews.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_load_skips_malformed_records() -> Result<()> {
        init_test_tracing();
        let root = tempfile::tempdir()?;
        let settings = settings_in(root.path());
        let data = &settings.data_dir;
        write_fixture(data, "product101.txt", "D,101,Tea,1.99,4\n");
        write_fixture(data, "product102.txt", "D,102,Coffee,not-a-price,4\n");
        write_fixture(data, "product103.txt", "");
        write_fixture(data, "product104.txt", "Q,104,Mystery,1.00,1\n");
        write_fixture(data, "reviews101.txt", "5,Great\nbogus line\n9,Out of range\n1,Bad\n");
        write_fixture(data, "notes.txt", "D,999,Ignored,1.00,1\n");

        let catalog = bulk_load(&settings, DiscountTable::default()).await?;

        assert_eq!(catalog.len().await, 1);
        let reviews = catalog.reviews(101).await?;
        let comments: Vec<&str> = reviews.iter().map(Review::comments).collect();
        assert_eq!(comments, ["Great", "Bad"]);
        assert!(matches!(catalog.find_product(999).await, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_load_duplicate_ids_keep_first_file() -> Result<()> {
        let root = tempfile::tempdir()?;
        let settings = settings_in(root.path());
        write_fixture(&settings.data_dir, "product-a.txt", "D,7,First,1.00,1\n");
        write_fixture(&settings.data_dir, "product-b.txt", "D,7,Second,2.00,2\n");

        let catalog = bulk_load(&settings, DiscountTable::default()).await?;
        assert_eq!(catalog.find_product(7).await?.name(), "First");
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_load_missing_directory_is_io_error() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings_in(&root.path().join("nowhere"));
        let result = bulk_load(&settings, DiscountTable::default()).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_bulk_load_skips_product_with_unreadable_reviews() -> Result<()> {
        init_test_tracing();
        let root = tempfile::tempdir()?;
        let settings = settings_in(root.path());
        let data = &settings.data_dir;
        write_fixture(data, "product101.txt", "D,101,Tea,1.99,4\n");
        write_fixture(data, "product102.txt", "D,102,Coffee,2.49,4\n");
        // A directory where the review file should be cannot be read as text
        std::fs::create_dir(data.join("reviews101.txt"))?;

        let catalog = bulk_load(&settings, DiscountTable::default()).await?;

        assert_eq!(catalog.len().await, 1);
        assert!(matches!(catalog.find_product(101).await, Err(Error::NotFound { id: 101 })));
        assert_eq!(catalog.find_product(102).await?.name(), "Coffee");
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_load_ignores_directories_and_reports() -> Result<()> {
        init_test_tracing();
        let root = tempfile::tempdir()?;
        let settings = settings_in(root.path());
        let data = &settings.data_dir;
        write_fixture(data, "product101.txt", "D,101,Tea,1.99,4\n");
        write_fixture(&data.join("product-archive"), "product102.txt", "D,102,Coffee,2.49,4\n");
        write_fixture(
            data,
            &CatalogSettings::report_file_name(101, "alice"),
            "Tea £1.99 ★★★★☆ 15/03/2024\n",
        );

        let catalog = bulk_load(&settings, DiscountTable::default()).await?;

        assert_eq!(catalog.len().await, 1);
        assert_eq!(catalog.find_product(101).await?.name(), "Tea");
        Ok(())
    }

    #[test]
    fn test_is_product_file() {
        let settings = CatalogSettings::default();
        assert!(is_product_file("product101.txt", &settings));
        assert!(!is_product_file("reviews101.txt", &settings));
        assert!(!is_product_file("product101_alice_report.txt", &settings));
    }

    #[tokio::test]
    async fn test_load_reviews_missing_file_is_empty() -> Result<()> {
        let root = tempfile::tempdir()?;
        let reviews = load_reviews(&root.path().join("reviews404.txt")).await?;
        assert!(reviews.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_export_then_bulk_load_restores_catalog() -> Result<()> {
        init_test_tracing();
        let catalog = sample_catalog().await;
        catalog.review_product(101, Rating::FiveStar, "Lovely, strong").await?;
        catalog.review_product(101, Rating::ThreeStar, "Fine").await?;

        let root = tempfile::tempdir()?;
        let settings = settings_in(root.path());
        assert_eq!(export(&catalog, &settings).await?, 5);

        let loaded = bulk_load(&settings, DiscountTable::default()).await?;
        let before = catalog.entries().await;
        let after = loaded.entries().await;
        assert_eq!(before.len(), after.len());
        for (old, new) in before.iter().zip(&after) {
            assert!(old.product.same_values(&new.product));
            assert_eq!(old.reviews, new.reviews);
        }
        Ok(())
    }
}
