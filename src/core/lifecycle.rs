//! Catalog startup and shutdown.
//!
//! Startup prefers the newest snapshot, falls back to the record files in the
//! data directory, and finally to an empty catalog. Shutdown takes a snapshot
//! so the next start can pick up where this one left off.

use crate::{
    config::AppConfig,
    core::Catalog,
    errors::{Error, Result},
    persistence::{loader, snapshot},
};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Where an opened catalog's contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// Restored from a snapshot in the staging directory
    Snapshot,
    /// Bulk loaded from the data directory
    DataFiles,
    /// Neither was available
    Empty,
}

/// Opens the catalog described by `config`.
///
/// # Errors
/// Only errors other than "no snapshot" and "data directory unreadable" are
/// returned; those two fall through to the next source.
#[instrument(skip_all)]
pub async fn open_catalog(config: &AppConfig) -> Result<(Catalog, CatalogSource)> {
    match snapshot::restore(&config.catalog, config.discounts).await {
        Ok(catalog) => return Ok((catalog, CatalogSource::Snapshot)),
        Err(Error::NoSnapshotAvailable { .. }) => {
            info!("No snapshot to restore, loading data files");
        }
        Err(e) => return Err(e),
    }

    match loader::bulk_load(&config.catalog, config.discounts).await {
        Ok(catalog) => Ok((catalog, CatalogSource::DataFiles)),
        Err(Error::Io(e)) => {
            warn!(
                "Data directory {} unavailable ({}), starting with an empty catalog",
                config.catalog.data_dir.display(),
                e
            );
            Ok((Catalog::new(config.discounts), CatalogSource::Empty))
        }
        Err(e) => Err(e),
    }
}

/// Snapshots the catalog for the next start and returns the snapshot path.
///
/// # Errors
/// Returns the snapshot failure; the catalog itself is unaffected.
pub async fn flush_catalog(catalog: &Catalog, config: &AppConfig) -> Result<PathBuf> {
    let path = snapshot::snapshot(catalog, &config.catalog).await?;
    info!("Catalog flushed to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogSettings;
    use crate::entities::Rating;
    use crate::test_utils::*;

    fn config_in(root: &std::path::Path) -> AppConfig {
        AppConfig {
            catalog: CatalogSettings::rooted_at(root),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_open_without_anything_is_empty() -> Result<()> {
        init_test_tracing();
        let root = tempfile::tempdir()?;
        let (catalog, source) = open_catalog(&config_in(root.path())).await?;
        assert_eq!(source, CatalogSource::Empty);
        assert!(catalog.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_open_falls_back_to_data_files() -> Result<()> {
        let root = tempfile::tempdir()?;
        let config = config_in(root.path());
        write_fixture(&config.catalog.data_dir, "product101.txt", "D,101,Tea,1.99,0\n");

        let (catalog, source) = open_catalog(&config).await?;
        assert_eq!(source, CatalogSource::DataFiles);
        assert_eq!(catalog.find_product(101).await?.name(), "Tea");
        Ok(())
    }

    #[tokio::test]
    async fn test_flush_then_open_prefers_snapshot() -> Result<()> {
        init_test_tracing();
        let root = tempfile::tempdir()?;
        let config = config_in(root.path());
        write_fixture(&config.catalog.data_dir, "product101.txt", "D,101,Tea,1.99,0\n");

        let (catalog, _) = open_catalog(&config).await?;
        catalog.review_product(101, Rating::FiveStar, "Perfect tea").await?;
        catalog
            .create_product(102, "Coffee", price("2.49"), Rating::NotRated, None)
            .await;
        flush_catalog(&catalog, &config).await?;

        let (reopened, source) = open_catalog(&config).await?;
        assert_eq!(source, CatalogSource::Snapshot);
        assert_eq!(reopened.len().await, 2);
        assert_eq!(reopened.find_product(101).await?.rating(), Rating::FiveStar);

        // The snapshot was consumed, so the next start reads the data files again
        let (third, source) = open_catalog(&config).await?;
        assert_eq!(source, CatalogSource::DataFiles);
        assert_eq!(third.len().await, 1);
        Ok(())
    }
}
