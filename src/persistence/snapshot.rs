//! Snapshot dump and restore for crash recovery.
//!
//! A snapshot is a whole-catalog binary capture written to the staging
//! directory as `<millis>.<ext>`. Stamps only ever increase within a staging
//! directory, so the newest snapshot is the one with the largest stamp.
//!
//! Writing goes to `<millis>.partial` first and is renamed into place only once
//! the bytes are synced. Restoring consumes the snapshot: the file that was
//! loaded, and any older one it supersedes, is deleted.

use crate::{
    config::{CatalogSettings, DiscountTable},
    core::{Catalog, CatalogEntry},
    errors::{Error, Result},
};
use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, error, info, instrument, warn};

const MAGIC: &[u8; 8] = b"SHELFSNP";
const PARTIAL_EXTENSION: &str = "partial";

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    taken_at: DateTime<Utc>,
    entries: Vec<CatalogEntry>,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
}

/// Captures the whole catalog into a new snapshot file and returns its path.
///
/// The catalog is locked exclusively for the duration, so the capture reflects
/// every entry either fully before or fully after any concurrent review.
///
/// # Errors
/// Returns `Error::Io` or `Error::Snapshot` on failure; no snapshot or partial
/// file is left behind in that case.
#[instrument(skip_all, fields(staging_dir = %settings.staging_dir.display()))]
pub async fn snapshot(catalog: &Catalog, settings: &CatalogSettings) -> Result<PathBuf> {
    let staging = &settings.staging_dir;
    let extension = settings.snapshot_extension.as_str();

    let entries = catalog.lock_exclusive().await;

    let mut captured: Vec<CatalogEntry> = entries.values().cloned().collect();
    captured.sort_by_key(|entry| entry.product.id());
    let file = SnapshotFile {
        taken_at: Utc::now(),
        entries: captured,
    };
    let mut bytes = MAGIC.to_vec();
    codec().serialize_into(&mut bytes, &file)?;

    fs::create_dir_all(staging).await?;
    sweep_partials(staging).await;
    let stamp = next_stamp(staging, extension).await?;
    let path = write_atomically(staging, stamp, extension, &bytes).await?;
    sync_dir(staging).await;
    drop(entries);

    info!(
        "Snapshot of {} products written to {}",
        file.entries.len(),
        path.display()
    );
    Ok(path)
}

/// Loads the newest readable snapshot in the staging directory into a new
/// catalog, then deletes it along with any older snapshots.
///
/// Snapshots that cannot be decoded are logged and skipped.
///
/// # Errors
/// Returns `Error::NoSnapshotAvailable` if the staging directory is missing,
/// unreadable, or holds no decodable snapshot.
#[instrument(skip_all, fields(staging_dir = %settings.staging_dir.display()))]
pub async fn restore(settings: &CatalogSettings, discounts: DiscountTable) -> Result<Catalog> {
    let staging = &settings.staging_dir;
    let unavailable = || Error::NoSnapshotAvailable {
        dir: staging.clone(),
    };

    let candidates = match list_snapshots(staging, &settings.snapshot_extension).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Cannot read staging directory: {}", e);
            return Err(unavailable());
        }
    };

    for (position, (_, path)) in candidates.iter().enumerate() {
        let file = match read_snapshot(path).await {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping unreadable snapshot {}: {}", path.display(), e);
                continue;
            }
        };

        for (_, consumed) in &candidates[position..] {
            if let Err(e) = fs::remove_file(consumed).await {
                warn!("Could not delete snapshot {}: {}", consumed.display(), e);
            }
        }

        info!(
            "Restored {} products from snapshot {} taken at {}",
            file.entries.len(),
            path.display(),
            file.taken_at
        );
        return Ok(Catalog::from_entries(discounts, file.entries));
    }

    Err(unavailable())
}

async fn read_snapshot(path: &Path) -> Result<SnapshotFile> {
    let bytes = fs::read(path).await?;
    let body = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| Error::Snapshot {
            message: format!("{} is not a snapshot file", path.display()),
        })?;
    let limit = u64::try_from(body.len()).unwrap_or(u64::MAX);
    Ok(codec().with_limit(limit).deserialize(body)?)
}

/// Snapshot files in `staging`, newest first.
async fn list_snapshots(staging: &Path, extension: &str) -> Result<Vec<(i64, PathBuf)>> {
    let mut listing = fs::read_dir(staging).await?;
    let mut snapshots = Vec::new();
    while let Some(item) = listing.next_entry().await? {
        let path = item.path();
        if let Some(stamp) = stamp_of(&path, extension) {
            snapshots.push((stamp, path));
        }
    }
    snapshots.sort_by(|a, b| b.cmp(a));
    Ok(snapshots)
}

fn stamp_of(path: &Path, extension: &str) -> Option<i64> {
    if path.extension()?.to_str()? != extension {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

/// The current time in milliseconds, bumped past every stamp already used in
/// `staging` (finished or partial).
async fn next_stamp(staging: &Path, extension: &str) -> Result<i64> {
    let mut latest = None;
    let mut listing = fs::read_dir(staging).await?;
    while let Some(item) = listing.next_entry().await? {
        let path = item.path();
        let stamp = stamp_of(&path, extension).or_else(|| stamp_of(&path, PARTIAL_EXTENSION));
        latest = latest.max(stamp);
    }

    let now = Utc::now().timestamp_millis();
    Ok(latest.map_or(now, |latest: i64| now.max(latest + 1)))
}

/// Deletes `*.partial` files left behind by a write that never finished.
/// Snapshots are serialized by the catalog lock, so none of them is in flight.
async fn sweep_partials(staging: &Path) {
    let Ok(mut listing) = fs::read_dir(staging).await else {
        return;
    };
    while let Ok(Some(item)) = listing.next_entry().await {
        let path = item.path();
        if path.extension().is_some_and(|ext| ext == PARTIAL_EXTENSION) {
            match fs::remove_file(&path).await {
                Ok(()) => info!("Removed unfinished snapshot {}", path.display()),
                Err(e) => warn!("Could not remove {}: {}", path.display(), e),
            }
        }
    }
}

/// Flushes the directory entry of a completed rename. Failure leaves the
/// snapshot readable, so it is only logged.
async fn sync_dir(dir: &Path) {
    let synced = async { fs::File::open(dir).await?.sync_all().await }.await;
    if let Err(e) = synced {
        debug!("Could not sync directory {}: {}", dir.display(), e);
    }
}

/// Writes `bytes` to `<stamp>.partial`, syncs, and renames it to
/// `<stamp>.<extension>`. The partial file is removed if any step fails.
async fn write_atomically(
    staging: &Path,
    stamp: i64,
    extension: &str,
    bytes: &[u8],
) -> Result<PathBuf> {
    let partial = staging.join(format!("{stamp}.{PARTIAL_EXTENSION}"));
    let finished = staging.join(format!("{stamp}.{extension}"));

    let written = async {
        let mut out = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&partial)
            .await?;
        out.write_all(bytes).await?;
        out.sync_all().await?;
        drop(out);
        fs::rename(&partial, &finished).await
    }
    .await;

    if let Err(e) = written {
        error!("Snapshot write to {} failed: {}", partial.display(), e);
        if let Err(cleanup) = fs::remove_file(&partial).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not remove {}: {}", partial.display(), cleanup);
            }
        }
        return Err(e.into());
    }
    Ok(finished)
}
