//! Persistence pipeline - flat record files for bulk load, binary snapshots for
//! crash recovery.

/// Bulk load from (and export to) a directory of record files
pub mod loader;
/// Product and review record codec
pub mod records;
/// Snapshot dump and restore
pub mod snapshot;

pub use loader::{bulk_load, export};
pub use snapshot::{restore, snapshot};
