//! Application configuration loading from config.toml
//!
//! Every setting has a default, so an empty or missing config file yields a
//! working catalog rooted in the current directory.

use crate::{
    config::DiscountTable,
    entities::ProductId,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Suffix of every report file name.
pub const REPORT_FILE_SUFFIX: &str = "_report.txt";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Folders and file naming used by the persistence pipeline
    pub catalog: CatalogSettings,
    /// Discount percentage per rating tier
    pub discounts: DiscountTable,
}

/// Where the catalog reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Directory holding product and review record files for bulk load
    pub data_dir: PathBuf,
    /// Directory that product reports are written to
    pub reports_dir: PathBuf,
    /// Staging directory for snapshot files
    pub staging_dir: PathBuf,
    /// File name prefix identifying product record files
    pub product_file_prefix: String,
    /// File name prefix for review history files, followed by the product id
    pub reviews_file_prefix: String,
    /// Extension of finished snapshot files
    pub snapshot_extension: String,
    /// Locale tag used when a caller does not ask for one
    pub default_locale: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            reports_dir: PathBuf::from("reports"),
            staging_dir: PathBuf::from("temp"),
            product_file_prefix: "product".to_string(),
            reviews_file_prefix: "reviews".to_string(),
            snapshot_extension: "tmp".to_string(),
            default_locale: "en-GB".to_string(),
        }
    }
}

impl CatalogSettings {
    /// Settings with all three folders placed under `root`.
    #[must_use]
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            data_dir: root.join("data"),
            reports_dir: root.join("reports"),
            staging_dir: root.join("temp"),
            ..Self::default()
        }
    }

    /// File name of the record file for product `id`.
    #[must_use]
    pub fn product_file_name(&self, id: ProductId) -> String {
        format!("{}{id}.txt", self.product_file_prefix)
    }

    /// File name of the review history for product `id`.
    #[must_use]
    pub fn reviews_file_name(&self, id: ProductId) -> String {
        format!("{}{id}.txt", self.reviews_file_prefix)
    }

    /// File name of the report on product `id` produced for `client`.
    #[must_use]
    pub fn report_file_name(id: ProductId, client: &str) -> String {
        format!("product{id}_{client}{REPORT_FILE_SUFFIX}")
    }
}

/// Parses configuration from TOML text and validates it.
///
/// # Errors
/// Returns `Error::Config` if the TOML is invalid or the discount table is out of range.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.discounts.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The discount table is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `path`, using defaults when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_config(path_ref)
    } else {
        info!(
            "No configuration at {}, using defaults.",
            path_ref.display()
        );
        Ok(AppConfig::default())
    }
}
