/// Discount percentage per rating tier
pub mod discounts;

/// Folder layout, file naming and config.toml loading
pub mod settings;

pub use discounts::DiscountTable;
pub use settings::{
    AppConfig, CatalogSettings, REPORT_FILE_SUFFIX, load_config, load_config_or_default, parse_config,
};
