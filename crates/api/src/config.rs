//! Runtime configuration, read once from the environment at startup.

use std::path::PathBuf;

pub const INVENTORY_FILE_ENV: &str = "GEARCAGE_INVENTORY_FILE";
pub const BIND_ADDR_ENV: &str = "GEARCAGE_BIND_ADDR";

pub const DEFAULT_INVENTORY_FILE: &str = "gear_inventory.csv";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5001";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub inventory_file: PathBuf,
    pub bind_addr: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());

        let inventory_file = non_empty(INVENTORY_FILE_ENV).unwrap_or_else(|| {
            tracing::warn!("{INVENTORY_FILE_ENV} not set; using {DEFAULT_INVENTORY_FILE}");
            DEFAULT_INVENTORY_FILE.to_string()
        });

        Self {
            inventory_file: PathBuf::from(inventory_file),
            bind_addr: non_empty(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
