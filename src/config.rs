//! Default locations of the datasets

use std::{env, path::PathBuf};

/// Env var overriding the data directory
pub const DATA_DIR_VAR: &str = "TAXI_DATA_DIR";

pub const PROCESSED_FILE: &str = "tamilnadu_taxi_demand.csv";
pub const RAW_FILE: &str = "tamilnadu_taxi_raw.csv";
pub const PROCESSED_FROM_RAW_FILE: &str = "tamilnadu_taxi_demand_from_raw.csv";

pub const DEFAULT_TARGET_CITIES: [&str; 3] = ["Erode", "Chennai", "Salem"];

/// Directory holding the datasets, hub lists and the zone map
///
/// Read from `TAXI_DATA_DIR`, `data` otherwise.
pub fn data_dir() -> PathBuf {
    env::var_os(DATA_DIR_VAR)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"))
}
