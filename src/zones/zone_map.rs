use std::{
    collections::BTreeMap,
    fs, io,
    ops::Deref,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use serde::{Deserialize, Serialize, Serializer};

pub const ZONE_MAP_FILE: &str = "hub_to_zone.json";

#[derive(thiserror::Error, Debug)]
pub enum ZoneMapError {
    #[error("failed to access zone map {1:?}")]
    Io(#[source] io::Error, PathBuf),
    #[error("malformed zone map {1:?}")]
    Json(#[source] serde_json::Error, PathBuf),
    #[error("no zone codes left for {0} new hubs")]
    Exhausted(usize),
}
type Result<T> = std::result::Result<T, ZoneMapError>;

/// Append-only map from hub label to zone code
///
/// Codes are never reused: a new hub always gets a code greater than every
/// code already in the map.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ZoneMap(BTreeMap<String, u32>);
impl Deref for ZoneMap {
    type Target = BTreeMap<String, u32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl Serialize for ZoneMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().sorted_by_key(|(_, code)| **code))
    }
}
impl ZoneMap {
    /// Loads the map, or an empty one if `path` does not exist
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("{:?} not found, starting a new zone map", path);
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| ZoneMapError::Io(e, path.into()))?;
        let this: Self =
            serde_json::from_str(&contents).map_err(|e| ZoneMapError::Json(e, path.into()))?;
        log::info!("{} zones loaded from {:?}", this.len(), path);
        Ok(this)
    }
    /// Writes the map as pretty JSON, hubs in code order
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ZoneMapError::Io(e, parent.into()))?;
        }
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| ZoneMapError::Json(e, path.into()))?;
        fs::write(path, contents).map_err(|e| ZoneMapError::Io(e, path.into()))
    }
    /// The code the next new hub will receive
    pub fn next_code(&self) -> Result<u32> {
        match self.0.values().max() {
            Some(&code) => code.checked_add(1).ok_or(ZoneMapError::Exhausted(1)),
            None => Ok(0),
        }
    }
    pub fn code(&self, hub: &str) -> Option<u32> {
        self.0.get(hub).copied()
    }
    /// Gives a code to every hub not in the map yet
    ///
    /// New hubs are taken in sorted order so a batch always receives the same
    /// codes. Returns the newly allocated `(hub, code)` pairs. The map is left
    /// untouched if the codes would run past `u32::MAX`.
    pub fn allocate<I, S>(&mut self, hubs: I) -> Result<Vec<(String, u32)>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let new_hubs: Vec<String> = hubs
            .into_iter()
            .map(|hub| hub.as_ref().to_string())
            .filter(|hub| !self.0.contains_key(hub))
            .sorted()
            .dedup()
            .collect();
        if new_hubs.is_empty() {
            return Ok(Vec::new());
        }
        let n_new = new_hubs.len();
        let first = self
            .next_code()
            .map_err(|_| ZoneMapError::Exhausted(n_new))?;
        let last = u32::try_from(n_new - 1)
            .ok()
            .and_then(|n| first.checked_add(n))
            .ok_or(ZoneMapError::Exhausted(n_new))?;
        let allocated: Vec<(String, u32)> = new_hubs.into_iter().zip(first..=last).collect();
        self.0.extend(allocated.iter().cloned());
        Ok(allocated)
    }
}
