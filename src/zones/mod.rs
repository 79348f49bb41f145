//! Hourly zone files from the hub-level dataset

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;

use crate::{
    config,
    table::{count_or_zero, Table, TableError},
    timestamp::{parse_hour, TimestampError},
    CITY_NAME_COLUMN,
};

mod hourly;
mod zone_map;
pub use hourly::{
    aggregate, partition_by_month, write_zone_csv, zone_file_name, CountOverflow,
    ZoneHourAggregate,
};
pub use zone_map::{ZoneMap, ZoneMapError, ZONE_MAP_FILE};

#[derive(thiserror::Error, Debug)]
pub enum ZoneError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error(transparent)]
    ZoneMap(#[from] ZoneMapError),
    #[error(transparent)]
    Overflow(#[from] CountOverflow),
    #[error("failed to write {1:?}")]
    Io(#[source] io::Error, PathBuf),
    #[error("failed to write zone file")]
    Csv(#[from] csv::Error),
}
type Result<T> = std::result::Result<T, ZoneError>;

/// Hub-level rows turned into per-zone hourly counts
///
/// The zone map at [ZoneAggregator::zone_map] is loaded, extended with the
/// new hubs and saved back before any aggregate is computed.
pub struct ZoneAggregator {
    hub_col: String,
    count_col: String,
    time_col: String,
    city_name_col: String,
    zone_map_path: PathBuf,
}
impl Default for ZoneAggregator {
    fn default() -> Self {
        Self {
            hub_col: String::from("City"),
            count_col: String::from("Count"),
            time_col: String::from("PUTime"),
            city_name_col: String::from(CITY_NAME_COLUMN),
            zone_map_path: config::data_dir().join(ZONE_MAP_FILE),
        }
    }
}
impl ZoneAggregator {
    pub fn hub_column<S: Into<String>>(self, hub_col: S) -> Self {
        Self {
            hub_col: hub_col.into(),
            ..self
        }
    }
    pub fn count_column<S: Into<String>>(self, count_col: S) -> Self {
        Self {
            count_col: count_col.into(),
            ..self
        }
    }
    pub fn time_column<S: Into<String>>(self, time_col: S) -> Self {
        Self {
            time_col: time_col.into(),
            ..self
        }
    }
    /// Column holding the original city, only used to spot hubs shared by cities
    pub fn city_name_column<S: Into<String>>(self, city_name_col: S) -> Self {
        Self {
            city_name_col: city_name_col.into(),
            ..self
        }
    }
    pub fn zone_map<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            zone_map_path: path.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn zone_map_path(&self) -> &Path {
        &self.zone_map_path
    }
    /// Aggregates `table` by zone and hour, split by month
    ///
    /// Nothing is written if a column is missing or a time can't be parsed.
    pub fn aggregate(&self, table: &Table) -> Result<ZoneFiles> {
        let idx = table.require(
            "RAW dataset",
            &[
                self.hub_col.as_str(),
                self.count_col.as_str(),
                self.time_col.as_str(),
            ],
        )?;
        let (hub_idx, count_idx, time_idx) = (idx[0], idx[1], idx[2]);

        let rows = table
            .rows()
            .enumerate()
            .map(|(i, row)| {
                let time = parse_hour(&row[time_idx]).ok_or_else(|| TimestampError {
                    row: i + 1,
                    value: row[time_idx].clone(),
                })?;
                Ok::<_, ZoneError>((row[hub_idx].as_str(), time, count_or_zero(&row[count_idx])))
            })
            .collect::<Result<Vec<(&str, NaiveDateTime, i64)>>>()?;

        if let Some(city_idx) = table.column(&self.city_name_col) {
            self.warn_shared_hubs(table, hub_idx, city_idx);
        }

        let zone_map = self.update_zone_map(rows.iter().map(|(hub, ..)| *hub))?;
        // every hub got a code from `update_zone_map`
        let zoned = rows
            .into_iter()
            .map(|(hub, time, count)| (zone_map[hub], time, count));
        let aggregates = aggregate(zoned)?;
        log::info!(
            "{} zone-hour rows from {} hub rows",
            aggregates.len(),
            table.len()
        );
        Ok(ZoneFiles {
            count_col: self.count_col.clone(),
            months: partition_by_month(aggregates),
        })
    }
    /// Loads the zone map, allocates codes to new hubs and saves it if it changed
    fn update_zone_map<'a>(&self, hubs: impl Iterator<Item = &'a str>) -> Result<ZoneMap> {
        let exists = self.zone_map_path.exists();
        let mut zone_map = ZoneMap::from_path(&self.zone_map_path)?;
        let new_zones = zone_map.allocate(hubs)?;
        for (hub, code) in &new_zones {
            log::debug!("new zone {}: {:?}", code, hub);
        }
        if !new_zones.is_empty() || !exists {
            zone_map.to_path(&self.zone_map_path)?;
            log::info!(
                "{} new zones saved to {:?}",
                new_zones.len(),
                self.zone_map_path
            );
        }
        Ok(zone_map)
    }
    fn warn_shared_hubs(&self, table: &Table, hub_idx: usize, city_idx: usize) {
        let mut owners: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for row in table.rows() {
            owners
                .entry(row[hub_idx].as_str())
                .or_default()
                .insert(row[city_idx].as_str());
        }
        for (hub, cities) in owners.iter().filter(|(_, cities)| cities.len() > 1) {
            log::warn!("hub {:?} appears under several cities: {:?}", hub, cities);
        }
    }
}

/// Monthly groups of zone-hour aggregates, ready to be written
#[derive(Debug, Clone, Default)]
pub struct ZoneFiles {
    count_col: String,
    months: BTreeMap<String, Vec<ZoneHourAggregate>>,
}
impl ZoneFiles {
    pub fn months(&self) -> &BTreeMap<String, Vec<ZoneHourAggregate>> {
        &self.months
    }
    pub fn total_count(&self) -> i64 {
        self.months.values().flatten().map(|a| a.count).sum()
    }
    /// Writes one `YYYY-MM_1H_zone.csv` file per month into `output_dir`
    pub fn write<P: AsRef<Path>>(&self, output_dir: P) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir).map_err(|e| ZoneError::Io(e, output_dir.into()))?;
        let mut paths = Vec::with_capacity(self.months.len());
        for (month, aggregates) in &self.months {
            let path = output_dir.join(zone_file_name(month));
            let file = File::create(&path).map_err(|e| ZoneError::Io(e, path.clone()))?;
            write_zone_csv(aggregates, &self.count_col, file)?;
            paths.push(path);
        }
        Ok(paths)
    }
}
