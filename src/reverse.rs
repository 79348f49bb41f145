//! City-level counts rebuilt from the hub-level dataset

use std::collections::BTreeMap;

use crate::{
    table::{count_or_zero, Table, TableError},
    CITY_NAME_COLUMN,
};

#[derive(thiserror::Error, Debug)]
pub enum ReverseError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("count of {city:?} at {time:?} overflows")]
    Overflow { city: String, time: String },
}
type Result<T> = std::result::Result<T, ReverseError>;

/// Sums hub counts back into `(city, time)` counts
pub struct CityAggregator {
    city_col: String,
    count_col: String,
    time_col: String,
}
impl Default for CityAggregator {
    fn default() -> Self {
        Self {
            city_col: String::from(CITY_NAME_COLUMN),
            count_col: String::from("Count"),
            time_col: String::from("PUTime"),
        }
    }
}
impl CityAggregator {
    pub fn city_column<S: Into<String>>(self, city_col: S) -> Self {
        Self {
            city_col: city_col.into(),
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
    /// Returns a `City, <count>, <time>` table ordered by city then time
    ///
    /// Times are grouped on their text, the hub column is dropped.
    pub fn aggregate(&self, table: &Table) -> Result<Table> {
        let idx = table.require(
            "raw dataset",
            &[
                self.city_col.as_str(),
                self.count_col.as_str(),
                self.time_col.as_str(),
            ],
        )?;
        let (city_idx, count_idx, time_idx) = (idx[0], idx[1], idx[2]);

        let mut sums: BTreeMap<(&str, &str), i64> = BTreeMap::new();
        for row in table.rows() {
            let (city, time) = (row[city_idx].as_str(), row[time_idx].as_str());
            let sum = sums.entry((city, time)).or_insert(0);
            *sum = sum
                .checked_add(count_or_zero(&row[count_idx]))
                .ok_or_else(|| ReverseError::Overflow {
                    city: city.to_string(),
                    time: time.to_string(),
                })?;
        }
        let mut processed = Table::new(["City", self.count_col.as_str(), self.time_col.as_str()]);
        for ((city, time), count) in sums {
            processed.push(vec![city.to_string(), count.to_string(), time.to_string()]);
        }
        log::info!(
            "{} hub rows aggregated into {} city rows",
            table.len(),
            processed.len()
        );
        Ok(processed)
    }
}
