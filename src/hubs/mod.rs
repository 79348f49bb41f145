//! Expansion of city-level demand into synthetic hubs

use indicatif::{ProgressBar, ProgressIterator};

use crate::{
    table::{Table, TableError},
    CITY_NAME_COLUMN,
};

mod assign;
mod catalog;
pub use assign::{assign_hub, deterministic_index};
pub use catalog::{
    candidate_paths, city_key, normalize, placeholder, read_candidates, CatalogError, HubCatalog,
    DEFAULT_HUBS_PER_CITY,
};

#[derive(thiserror::Error, Debug)]
pub enum HubError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("city column {0:?} clashes with the output column of the original city")]
    CityColumnClash(String),
}
type Result<T> = std::result::Result<T, HubError>;

/// Rewrites the city column of a processed dataset with hub labels
///
/// The original city is kept in a `CityName` column.
pub struct HubExpander {
    city_col: String,
    count_col: String,
    time_col: String,
    progress: bool,
}
impl Default for HubExpander {
    fn default() -> Self {
        Self {
            city_col: String::from("City"),
            count_col: String::from("Count"),
            time_col: String::from("PUTime"),
            progress: false,
        }
    }
}
impl HubExpander {
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
    /// Shows a progress bar while rows are assigned
    pub fn progress(self, progress: bool) -> Self {
        Self { progress, ..self }
    }
    /// Checks that the city, count and time columns are all present
    ///
    /// The city column can't be named `CityName`, that name is taken by the
    /// column holding the original city.
    pub fn validate(&self, table: &Table) -> Result<()> {
        self.required(table)?;
        Ok(())
    }
    fn required(&self, table: &Table) -> Result<[usize; 3]> {
        if self.city_col == CITY_NAME_COLUMN {
            return Err(HubError::CityColumnClash(self.city_col.clone()));
        }
        let idx = table.require(
            "input",
            &[
                self.city_col.as_str(),
                self.count_col.as_str(),
                self.time_col.as_str(),
            ],
        )?;
        Ok([idx[0], idx[1], idx[2]])
    }
    /// Assigns every row of `table` to a hub of its city
    ///
    /// Output columns: hub (under the city column name), `CityName`, count,
    /// time, then the remaining input columns in their original order.
    pub fn expand(&self, table: &Table, catalog: &HubCatalog) -> Result<Table> {
        let [city_idx, count_idx, time_idx] = self.required(table)?;
        for (hub, cities) in catalog.shared_labels() {
            log::warn!("hub {:?} is shared by {:?}", hub, cities);
        }

        let out_cols = [
            self.city_col.as_str(),
            CITY_NAME_COLUMN,
            self.count_col.as_str(),
            self.time_col.as_str(),
        ];
        let other_idx: Vec<usize> = table
            .headers()
            .iter()
            .enumerate()
            .filter(|(_, h)| !out_cols.contains(&h.as_str()))
            .map(|(i, _)| i)
            .collect();
        let mut expanded = Table::new(
            out_cols
                .iter()
                .map(|h| h.to_string())
                .chain(other_idx.iter().map(|&i| table.headers()[i].clone())),
        );

        let progress = if self.progress {
            ProgressBar::new(table.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        let mut n_assigned = 0usize;
        for row in table.rows().progress_with(progress) {
            let city = row[city_idx].as_str();
            let hub = assign_hub(catalog, city, &row[time_idx], &row[count_idx]);
            if catalog.hubs(city).is_some() {
                n_assigned += 1;
            }
            let mut record = vec![
                hub.to_string(),
                city.to_string(),
                row[count_idx].clone(),
                row[time_idx].clone(),
            ];
            record.extend(other_idx.iter().map(|&i| row[i].clone()));
            expanded.push(record);
        }
        log::info!(
            "{} of {} rows assigned to hubs of {} cities",
            n_assigned,
            table.len(),
            catalog.len()
        );
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
    use std::{collections::HashMap, error::Error};

    const PROCESSED: &str = "\
City,Count,PUTime,Source
Erode,10,2023-01-01 08:00,a
Chennai,4,2023-01-01 08:00,b
Madurai,7,2023-01-01 09:00,c
Erode,3,2023-01-01 09:00,d
Chennai,4,2023-01-01 08:00,e
";

    #[test]
    fn column_layout() -> std::result::Result<(), Box<dyn Error>> {
        let table = Table::from_reader(PROCESSED.as_bytes())?;
        let catalog = HubCatalog::synthesize(&["Erode", "Chennai", "Salem"], 72);
        let raw = HubExpander::default().expand(&table, &catalog)?;
        assert_eq!(raw.headers(), ["City", "CityName", "Count", "PUTime", "Source"]);
        assert_eq!(raw.len(), table.len());
        for (row, input) in raw.rows().zip(table.rows()) {
            assert_eq!(row[1], input[0]);
            assert_eq!(row[2], input[1]);
            assert_eq!(row[3], input[2]);
            assert_eq!(row[4], input[3]);
            assert!(row[0].starts_with(&format!("{} Hub ", input[0])) || row[0] == "Madurai");
        }
        Ok(())
    }

    #[test]
    fn untargeted_rows_pass_through() -> std::result::Result<(), Box<dyn Error>> {
        let table = Table::from_reader(PROCESSED.as_bytes())?;
        let catalog = HubCatalog::synthesize(&["Erode"], 72);
        let raw = HubExpander::default().expand(&table, &catalog)?;
        for (row, input) in raw.rows().zip(table.rows()) {
            if input[0] != "Erode" {
                assert_eq!(row[0], input[0]);
            }
        }
        Ok(())
    }

    #[test]
    fn same_key_same_hub() -> std::result::Result<(), Box<dyn Error>> {
        let table = Table::from_reader(PROCESSED.as_bytes())?;
        let catalog = HubCatalog::synthesize(&["Chennai"], 72);
        let raw = HubExpander::default().expand(&table, &catalog)?;
        let chennai: Vec<_> = raw.rows().filter(|r| r[1] == "Chennai").collect();
        assert_eq!(chennai.len(), 2);
        assert_eq!(chennai[0][0], chennai[1][0]);
        Ok(())
    }

    #[test]
    fn independent_of_row_order() -> std::result::Result<(), Box<dyn Error>> {
        let mut table = Table::new(["City", "Count", "PUTime"]);
        let mut rows: Vec<Vec<String>> = (0..200)
            .map(|i| {
                vec![
                    ["Erode", "Salem"][i % 2].to_string(),
                    (i % 13).to_string(),
                    format!("2023-03-{:02} {:02}:00", i / 24 + 1, i % 24),
                ]
            })
            .collect();
        rows.iter().cloned().for_each(|row| table.push(row));
        let catalog = HubCatalog::synthesize(&["Erode", "Salem"], 72);
        let expander = HubExpander::default();
        let hubs = |t: &Table| -> HashMap<Vec<String>, String> {
            t.rows()
                .map(|r| (vec![r[1].clone(), r[2].clone(), r[3].clone()], r[0].clone()))
                .collect()
        };
        let reference = hubs(&expander.expand(&table, &catalog)?);

        rows.shuffle(&mut StdRng::seed_from_u64(7));
        let mut shuffled = Table::new(["City", "Count", "PUTime"]);
        rows.into_iter().for_each(|row| shuffled.push(row));
        assert_eq!(hubs(&expander.expand(&shuffled, &catalog)?), reference);
        Ok(())
    }

    #[test]
    fn custom_columns() -> std::result::Result<(), Box<dyn Error>> {
        let table = Table::from_reader("town,n,when\nErode,1,2023-01-01 00:00\n".as_bytes())?;
        let catalog = HubCatalog::synthesize(&["Erode"], 4);
        let raw = HubExpander::default()
            .city_column("town")
            .count_column("n")
            .time_column("when")
            .expand(&table, &catalog)?;
        assert_eq!(raw.headers(), ["town", "CityName", "n", "when"]);
        Ok(())
    }

    #[test]
    fn city_column_cannot_be_city_name() -> std::result::Result<(), Box<dyn Error>> {
        let table =
            Table::from_reader("CityName,Count,PUTime\nErode,1,2023-01-01 00:00\n".as_bytes())?;
        let catalog = HubCatalog::synthesize(&["Erode"], 4);
        let expander = HubExpander::default().city_column(CITY_NAME_COLUMN);
        assert!(matches!(
            expander.validate(&table),
            Err(HubError::CityColumnClash(..))
        ));
        assert!(matches!(
            expander.expand(&table, &catalog),
            Err(HubError::CityColumnClash(..))
        ));
        Ok(())
    }

    #[test]
    fn missing_time_column() -> std::result::Result<(), Box<dyn Error>> {
        let table = Table::from_reader("City,Count\nErode,1\n".as_bytes())?;
        let catalog = HubCatalog::synthesize(&["Erode"], 72);
        let err = HubExpander::default()
            .expand(&table, &catalog)
            .err()
            .ok_or("expected an error")?;
        assert!(err.to_string().contains("PUTime"), "{}", err);
        assert!(HubExpander::default().validate(&table).is_err());
        Ok(())
    }
}
