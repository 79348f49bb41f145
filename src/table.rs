use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("failed to access {1:?}")]
    Io(#[source] io::Error, PathBuf),
    #[error("failed to parse the CSV file")]
    Csv(#[from] csv::Error),
    #[error("Missing required columns in {dataset}: {columns:?}")]
    MissingColumns {
        dataset: String,
        columns: Vec<String>,
    },
}
type Result<T> = std::result::Result<T, TableError>;

/// A CSV dataset kept as text: one header and one string record per row
///
/// Column names are only known at run time (they can be overridden from the
/// command line) so the records are not deserialized into structs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}
impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(|h| h.into()).collect(),
            rows: Vec::new(),
        }
    }
    /// Loads a table from a CSV file with a header line
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading {:?}...", path);
        let now = Instant::now();
        let file = File::open(path).map_err(|e| TableError::Io(e, path.to_path_buf()))?;
        let this = Self::from_reader(file)?;
        log::info!(
            "... loaded {} rows in {}ms",
            this.len(),
            now.elapsed().as_millis()
        );
        Ok(this)
    }
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers: Vec<_> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(|f| f.to_string()).collect());
        }
        Ok(Self { headers, rows })
    }
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
    pub fn rows(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.rows.iter().map(|row| row.as_slice())
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    /// Appends a row, padding or cutting it to the header width
    pub fn push(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }
    /// Index of the first column called `name`
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
    /// Returns the indices of the `names` columns
    ///
    /// Every absent column is reported at once in [TableError::MissingColumns].
    pub fn require<S: AsRef<str>>(&self, dataset: &str, names: &[S]) -> Result<Vec<usize>> {
        let (found, missing): (Vec<_>, Vec<_>) = names
            .iter()
            .map(|name| (name.as_ref(), self.column(name.as_ref())))
            .partition(|(_, idx)| idx.is_some());
        if missing.is_empty() {
            Ok(found.into_iter().filter_map(|(_, idx)| idx).collect())
        } else {
            Err(TableError::MissingColumns {
                dataset: dataset.to_string(),
                columns: missing
                    .into_iter()
                    .map(|(name, _)| name.to_string())
                    .collect(),
            })
        }
    }
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }
    /// Writes the table to a CSV file, creating the parent directories
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        create_parent_dir(path)?;
        let file = File::create(path).map_err(|e| TableError::Io(e, path.to_path_buf()))?;
        self.to_writer(file)
    }
}

pub(crate) fn create_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| TableError::Io(e, parent.to_path_buf()))
        }
        _ => Ok(()),
    }
}

/// Lenient count conversion: fractional values are truncated, anything else is 0
pub fn coerce_count(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .map(|x| x.trunc() as i64)
    })
}

/// Same as [coerce_count] but invalid entries count as 0
pub fn count_or_zero(value: &str) -> i64 {
    coerce_count(value).unwrap_or_else(|| {
        log::warn!("non-numeric count {:?} coerced to 0", value);
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "City,Count,PUTime\nErode,10,2023-01-01 08:00\nSalem,3,2023-01-01 09:00\n";

    #[test]
    fn read_and_write_back() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = Table::from_reader(CSV.as_bytes())?;
        assert_eq!(table.headers(), ["City", "Count", "PUTime"]);
        assert_eq!(table.len(), 2);
        let mut buf = Vec::new();
        table.to_writer(&mut buf)?;
        assert_eq!(String::from_utf8(buf)?, CSV);
        Ok(())
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let table = Table::new(["City", "Count"]);
        match table.require("input", &["City", "PUTime", "Count", "Zone"]) {
            Err(TableError::MissingColumns { dataset, columns }) => {
                assert_eq!(dataset, "input");
                assert_eq!(columns, vec!["PUTime", "Zone"]);
            }
            other => panic!("expected missing columns, got {:?}", other),
        }
        let err = table.require("input", &["PUTime"]).unwrap_err();
        assert!(err.to_string().contains("PUTime"));
    }

    #[test]
    fn required_indices_follow_request_order() {
        let table = Table::new(["PUTime", "City", "Count"]);
        assert_eq!(
            table.require("input", &["City", "Count", "PUTime"]).unwrap(),
            vec![1, 2, 0]
        );
    }

    #[test]
    fn lenient_counts() {
        assert_eq!(count_or_zero("12"), 12);
        assert_eq!(count_or_zero(" 7 "), 7);
        assert_eq!(count_or_zero("3.9"), 3);
        assert_eq!(count_or_zero("n/a"), 0);
        assert_eq!(count_or_zero(""), 0);
        assert_eq!(coerce_count("NaN"), None);
    }

    #[test]
    fn to_path_creates_parent_dirs() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("out.csv");
        let mut table = Table::new(["City", "Count"]);
        table.push(vec!["Erode".to_string()]);
        table.to_path(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "City,Count\nErode,\n");
        Ok(())
    }
}
