use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    fs,
    io,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to read hub list {1:?}")]
    Io(#[source] io::Error, PathBuf),
    #[error("failed to parse hub list {1:?}")]
    Csv(#[source] csv::Error, PathBuf),
}
type Result<T> = std::result::Result<T, CatalogError>;

pub const DEFAULT_HUBS_PER_CITY: usize = 72;

/// Lookup key of a city: `"Tiruppur North"` becomes `"tiruppur_north"`
pub fn city_key(city: &str) -> String {
    city.trim().to_lowercase().replace(' ', "_")
}

/// Placeholder hub label, numbered from 1
pub fn placeholder(city: &str, number: usize) -> String {
    format!("{} Hub {:02}", city, number)
}

/// Candidate hub files for a city: `hubs_<key>.txt` then `hubs_<key>.csv`
pub fn candidate_paths<P: AsRef<Path>>(hubs_dir: P, city: &str) -> [PathBuf; 2] {
    let key = city_key(city);
    [
        hubs_dir.as_ref().join(format!("hubs_{}.txt", key)),
        hubs_dir.as_ref().join(format!("hubs_{}.csv", key)),
    ]
}

/// Reads one label per line
fn read_txt(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|e| CatalogError::Io(e, path.into()))?;
    Ok(contents
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Reads the `hub` column, or the first column if there is none
fn read_csv(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| CatalogError::Csv(e, path.into()))?;
    let idx = rdr
        .headers()
        .map_err(|e| CatalogError::Csv(e, path.into()))?
        .iter()
        .position(|h| h == "hub")
        .unwrap_or(0);
    let mut hubs = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| CatalogError::Csv(e, path.into()))?;
        if let Some(hub) = record.get(idx).map(str::trim).filter(|h| !h.is_empty()) {
            hubs.push(hub.to_string());
        }
    }
    Ok(hubs)
}

/// Loads the candidate labels supplied for `city`, if any file exists
pub fn read_candidates<P: AsRef<Path>>(hubs_dir: P, city: &str) -> Result<Option<Vec<String>>> {
    let [txt, csv] = candidate_paths(hubs_dir, city);
    if txt.exists() {
        log::debug!("{}: hubs from {:?}", city, txt);
        read_txt(&txt).map(Some)
    } else if csv.exists() {
        log::debug!("{}: hubs from {:?}", city, csv);
        read_csv(&csv).map(Some)
    } else {
        log::debug!("{}: no hub list found, using placeholders", city);
        Ok(None)
    }
}

/// Returns exactly `expected_count` unique, non-empty labels
///
/// Labels are trimmed and deduplicated in first-seen order, then padded with
/// placeholders numbered from the current length + 1, or truncated.
pub fn normalize<I, S>(city: &str, candidates: I, expected_count: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut hubs: Vec<String> = candidates
        .into_iter()
        .map(|h| h.as_ref().trim().to_string())
        .filter(|h| !h.is_empty() && seen.insert(h.clone()))
        .collect();
    if !hubs.is_empty() && hubs.len() < expected_count {
        log::warn!(
            "{}: padding {} hubs up to {}",
            city,
            hubs.len(),
            expected_count
        );
    }
    // a supplied label may already look like a placeholder
    let mut number = hubs.len();
    while hubs.len() < expected_count {
        number += 1;
        let label = placeholder(city, number);
        if seen.insert(label.clone()) {
            hubs.push(label);
        }
    }
    hubs.truncate(expected_count);
    hubs
}

/// Ordered hub labels of every targeted city
#[derive(Debug, Clone)]
pub struct HubCatalog {
    hubs_per_city: usize,
    cities: BTreeMap<String, Vec<String>>,
}
impl Default for HubCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_HUBS_PER_CITY)
    }
}
impl HubCatalog {
    pub fn new(hubs_per_city: usize) -> Self {
        Self {
            hubs_per_city,
            cities: BTreeMap::new(),
        }
    }
    /// Builds the catalog of `cities` from the hub files in `hubs_dir`
    ///
    /// Cities without a hub file get `hubs_per_city` placeholders.
    pub fn load<P, S>(hubs_dir: P, cities: &[S], hubs_per_city: usize) -> Result<Self>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let mut this = Self::new(hubs_per_city);
        for city in cities {
            let city = city.as_ref();
            match read_candidates(&hubs_dir, city)? {
                Some(candidates) => this.insert(city, candidates),
                None => this.insert(city, Vec::<String>::new()),
            };
        }
        Ok(this)
    }
    /// Catalog of placeholder hubs only
    pub fn synthesize<S: AsRef<str>>(cities: &[S], hubs_per_city: usize) -> Self {
        let mut this = Self::new(hubs_per_city);
        for city in cities {
            this.insert(city.as_ref(), Vec::<String>::new());
        }
        this
    }
    /// Adds (or replaces) a city with its normalized candidate labels
    pub fn insert<I, S>(&mut self, city: &str, candidates: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hubs = normalize(city, candidates, self.hubs_per_city);
        self.cities.insert(city.to_string(), hubs);
        self
    }
    pub fn hubs(&self, city: &str) -> Option<&[String]> {
        self.cities.get(city).map(|hubs| hubs.as_slice())
    }
    pub fn cities(&self) -> impl Iterator<Item = &str> + '_ {
        self.cities.keys().map(|city| city.as_str())
    }
    pub fn hubs_per_city(&self) -> usize {
        self.hubs_per_city
    }
    pub fn len(&self) -> usize {
        self.cities.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
    /// Hub labels listed under more than one city, with those cities
    pub fn shared_labels(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut owners: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (city, hubs) in &self.cities {
            for hub in hubs {
                owners.entry(hub.as_str()).or_default().insert(city.as_str());
            }
        }
        owners.retain(|_, cities| cities.len() > 1);
        owners
    }
}
