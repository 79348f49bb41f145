use crate::{
    hubs::{CatalogError, HubError},
    reverse::ReverseError,
    table::TableError,
    zones::ZoneError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `table` module")]
    Table(#[from] TableError),
    #[error("Error loading the hub catalog")]
    Catalog(#[from] CatalogError),
    #[error("Error in the `hubs` module")]
    Hub(#[from] HubError),
    #[error("Error in the `zones` module")]
    Zone(#[from] ZoneError),
    #[error("Error in the `reverse` module")]
    Reverse(#[from] ReverseError),
}
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CityAggregator, Table};
    use std::error::Error as _;

    fn reverse(csv: &str) -> Result<Table> {
        let raw = Table::from_reader(csv.as_bytes())?;
        Ok(CityAggregator::default().aggregate(&raw)?)
    }

    #[test]
    fn module_errors_are_wrapped() {
        let err = reverse("City,Count\nErode Hub 01,1\n").unwrap_err();
        assert!(matches!(err, Error::Reverse(ReverseError::Table(_))));
        let source = err.source().map(|e| e.to_string()).unwrap_or_default();
        assert!(source.contains("CityName"), "{}", source);
    }

    #[test]
    fn table_errors_are_wrapped() {
        let err = reverse("City,Count\nErode Hub 01\n").unwrap_err();
        assert!(matches!(err, Error::Table(TableError::Csv(_))));
    }
}
