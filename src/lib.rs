//! # Taxi demand hubs and zones
//!
//! Transforms between three versions of a taxi demand dataset:
//!  - the processed city-level counts (`City, Count, PUTime`),
//!  - the raw hub-level counts, where each city row is given to one of the
//!    city's synthetic hubs ([hubs::HubExpander]),
//!  - the monthly `YYYY-MM_1H_zone.csv` files of hourly counts per zone code
//!    ([zones::ZoneAggregator]).
//!
//! The raw dataset is folded back into city-level counts with
//! [reverse::CityAggregator].

pub mod config;
pub mod error;
pub mod hubs;
pub mod reverse;
pub mod table;
pub mod timestamp;
pub mod zones;

pub use error::Error;
pub use hubs::{HubCatalog, HubExpander};
pub use reverse::CityAggregator;
pub use table::Table;
pub use zones::{ZoneAggregator, ZoneMap};

/// Column of the raw dataset holding the original city
pub const CITY_NAME_COLUMN: &str = "CityName";
