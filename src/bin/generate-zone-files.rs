use std::path::PathBuf;

use hub_zones::{config, zones::ZONE_MAP_FILE, Table, ZoneAggregator};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "generate-zone-files",
    about = "Generate monthly *_1H_zone.csv files from hub-level RAW dataset"
)]
struct Opt {
    /// Path to RAW hub-level CSV (City=hub, CityName=city, Count, PUTime) [default: <data dir>/tamilnadu_taxi_raw.csv]
    #[structopt(long, parse(from_os_str))]
    input: Option<PathBuf>,
    /// Hub column name in RAW (used as zone label)
    #[structopt(long, default_value = "City")]
    city_col: String,
    /// Count column name
    #[structopt(long, default_value = "Count")]
    count_col: String,
    /// Pickup time column name
    #[structopt(long, default_value = "PUTime")]
    time_col: String,
    /// Original city column, used to report hubs shared by several cities
    #[structopt(long, default_value = "CityName")]
    city_name_col: String,
    /// Directory to write monthly zone files [default: <data dir>]
    #[structopt(long, parse(from_os_str))]
    output_dir: Option<PathBuf>,
    /// Hub to zone code JSON map [default: <data dir>/hub_to_zone.json]
    #[structopt(long, parse(from_os_str))]
    zone_map: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let data_dir = config::data_dir();
    let input = opt.input.unwrap_or_else(|| data_dir.join(config::RAW_FILE));
    let output_dir = opt.output_dir.unwrap_or_else(|| data_dir.clone());
    let zone_map = opt
        .zone_map
        .unwrap_or_else(|| data_dir.join(ZONE_MAP_FILE));

    let raw = Table::from_path(&input)?;
    let zone_files = ZoneAggregator::default()
        .hub_column(opt.city_col)
        .count_column(opt.count_col)
        .time_column(opt.time_col)
        .city_name_column(opt.city_name_col)
        .zone_map(zone_map)
        .aggregate(&raw)?;
    for path in zone_files.write(&output_dir)? {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
