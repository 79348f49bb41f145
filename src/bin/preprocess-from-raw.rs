use std::path::PathBuf;

use hub_zones::{config, CityAggregator, Table};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "preprocess-from-raw",
    about = "Aggregate RAW hub-level dataset back to processed city-level dataset"
)]
struct Opt {
    /// Path to raw hub-level CSV [default: <data dir>/tamilnadu_taxi_raw.csv]
    #[structopt(long, parse(from_os_str))]
    input: Option<PathBuf>,
    /// Path to write processed city-level CSV [default: <data dir>/tamilnadu_taxi_demand_from_raw.csv]
    #[structopt(long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Original city column name in raw (preserved city)
    #[structopt(long, default_value = "CityName")]
    city_col: String,
    /// Count column name
    #[structopt(long, default_value = "Count")]
    count_col: String,
    /// Pickup time column name
    #[structopt(long, default_value = "PUTime")]
    time_col: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let data_dir = config::data_dir();
    let input = opt.input.unwrap_or_else(|| data_dir.join(config::RAW_FILE));
    let output = opt
        .output
        .unwrap_or_else(|| data_dir.join(config::PROCESSED_FROM_RAW_FILE));

    let raw = Table::from_path(&input)?;
    let processed = CityAggregator::default()
        .city_column(opt.city_col)
        .count_column(opt.count_col)
        .time_column(opt.time_col)
        .aggregate(&raw)?;
    processed.to_path(&output)?;
    println!("Wrote processed dataset from raw: {}", output.display());

    Ok(())
}
