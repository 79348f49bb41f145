use std::path::PathBuf;

use hub_zones::{
    config,
    hubs::{HubCatalog, HubExpander},
    Table,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "generate-raw",
    about = "Generate RAW hub-level dataset from processed city-level dataset"
)]
struct Opt {
    /// Path to processed CSV (City,Count,PUTime) [default: <data dir>/tamilnadu_taxi_demand.csv]
    #[structopt(long, parse(from_os_str))]
    input: Option<PathBuf>,
    /// Path to write raw hub-level CSV [default: <data dir>/tamilnadu_taxi_raw.csv]
    #[structopt(long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Cities to expand into hubs [default: Erode Chennai Salem]
    #[structopt(long)]
    target_cities: Option<Vec<String>>,
    /// City column name in input
    #[structopt(long, default_value = "City")]
    city_col: String,
    /// Count column name in input
    #[structopt(long, default_value = "Count")]
    count_col: String,
    /// Time column name in input
    #[structopt(long, default_value = "PUTime")]
    time_col: String,
    /// Number of hubs per city
    #[structopt(long, default_value = "72")]
    hubs_per_city: usize,
    /// Directory of the `hubs_<city>.txt|csv` lists [default: <data dir>]
    #[structopt(long, parse(from_os_str))]
    hubs_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let data_dir = config::data_dir();
    let input = opt
        .input
        .unwrap_or_else(|| data_dir.join(config::PROCESSED_FILE));
    let output = opt.output.unwrap_or_else(|| data_dir.join(config::RAW_FILE));
    let target_cities = opt.target_cities.unwrap_or_else(|| {
        config::DEFAULT_TARGET_CITIES
            .iter()
            .map(|city| city.to_string())
            .collect()
    });

    let processed = Table::from_path(&input)?;
    let expander = HubExpander::default()
        .city_column(opt.city_col)
        .count_column(opt.count_col)
        .time_column(opt.time_col)
        .progress(true);
    expander.validate(&processed)?;

    let catalog = HubCatalog::load(
        opt.hubs_dir.unwrap_or_else(|| data_dir.clone()),
        &target_cities,
        opt.hubs_per_city,
    )?;
    let raw = expander.expand(&processed, &catalog)?;
    raw.to_path(&output)?;
    println!("Wrote RAW hub-level dataset: {}", output.display());

    Ok(())
}
