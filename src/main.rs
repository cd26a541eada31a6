use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use olist_features::io::write_csv;
use olist_features::{Config, DataSource, OrderMetrics, ProductMetrics, Result, Table};

/// Number of rows printed per table.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(
    name = "olist-features",
    version,
    about = "Build order, product and category feature tables from the Olist CSV dump"
)]
struct Options {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the Olist CSV files (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Write orders.csv, products.csv and categories.csv into this directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Spread each review cost over the products of its order
    #[arg(long)]
    spread: bool,

    /// Aggregation applied per category (count, sum, mean, median, min, max, std, nunique)
    #[arg(long, default_value = "mean")]
    agg: String,
}

fn run(options: Options) -> Result<()> {
    let mut config = match &options.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = options.data_dir {
        config.data.data_dir = dir;
    }

    info!("reading Olist tables from {}", config.data.data_dir.display());
    let data = Arc::new(DataSource::from_config(config.data));
    let orders = OrderMetrics::new(Arc::clone(&data));
    let products = ProductMetrics::with_economics(data, config.economics);

    let outputs: [(&str, Table); 3] = [
        ("orders", orders.training_data(true, false)?),
        ("products", products.training_data(options.spread)?),
        ("categories", products.product_cat(options.spread, &options.agg)?),
    ];

    for (name, table) in &outputs {
        println!("{}:\n{}", name, table.head(PREVIEW_ROWS));
    }

    if let Some(out) = options.out {
        std::fs::create_dir_all(&out)?;
        for (name, table) in &outputs {
            let path = out.join(format!("{}.csv", name));
            write_csv(table, &path)?;
            info!("wrote {} rows to {}", table.row_count(), path.display());
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let options = Options::parse();

    if let Err(err) = run(options) {
        error!("{}", err);
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
