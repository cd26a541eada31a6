//! Configuration for loading the Olist tables and for the business constants
//! used by the product metrics.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Where the raw CSV files live and how their names map to table names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the `olist_*_dataset.csv` files (default: "data/csv")
    pub data_dir: PathBuf,

    /// Prefix stripped from file stems (default: "olist_")
    pub file_prefix: String,

    /// Suffix stripped from file stems (default: "_dataset")
    pub file_suffix: String,
}

impl DataConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Table name for a CSV file stem, e.g. `olist_orders_dataset` -> `orders`
    pub fn table_key(&self, stem: &str) -> String {
        let key = stem.strip_prefix(&self.file_prefix).unwrap_or(stem);
        let key = key.strip_suffix(&self.file_suffix).unwrap_or(key);
        key.to_string()
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/csv"),
            file_prefix: "olist_".to_string(),
            file_suffix: "_dataset".to_string(),
        }
    }
}

/// Platform revenue share and the cost attributed to each review score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economics {
    /// Share of sales kept as revenue (default: 0.1)
    pub platform_cut: f64,

    /// Cost per review score, indexed by `score - 1` (default: 100, 50, 40, 0, 0)
    pub review_costs: [i64; 5],
}

impl Economics {
    /// Cost of a single review, `None` for scores outside 1..=5
    pub fn review_cost(&self, score: i64) -> Option<i64> {
        if (1..=5).contains(&score) {
            Some(self.review_costs[(score - 1) as usize])
        } else {
            None
        }
    }
}

impl Default for Economics {
    fn default() -> Self {
        Self {
            platform_cut: 0.1,
            review_costs: [100, 50, 40, 0, 0],
        }
    }
}

/// Top level configuration file.
///
/// ```toml
/// [data]
/// data_dir = "data/csv"
///
/// [economics]
/// platform_cut = 0.1
/// review_costs = [100, 50, 40, 0, 0]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub economics: Economics,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}
