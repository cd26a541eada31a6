//! Access to the raw Olist tables.
//!
//! A [`DataSource`] is built once and shared (usually as `Arc<DataSource>`)
//! by every feature component. Tables loaded from disk are read on first use
//! and cached for the lifetime of the source.

use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::config::DataConfig;
use crate::error::{Error, Result};
use crate::io::read_csv;
use crate::table::Table;

/// The tables a [`DataSource`] can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    Orders,
    OrderItems,
    OrderReviews,
    Products,
    ProductCategoryNameTranslation,
    Sellers,
    Customers,
    Geolocation,
}

impl TableName {
    pub const ALL: [TableName; 8] = [
        TableName::Orders,
        TableName::OrderItems,
        TableName::OrderReviews,
        TableName::Products,
        TableName::ProductCategoryNameTranslation,
        TableName::Sellers,
        TableName::Customers,
        TableName::Geolocation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Orders => "orders",
            TableName::OrderItems => "order_items",
            TableName::OrderReviews => "order_reviews",
            TableName::Products => "products",
            TableName::ProductCategoryNameTranslation => "product_category_name_translation",
            TableName::Sellers => "sellers",
            TableName::Customers => "customers",
            TableName::Geolocation => "geolocation",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TableName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::TableNotFound(s.to_string()))
    }
}

enum Origin {
    Memory,
    Directory(DataConfig),
}

/// Read-only provider of named tables.
pub struct DataSource {
    origin: Origin,
    tables: OnceLock<HashMap<String, Table>>,
}

impl DataSource {
    /// Wrap tables that are already in memory.
    pub fn from_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = (S, Table)>,
        S: Into<String>,
    {
        let tables: HashMap<String, Table> = tables
            .into_iter()
            .map(|(name, table)| (name.into(), table))
            .collect();

        Self {
            origin: Origin::Memory,
            tables: OnceLock::from(tables),
        }
    }

    /// Load tables from the CSV directory described by `config` on first access.
    pub fn from_config(config: DataConfig) -> Self {
        Self {
            origin: Origin::Directory(config),
            tables: OnceLock::new(),
        }
    }

    /// Returns the table registered under `name`.
    ///
    /// Fails with [`Error::TableNotFound`] when the name is not one of
    /// [`TableName::ALL`] or when no data was found for it.
    pub fn get_table(&self, name: &str) -> Result<Table> {
        let name: TableName = name.parse()?;
        self.table(name)
    }

    pub fn table(&self, name: TableName) -> Result<Table> {
        self.tables()?
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    fn tables(&self) -> Result<&HashMap<String, Table>> {
        if let Some(tables) = self.tables.get() {
            return Ok(tables);
        }

        let loaded = match &self.origin {
            Origin::Directory(config) => load_directory(config)?,
            Origin::Memory => HashMap::new(),
        };
        Ok(self.tables.get_or_init(|| loaded))
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded: Vec<&str> = self
            .tables
            .get()
            .map(|tables| tables.keys().map(String::as_str).collect())
            .unwrap_or_default();
        f.debug_struct("DataSource")
            .field("loaded", &loaded)
            .finish()
    }
}

fn load_directory(config: &DataConfig) -> Result<HashMap<String, Table>> {
    let dir: &Path = &config.data_dir;
    let mut tables = HashMap::new();

    let dir_error = |source| Error::DataDir {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(dir_error)? {
        let path = entry.map_err(dir_error)?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with('.') || path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let key = config.table_key(stem);
        let table = read_csv(&path).map_err(|source| Error::Load {
            table: key.clone(),
            path: path.clone(),
            source: Box::new(source),
        })?;
        debug!(
            "read {} as table '{}' ({} rows)",
            path.display(),
            key,
            table.row_count()
        );
        tables.insert(key, table);
    }

    info!("loaded {} tables from {}", tables.len(), dir.display());
    Ok(tables)
}
