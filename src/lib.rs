//! Feature engineering over the Olist Brazilian e-commerce dataset.
//!
//! A [`DataSource`] serves the raw tables, [`OrderMetrics`] derives one row
//! per order, [`ProductMetrics`] one row per product and
//! [`CategoryAggregator`] one row per product category. Everything runs on the
//! small in-memory column store in [`table`] and [`column`].

pub mod category;
pub mod column;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod io;
pub mod order;
pub mod product;
pub mod table;

// Re-export commonly used types
pub use category::{aggregate_by_category, CategoryAggregator};
pub use column::{Column, ColumnType, Value};
pub use config::{Config, DataConfig, Economics};
pub use data::{DataSource, TableName};
pub use error::{Error, Result};
pub use io::{read_csv, write_csv};
pub use order::OrderMetrics;
pub use product::ProductMetrics;
pub use table::{AggFunc, Aggregation, GroupBy, Table};
