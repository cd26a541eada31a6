mod core;
mod group;
mod join;
mod select;

pub use self::core::Table;
pub use group::{AggFunc, Aggregation, GroupBy};
