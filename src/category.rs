//! Category-grain aggregation of the product training table.

use log::debug;

use crate::error::{Result, ResultExt};
use crate::product::ProductMetrics;
use crate::table::{AggFunc, Aggregation, Table};

/// Group key of the category table.
pub const CATEGORY_COLUMN: &str = "category";

/// Column that is always summed, whatever aggregation is requested.
const QUANTITY_COLUMN: &str = "quantity";

/// Rolls [`ProductMetrics::training_data`] up to one row per category.
#[derive(Debug, Clone)]
pub struct CategoryAggregator {
    products: ProductMetrics,
}

impl CategoryAggregator {
    pub fn new(products: ProductMetrics) -> Self {
        Self { products }
    }

    /// `category` followed by every numeric training column aggregated with
    /// `agg`, one row per category in ascending order.
    pub fn aggregate(&self, spread_review_penalty: bool, agg: AggFunc) -> Result<Table> {
        self.products
            .training_data(spread_review_penalty)
            .and_then(|training| aggregate_by_category(&training, agg))
            .in_accessor("category.aggregate")
    }
}

/// Groups `training` by [`CATEGORY_COLUMN`] and applies `agg` to every numeric
/// column except `quantity`, which is summed.
pub fn aggregate_by_category(training: &Table, agg: AggFunc) -> Result<Table> {
    let aggregations: Vec<Aggregation> = training
        .iter_columns()
        .filter(|(name, column)| *name != CATEGORY_COLUMN && column.column_type().is_numeric())
        .map(|(name, _)| {
            let func = if name == QUANTITY_COLUMN { AggFunc::Sum } else { agg };
            Aggregation::new(name, func)
        })
        .collect();
    debug!(
        "aggregating {} columns by {} with {}",
        aggregations.len(),
        CATEGORY_COLUMN,
        agg
    );

    training.group_by([CATEGORY_COLUMN])?.agg(&aggregations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, Float64Column, Int64Column, StringColumn, Value};

    fn training() -> Table {
        Table::from_columns(vec![
            ("product_id", Column::from(StringColumn::from_strs(&["p1", "p2", "p3"]))),
            ("category", Column::from(StringColumn::from_strs(&["toys", "art", "toys"]))),
            ("price", Column::from(Float64Column::new(vec![10.0, 5.0, 30.0]))),
            ("quantity", Column::from(Int64Column::new(vec![3, 1, 2]))),
        ])
        .unwrap()
    }

    #[test]
    fn test_quantity_is_always_summed() {
        let result = aggregate_by_category(&training(), AggFunc::Mean).unwrap();

        assert_eq!(result.column_names(), &["category", "price", "quantity"]);
        assert_eq!(result.value(0, "category").unwrap(), Value::from("art"));
        assert_eq!(result.value(1, "category").unwrap(), Value::from("toys"));
        assert_eq!(result.value(1, "price").unwrap(), Value::Float64(20.0));
        assert_eq!(result.value(1, "quantity").unwrap(), Value::Int64(5));
    }

    #[test]
    fn test_other_aggregations() {
        let result = aggregate_by_category(&training(), AggFunc::Max).unwrap();
        assert_eq!(result.value(1, "price").unwrap(), Value::Float64(30.0));
        assert_eq!(result.value(1, "quantity").unwrap(), Value::Int64(5));

        let counts = aggregate_by_category(&training(), AggFunc::Count).unwrap();
        assert_eq!(counts.value(1, "price").unwrap(), Value::Int64(2));
    }
}
