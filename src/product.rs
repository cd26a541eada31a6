//! Product-grain features: one row per product.

use log::debug;
use std::sync::Arc;

use crate::category::CategoryAggregator;
use crate::column::{ColumnType, Value};
use crate::config::Economics;
use crate::data::{DataSource, TableName};
use crate::error::{Result, ResultExt};
use crate::order::OrderMetrics;
use crate::table::{AggFunc, Aggregation, Table};

/// Columns of [`ProductMetrics::product_features`], in order.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "product_id",
    "product_name_length",
    "product_description_length",
    "product_photos_qty",
    "product_weight_g",
    "product_length_cm",
    "product_height_cm",
    "product_width_cm",
    "category",
];

/// Computes per-product features, reusing [`OrderMetrics`] over the same data.
#[derive(Debug, Clone)]
pub struct ProductMetrics {
    data: Arc<DataSource>,
    order: OrderMetrics,
    economics: Economics,
}

impl ProductMetrics {
    pub fn new(data: Arc<DataSource>) -> Self {
        Self::with_economics(data, Economics::default())
    }

    pub fn with_economics(data: Arc<DataSource>, economics: Economics) -> Self {
        Self {
            order: OrderMetrics::new(Arc::clone(&data)),
            data,
            economics,
        }
    }

    /// Product attributes with the category translated to English.
    ///
    /// Products whose category has no translation are dropped.
    pub fn product_features(&self) -> Result<Table> {
        self.compute_product_features()
            .in_accessor("product.product_features")
    }

    fn compute_product_features(&self) -> Result<Table> {
        let products = self.data.table(TableName::Products)?;
        let translation = self
            .data
            .table(TableName::ProductCategoryNameTranslation)?;

        products
            .merge(&translation, &["product_category_name"])?
            .drop(&["product_category_name"])?
            .rename(&[
                ("product_category_name_english", "category"),
                ("product_name_lenght", "product_name_length"),
                ("product_description_lenght", "product_description_length"),
            ])?
            .select(&FEATURE_COLUMNS)
    }

    /// `[product_id, price]`: mean item price.
    pub fn price(&self) -> Result<Table> {
        self.item_aggregate(Aggregation::new("price", AggFunc::Mean))
            .in_accessor("product.price")
    }

    /// `[product_id, wait_time]`: mean wait time of the delivered orders containing the product.
    pub fn wait_time(&self) -> Result<Table> {
        self.compute_wait_time().in_accessor("product.wait_time")
    }

    fn compute_wait_time(&self) -> Result<Table> {
        self.order_products()?
            .merge(&self.order.wait_time(true)?, &["order_id"])?
            .group_by(["product_id"])?
            .agg(&[Aggregation::new("wait_time", AggFunc::Mean)])
    }

    /// `[product_id, n_orders, quantity]`
    pub fn quantity(&self) -> Result<Table> {
        self.compute_quantity().in_accessor("product.quantity")
    }

    fn compute_quantity(&self) -> Result<Table> {
        self.data
            .table(TableName::OrderItems)?
            .group_by(["product_id"])?
            .agg(&[
                Aggregation::new("order_id", AggFunc::NUnique).alias("n_orders"),
                Aggregation::new("order_id", AggFunc::Count).alias("quantity"),
            ])
    }

    /// `[product_id, sales]`: total item price.
    pub fn sales(&self) -> Result<Table> {
        self.item_aggregate(Aggregation::new("price", AggFunc::Sum).alias("sales"))
            .in_accessor("product.sales")
    }

    fn item_aggregate(&self, aggregation: Aggregation) -> Result<Table> {
        self.data
            .table(TableName::OrderItems)?
            .group_by(["product_id"])?
            .agg(&[aggregation])
    }

    /// `[product_id, share_of_one_stars, share_of_five_stars, review_score,
    /// spread_cost_of_review, total_cost_of_review]`
    ///
    /// Each review of an order costs the configured amount for its score.
    /// The total cost is charged in full to every product of the order; the
    /// spread cost divides it by the number of products in the order.
    pub fn review_score(&self) -> Result<Table> {
        self.compute_review_score()
            .in_accessor("product.review_score")
    }

    fn compute_review_score(&self) -> Result<Table> {
        let reviewed = self
            .order_products()?
            .merge(&self.order.review_score()?, &["order_id"])?;

        let product_count = reviewed
            .group_by(["order_id"])?
            .transform_count("product_id")?;
        let total_cost = reviewed.map_values("review_score", ColumnType::Int64, |score| {
            score
                .as_f64()
                .and_then(|s| self.economics.review_cost(s as i64))
                .map_or(Value::Null, Value::Int64)
        })?;
        let spread_cost = total_cost.div(&product_count)?;

        reviewed
            .with_column("spread_cost_of_review", spread_cost)?
            .with_column("total_cost_of_review", total_cost)?
            .group_by(["product_id"])?
            .agg(&[
                Aggregation::new("dim_is_one_star", AggFunc::Mean).alias("share_of_one_stars"),
                Aggregation::new("dim_is_five_star", AggFunc::Mean).alias("share_of_five_stars"),
                Aggregation::new("review_score", AggFunc::Mean),
                Aggregation::new("spread_cost_of_review", AggFunc::Sum),
                Aggregation::new("total_cost_of_review", AggFunc::Sum),
            ])
    }

    /// Full product training table, with `revenues` and `profits`.
    ///
    /// `profits = revenues - cost_of_reviews`, where the cost is the spread
    /// cost when `spread_review_penalty` is set and the total cost otherwise.
    pub fn training_data(&self, spread_review_penalty: bool) -> Result<Table> {
        self.compute_training_data(spread_review_penalty)
            .in_accessor("product.training_data")
    }

    fn compute_training_data(&self, spread_review_penalty: bool) -> Result<Table> {
        let on = ["product_id"];
        let training = self
            .product_features()?
            .merge(&self.wait_time()?, &on)?
            .merge(&self.price()?, &on)?
            .merge(&self.review_score()?, &on)?
            .merge(&self.quantity()?, &on)?
            .merge(&self.sales()?, &on)?;

        let cost_of_reviews = training.column(if spread_review_penalty {
            "spread_cost_of_review"
        } else {
            "total_cost_of_review"
        })?;
        let revenues = training
            .column("sales")?
            .mul_scalar(self.economics.platform_cut)?;
        let profits = revenues.sub(cost_of_reviews)?;

        debug!(
            "product training data: {} rows (spread_review_penalty={})",
            training.row_count(),
            spread_review_penalty
        );
        training
            .with_column("revenues", revenues)?
            .with_column("profits", profits)
    }

    /// Category-grain aggregation of [`ProductMetrics::training_data`].
    ///
    /// `agg` names the aggregation applied to every numeric column
    /// (`quantity` is always summed); see [`AggFunc`] for accepted names.
    pub fn product_cat(&self, spread_review_penalty: bool, agg: &str) -> Result<Table> {
        let agg: AggFunc = agg.parse().in_accessor("product.product_cat")?;
        CategoryAggregator::new(self.clone()).aggregate(spread_review_penalty, agg)
    }

    /// Distinct (order_id, product_id) pairs from the order items.
    fn order_products(&self) -> Result<Table> {
        Ok(self
            .data
            .table(TableName::OrderItems)?
            .select(&["order_id", "product_id"])?
            .distinct())
    }
}
