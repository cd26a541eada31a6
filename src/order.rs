//! Order-grain features: one row per order.

use log::debug;
use std::sync::Arc;

use crate::column::{Column, ColumnType, Float64Column, Value};
use crate::data::{DataSource, TableName};
use crate::error::{Result, ResultExt};
use crate::geo::haversine_distance;
use crate::table::{AggFunc, Aggregation, Table};

/// Columns returned by [`OrderMetrics::training_data`], in order.
pub const TRAINING_COLUMNS: [&str; 12] = [
    "order_id",
    "wait_time",
    "expected_wait_time",
    "delay_vs_expected",
    "order_status",
    "dim_is_five_star",
    "dim_is_one_star",
    "review_score",
    "number_of_products",
    "number_of_sellers",
    "price",
    "freight_value",
];

const DELIVERED: &str = "delivered";

/// Computes per-order features from the raw Olist tables.
#[derive(Debug, Clone)]
pub struct OrderMetrics {
    data: Arc<DataSource>,
}

impl OrderMetrics {
    pub fn new(data: Arc<DataSource>) -> Self {
        Self { data }
    }

    /// `[order_id, wait_time, expected_wait_time, delay_vs_expected, order_status]`
    ///
    /// Keeps only delivered orders when `filter_delivered` is set. Orders
    /// without a delivery date keep a null wait time.
    pub fn wait_time(&self, filter_delivered: bool) -> Result<Table> {
        self.compute_wait_time(filter_delivered)
            .in_accessor("order.wait_time")
    }

    fn compute_wait_time(&self, filter_delivered: bool) -> Result<Table> {
        let mut orders = self.data.table(TableName::Orders)?;
        if filter_delivered {
            orders = orders.filter_by("order_status", |status| status.as_str() == Some(DELIVERED))?;
        }
        debug!("computing wait time for {} orders", orders.row_count());

        let timestamp = |name: &str| -> Result<Column> { orders.column(name)?.to_datetime(name) };
        let purchased = timestamp("order_purchase_timestamp")?;
        let delivered = timestamp("order_delivered_customer_date")?;
        let estimated = timestamp("order_estimated_delivery_date")?;

        let wait_time = delivered.sub(&purchased)?;
        let expected_wait_time = delivered.sub(&estimated)?;
        let delay_vs_expected = wait_time
            .sub(&expected_wait_time)?
            .duration_days("delay_vs_expected")?;

        Table::from_columns(vec![
            ("order_id", orders.column("order_id")?.clone()),
            ("wait_time", wait_time),
            ("expected_wait_time", expected_wait_time),
            ("delay_vs_expected", delay_vs_expected),
            ("order_status", orders.column("order_status")?.clone()),
        ])
    }

    /// `[order_id, dim_is_five_star, dim_is_one_star, review_score]`, one row per review.
    pub fn review_score(&self) -> Result<Table> {
        self.compute_review_score().in_accessor("order.review_score")
    }

    fn compute_review_score(&self) -> Result<Table> {
        let reviews = self.data.table(TableName::OrderReviews)?;

        let flag = |predicate: fn(f64) -> bool| {
            reviews.map_values("review_score", ColumnType::Int64, move |score| {
                Value::Int64(score.as_f64().map_or(0, |s| predicate(s) as i64))
            })
        };
        let five_star = flag(|s| s > 4.0)?;
        let one_star = flag(|s| s < 2.0)?;

        Table::from_columns(vec![
            ("order_id", reviews.column("order_id")?.clone()),
            ("dim_is_five_star", five_star),
            ("dim_is_one_star", one_star),
            ("review_score", reviews.column("review_score")?.clone()),
        ])
    }

    /// `[order_id, number_of_products]`: item rows per order.
    pub fn number_of_products(&self) -> Result<Table> {
        self.data
            .table(TableName::OrderItems)
            .and_then(|items| items.group_by(["order_id"])?.count_rows("number_of_products"))
            .in_accessor("order.number_of_products")
    }

    /// `[order_id, number_of_sellers]`
    ///
    /// Counts the seller entries of the order's items, so an order with two
    /// items from the same seller reports 2.
    pub fn number_of_sellers(&self) -> Result<Table> {
        self.compute_number_of_sellers()
            .in_accessor("order.number_of_sellers")
    }

    fn compute_number_of_sellers(&self) -> Result<Table> {
        let orders = self.data.table(TableName::Orders)?.select(&["order_id"])?;
        let items = self
            .data
            .table(TableName::OrderItems)?
            .select(&["order_id", "seller_id"])?;

        orders
            .merge(&items, &["order_id"])?
            .group_by(["order_id"])?
            .agg(&[Aggregation::new("seller_id", AggFunc::Count).alias("number_of_sellers")])
    }

    /// `[order_id, price, freight_value]`: per-order sums over the items.
    pub fn price_and_freight(&self) -> Result<Table> {
        self.data
            .table(TableName::OrderItems)
            .and_then(|items| {
                items.group_by(["order_id"])?.agg(&[
                    Aggregation::new("price", AggFunc::Sum),
                    Aggregation::new("freight_value", AggFunc::Sum),
                ])
            })
            .in_accessor("order.price_and_freight")
    }

    /// `[order_id, distance_seller_customer]`
    ///
    /// Mean haversine distance in km between the customer and each distinct
    /// seller of the order. Zip prefixes are located at the average of their
    /// geolocation points; orders that cannot be located are dropped.
    pub fn distance_seller_customer(&self) -> Result<Table> {
        self.compute_distance_seller_customer()
            .in_accessor("order.distance_seller_customer")
    }

    fn compute_distance_seller_customer(&self) -> Result<Table> {
        let geo = self
            .data
            .table(TableName::Geolocation)?
            .group_by(["geolocation_zip_code_prefix"])?
            .agg(&[
                Aggregation::new("geolocation_lat", AggFunc::Mean),
                Aggregation::new("geolocation_lng", AggFunc::Mean),
            ])?;

        let locate = |table: TableName, id: &str, zip: &str, lat: &str, lng: &str| -> Result<Table> {
            self.data
                .table(table)?
                .select(&[id, zip])?
                .rename(&[(zip, "geolocation_zip_code_prefix")])?
                .merge(&geo, &["geolocation_zip_code_prefix"])?
                .select(&[id, "geolocation_lat", "geolocation_lng"])?
                .rename(&[("geolocation_lat", lat), ("geolocation_lng", lng)])
        };
        let sellers = locate(
            TableName::Sellers,
            "seller_id",
            "seller_zip_code_prefix",
            "seller_lat",
            "seller_lng",
        )?;
        let customers = locate(
            TableName::Customers,
            "customer_id",
            "customer_zip_code_prefix",
            "customer_lat",
            "customer_lng",
        )?;

        let order_sellers = self
            .data
            .table(TableName::OrderItems)?
            .select(&["order_id", "seller_id"])?
            .distinct();
        let pairs = self
            .data
            .table(TableName::Orders)?
            .select(&["order_id", "customer_id"])?
            .merge(&order_sellers, &["order_id"])?
            .merge(&sellers, &["seller_id"])?
            .merge(&customers, &["customer_id"])?;
        debug!("locating {} seller/customer pairs", pairs.row_count());

        let coords: Vec<Float64Column> = ["seller_lat", "seller_lng", "customer_lat", "customer_lng"]
            .iter()
            .map(|name| pairs.column(name)?.to_float64())
            .collect::<Result<_>>()?;
        let distances: Vec<Option<f64>> = (0..pairs.row_count())
            .map(|row| {
                let c: Option<Vec<f64>> = coords.iter().map(|col| col.value_at(row).copied()).collect();
                c.map(|c| haversine_distance(c[0], c[1], c[2], c[3]))
            })
            .collect();

        pairs
            .with_column("distance", Column::Float64(Float64Column::from_options(distances)))?
            .group_by(["order_id"])?
            .agg(&[Aggregation::new("distance", AggFunc::Mean).alias("distance_seller_customer")])
    }

    /// Clean order-level training table.
    ///
    /// Joins the orders with their wait time (on `order_id` and
    /// `order_status`), review score, number of products, price and freight
    /// and number of sellers, keeps [`TRAINING_COLUMNS`] (plus
    /// `distance_seller_customer` when requested) and drops every row that
    /// still holds a null.
    pub fn training_data(
        &self,
        filter_delivered: bool,
        with_distance_seller_customer: bool,
    ) -> Result<Table> {
        self.compute_training_data(filter_delivered, with_distance_seller_customer)
            .in_accessor("order.training_data")
    }

    fn compute_training_data(
        &self,
        filter_delivered: bool,
        with_distance_seller_customer: bool,
    ) -> Result<Table> {
        let orders = self.data.table(TableName::Orders)?;

        let mut training = orders
            .merge(&self.wait_time(filter_delivered)?, &["order_id", "order_status"])?
            .merge(&self.review_score()?, &["order_id"])?
            .merge(&self.number_of_products()?, &["order_id"])?
            .merge(&self.price_and_freight()?, &["order_id"])?
            .merge(&self.number_of_sellers()?, &["order_id"])?;

        let mut columns = TRAINING_COLUMNS.to_vec();
        if with_distance_seller_customer {
            training = training.merge(&self.distance_seller_customer()?, &["order_id"])?;
            columns.push("distance_seller_customer");
        }

        let training = training.select(&columns)?.drop_nulls();
        debug!("order training data: {} rows", training.row_count());
        Ok(training)
    }
}
