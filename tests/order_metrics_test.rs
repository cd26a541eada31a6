mod common;

use chrono::TimeDelta;
use olist_features::column::ColumnType;
use olist_features::error::Result;
use olist_features::order::TRAINING_COLUMNS;
use olist_features::{Error, OrderMetrics, Value};

use common::*;

fn metrics() -> OrderMetrics {
    OrderMetrics::new(olist_source())
}

#[test]
fn test_wait_time_of_delivered_orders() -> Result<()> {
    let wait = metrics().wait_time(true)?;

    assert_eq!(
        wait.column_names(),
        &["order_id", "wait_time", "expected_wait_time", "delay_vs_expected", "order_status"]
    );
    // o3 is not delivered
    assert_eq!(wait.row_count(), 4);
    assert!((0..wait.row_count()).all(|i| wait.value(i, "order_id").unwrap() != Value::from("o3")));
    assert_eq!(wait.column_type("wait_time")?, ColumnType::Duration);
    assert_eq!(wait.column_type("delay_vs_expected")?, ColumnType::Float64);

    // bought 2020-01-01, delivered 2020-01-05, estimated 2020-01-10
    assert_eq!(
        value_at(&wait, "order_id", "o1", "wait_time"),
        Value::Duration(TimeDelta::days(4))
    );
    assert_eq!(
        value_at(&wait, "order_id", "o1", "expected_wait_time"),
        Value::Duration(TimeDelta::days(-5))
    );
    assert_close(f64_at(&wait, "order_id", "o1", "delay_vs_expected"), 9.0);

    // half-day durations
    assert_eq!(
        value_at(&wait, "order_id", "o2", "wait_time"),
        Value::Duration(TimeDelta::hours(60))
    );
    assert_close(f64_at(&wait, "order_id", "o2", "delay_vs_expected"), 1.0);

    Ok(())
}

#[test]
fn test_wait_time_without_filter_keeps_nulls() -> Result<()> {
    let wait = metrics().wait_time(false)?;

    assert_eq!(wait.row_count(), 5);
    assert!(value_at(&wait, "order_id", "o3", "wait_time").is_null());
    assert!(value_at(&wait, "order_id", "o3", "delay_vs_expected").is_null());
    assert_eq!(
        value_at(&wait, "order_id", "o3", "order_status"),
        Value::from("shipped")
    );

    Ok(())
}

#[test]
fn test_malformed_timestamp_is_conversion_error() {
    let orders = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_delivered_customer_date,order_estimated_delivery_date
o1,c1,delivered,2020-01-01 00:00:00,last tuesday,2020-01-10 00:00:00
";
    let metrics = OrderMetrics::new(olist_source_with("orders", orders));
    let err = metrics.wait_time(true).unwrap_err();

    assert_eq!(err.accessor_path(), vec!["order.wait_time"]);
    assert!(matches!(
        err.root(),
        Error::TypeConversion { column, value, .. }
            if column == "order_delivered_customer_date" && value == "last tuesday"
    ));
}

#[test]
fn test_review_score_flags() -> Result<()> {
    let reviews = metrics().review_score()?;

    assert_eq!(
        reviews.column_names(),
        &["order_id", "dim_is_five_star", "dim_is_one_star", "review_score"]
    );
    assert_eq!(reviews.row_count(), 5);

    assert_eq!(value_at(&reviews, "order_id", "o1", "dim_is_one_star"), Value::Int64(1));
    assert_eq!(value_at(&reviews, "order_id", "o2", "dim_is_five_star"), Value::Int64(1));
    assert_eq!(value_at(&reviews, "order_id", "o4", "dim_is_five_star"), Value::Int64(0));

    // never both five and one star
    for i in 0..reviews.row_count() {
        let five = reviews.value(i, "dim_is_five_star")?.as_i64().unwrap();
        let one = reviews.value(i, "dim_is_one_star")?.as_i64().unwrap();
        assert!(five + one <= 1);
    }

    Ok(())
}

#[test]
fn test_null_review_score_sets_no_flag() -> Result<()> {
    let reviews = "review_id,order_id,review_score\nr1,o1,\nr2,o2,5\n";
    let metrics = OrderMetrics::new(olist_source_with("order_reviews", reviews));
    let scores = metrics.review_score()?;

    assert_eq!(value_at(&scores, "order_id", "o1", "dim_is_five_star"), Value::Int64(0));
    assert_eq!(value_at(&scores, "order_id", "o1", "dim_is_one_star"), Value::Int64(0));
    Ok(())
}

#[test]
fn test_item_counts_and_sums() -> Result<()> {
    let metrics = metrics();

    let products = metrics.number_of_products()?;
    assert_eq!(products.column_names(), &["order_id", "number_of_products"]);
    assert_eq!(value_at(&products, "order_id", "o1", "number_of_products"), Value::Int64(3));
    assert_eq!(value_at(&products, "order_id", "o2", "number_of_products"), Value::Int64(1));

    // item rows, not sellers: o1 has 2 sellers but 3 rows
    let sellers = metrics.number_of_sellers()?;
    assert_eq!(sellers.column_names(), &["order_id", "number_of_sellers"]);
    assert_eq!(value_at(&sellers, "order_id", "o1", "number_of_sellers"), Value::Int64(3));

    let price = metrics.price_and_freight()?;
    assert_eq!(price.column_names(), &["order_id", "price", "freight_value"]);
    assert_eq!(price.row_count(), 5);
    assert_close(f64_at(&price, "order_id", "o1", "price"), 50.0);
    assert_close(f64_at(&price, "order_id", "o1", "freight_value"), 9.0);

    Ok(())
}

#[test]
fn test_distance_seller_customer() -> Result<()> {
    let distance = metrics().distance_seller_customer()?;

    assert_eq!(distance.column_names(), &["order_id", "distance_seller_customer"]);
    // o4 customer cannot be located
    assert_eq!(distance.row_count(), 4);
    assert!((0..distance.row_count()).all(|i| distance.value(i, "order_id").unwrap() != Value::from("o4")));

    let o2 = f64_at(&distance, "order_id", "o2", "distance_seller_customer");
    assert!((o2 - SAO_PAULO_RIO_KM).abs() < 0.01, "{}", o2);

    // o1: mean of a same-city seller (0 km) and the Rio seller
    let o1 = f64_at(&distance, "order_id", "o1", "distance_seller_customer");
    assert!((o1 - o2 / 2.0).abs() < 1e-6);

    assert!(f64_at(&distance, "order_id", "o5", "distance_seller_customer").abs() < 1e-9);

    Ok(())
}

#[test]
fn test_training_data_is_clean() -> Result<()> {
    let training = metrics().training_data(true, false)?;

    assert_eq!(training.column_names(), &TRAINING_COLUMNS);
    assert_eq!(training.row_count(), 4);
    for name in training.column_names() {
        assert_eq!(training.column(name)?.null_count(), 0, "{} has nulls", name);
    }

    assert_eq!(value_at(&training, "order_id", "o1", "number_of_products"), Value::Int64(3));
    assert_eq!(value_at(&training, "order_id", "o1", "review_score"), Value::Int64(1));
    assert_close(f64_at(&training, "order_id", "o5", "price"), 40.0);

    // undelivered orders are kept by the filter but dropped for their null wait_time
    let unfiltered = metrics().training_data(false, false)?;
    assert_eq!(unfiltered.row_count(), 4);

    Ok(())
}

#[test]
fn test_training_data_with_distance() -> Result<()> {
    let training = metrics().training_data(true, true)?;

    assert_eq!(training.column_count(), TRAINING_COLUMNS.len() + 1);
    assert_eq!(
        training.column_names().last().map(String::as_str),
        Some("distance_seller_customer")
    );
    assert_eq!(training.row_count(), 3);

    Ok(())
}

#[test]
fn test_repeated_calls_are_identical() -> Result<()> {
    let metrics = metrics();
    assert_same_table(&metrics.training_data(true, false)?, &metrics.training_data(true, false)?);
    assert_same_table(&metrics.wait_time(false)?, &metrics.wait_time(false)?);
    Ok(())
}

#[test]
fn test_missing_table_names_accessor() {
    let metrics = OrderMetrics::new(olist_source_without("order_items"));
    let err = metrics.training_data(true, false).unwrap_err();

    assert_eq!(
        err.accessor_path(),
        vec!["order.training_data", "order.number_of_products"]
    );
    assert!(matches!(err.root(), Error::TableNotFound(name) if name == "order_items"));
}
