//! A tiny Olist dataset for integration tests
//!
//! The tables are written as raw CSV text, the way they appear on disk, and
//! parsed with the crate's own reader so that type inference is exercised too.
//!
//! Orders:
//! - o1: delivered, items p1, p1, p2, review 1
//! - o2: delivered, item p1, review 5
//! - o3: shipped (no delivery date), item p3, review 3
//! - o4: delivered, item p2, review 4, customer outside the geolocation table
//! - o5: delivered, item p3, review 2

use std::fs;
use std::path::Path;
use std::sync::Arc;

use olist_features::io::read_csv_from_reader;
use olist_features::{DataConfig, DataSource, Table, Value};

pub const ORDERS_CSV: &str = "\
order_id,customer_id,order_status,order_purchase_timestamp,order_delivered_customer_date,order_estimated_delivery_date
o1,c1,delivered,2020-01-01 00:00:00,2020-01-05 00:00:00,2020-01-10 00:00:00
o2,c2,delivered,2020-01-02 00:00:00,2020-01-04 12:00:00,2020-01-03 00:00:00
o3,c1,shipped,2020-01-03 00:00:00,,2020-01-12 00:00:00
o4,c3,delivered,2020-01-04 00:00:00,2020-01-08 00:00:00,2020-01-08 00:00:00
o5,c2,delivered,2020-02-01 00:00:00,2020-02-03 00:00:00,2020-02-10 00:00:00
";

pub const ORDER_ITEMS_CSV: &str = "\
order_id,order_item_id,product_id,seller_id,shipping_limit_date,price,freight_value
o1,1,p1,s1,2020-01-03 00:00:00,10.00,2.00
o1,2,p1,s1,2020-01-03 00:00:00,10.00,2.00
o1,3,p2,s2,2020-01-03 00:00:00,30.00,5.00
o2,1,p1,s1,2020-01-04 00:00:00,12.00,3.00
o3,1,p3,s2,2020-01-05 00:00:00,50.00,4.00
o4,1,p2,s2,2020-01-06 00:00:00,20.00,1.00
o5,1,p3,s2,2020-02-02 00:00:00,40.00,6.00
";

pub const ORDER_REVIEWS_CSV: &str = "\
review_id,order_id,review_score,review_comment_title,review_creation_date
r1,o1,1,,2020-01-06 00:00:00
r2,o2,5,,2020-01-05 00:00:00
r3,o3,3,,2020-01-13 00:00:00
r4,o4,4,,2020-01-09 00:00:00
r5,o5,2,,2020-02-04 00:00:00
";

pub const PRODUCTS_CSV: &str = "\
product_id,product_category_name,product_name_lenght,product_description_lenght,product_photos_qty,product_weight_g,product_length_cm,product_height_cm,product_width_cm
p1,brinquedos,40,300,2,500,20,10,15
p2,brinquedos,50,500,1,1500,30,20,25
p3,artes,30,200,4,200,10,5,5
p4,,20,100,1,100,10,10,10
";

pub const CATEGORY_TRANSLATION_CSV: &str = "\
product_category_name,product_category_name_english
brinquedos,toys
artes,art
";

pub const SELLERS_CSV: &str = "\
seller_id,seller_zip_code_prefix,seller_city,seller_state
s1,1001,sao paulo,SP
s2,20010,rio de janeiro,RJ
";

pub const CUSTOMERS_CSV: &str = "\
customer_id,customer_unique_id,customer_zip_code_prefix,customer_city,customer_state
c1,u1,1001,sao paulo,SP
c2,u2,20010,rio de janeiro,RJ
c3,u3,99999,nowhere,XX
";

pub const GEOLOCATION_CSV: &str = "\
geolocation_zip_code_prefix,geolocation_lat,geolocation_lng,geolocation_city,geolocation_state
1001,-23.50,-46.60,sao paulo,SP
1001,-23.60,-46.66,sao paulo,SP
20010,-22.9068,-43.1729,rio de janeiro,RJ
";

/// Distance in km between the averaged 1001 point and 20010.
pub const SAO_PAULO_RIO_KM: f64 = 360.408;

/// File names as they appear in the Olist download, with their content
pub fn olist_csv_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("olist_orders_dataset.csv", ORDERS_CSV),
        ("olist_order_items_dataset.csv", ORDER_ITEMS_CSV),
        ("olist_order_reviews_dataset.csv", ORDER_REVIEWS_CSV),
        ("olist_products_dataset.csv", PRODUCTS_CSV),
        ("product_category_name_translation.csv", CATEGORY_TRANSLATION_CSV),
        ("olist_sellers_dataset.csv", SELLERS_CSV),
        ("olist_customers_dataset.csv", CUSTOMERS_CSV),
        ("olist_geolocation_dataset.csv", GEOLOCATION_CSV),
    ]
}

/// Parsed fixture tables keyed by table name
pub fn olist_tables() -> Vec<(String, Table)> {
    let config = DataConfig::default();
    olist_csv_files()
        .into_iter()
        .map(|(file, content)| {
            let stem = file.trim_end_matches(".csv");
            let table = read_csv_from_reader(content.as_bytes()).expect("fixture CSV must parse");
            (config.table_key(stem), table)
        })
        .collect()
}

/// In-memory source over the full fixture
pub fn olist_source() -> Arc<DataSource> {
    Arc::new(DataSource::from_tables(olist_tables()))
}

/// In-memory source over the fixture, without the named table
pub fn olist_source_without(missing: &str) -> Arc<DataSource> {
    Arc::new(DataSource::from_tables(
        olist_tables()
            .into_iter()
            .filter(|(name, _)| name != missing),
    ))
}

/// In-memory source with one table replaced
pub fn olist_source_with(name: &str, csv: &str) -> Arc<DataSource> {
    let replacement = read_csv_from_reader(csv.as_bytes()).expect("replacement CSV must parse");
    Arc::new(DataSource::from_tables(olist_tables().into_iter().map(
        |(table_name, table)| {
            if table_name == name {
                (table_name, replacement.clone())
            } else {
                (table_name, table)
            }
        },
    )))
}

/// Write the fixture files into `dir`
pub fn write_olist_dir(dir: &Path) {
    for (file, content) in olist_csv_files() {
        fs::write(dir.join(file), content).expect("failed to write fixture file");
    }
}

/// Row index of the first row whose `column` holds the string `key`
pub fn row_of(table: &Table, column: &str, key: &str) -> usize {
    (0..table.row_count())
        .find(|&row| table.value(row, column).unwrap() == Value::from(key))
        .unwrap_or_else(|| panic!("no row with {} = {}", column, key))
}

/// Numeric cell looked up by a string key
pub fn f64_at(table: &Table, key_column: &str, key: &str, column: &str) -> f64 {
    let row = row_of(table, key_column, key);
    table
        .value(row, column)
        .unwrap()
        .as_f64()
        .unwrap_or_else(|| panic!("{} of {} is not numeric", column, key))
}

/// Any cell looked up by a string key
pub fn value_at(table: &Table, key_column: &str, key: &str, column: &str) -> Value {
    let row = row_of(table, key_column, key);
    table.value(row, column).unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Same column names and the same values cell by cell
pub fn assert_same_table(a: &Table, b: &Table) {
    assert_eq!(a.column_names(), b.column_names());
    assert_eq!(a.row_count(), b.row_count());
    for name in a.column_names() {
        assert_eq!(
            a.column(name).unwrap().values(),
            b.column(name).unwrap().values(),
            "column {} differs",
            name
        );
    }
}
