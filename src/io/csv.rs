use csv::{ReaderBuilder, Writer};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::column::{BooleanColumn, Column, Float64Column, Int64Column, StringColumn};
use crate::error::Result;
use crate::table::Table;

/// CSVファイルから表を読み込む
///
/// 1行目はヘッダーとして扱う。列の型は Int64 → Float64 → Boolean → String の
/// 順に推論し、空のフィールドはNULLになる。
///
/// # Arguments
/// * `path` - CSVファイルのパス
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let file = File::open(path.as_ref())?;
    read_csv_from_reader(file)
}

/// 任意のリーダーからCSVを読み込む
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<Table> {
    // CSVリーダーを設定
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    // 列データの収集用バッファ
    let mut str_buffers: Vec<Vec<String>> = headers.iter().map(|_| Vec::new()).collect();

    for result in rdr.records() {
        let record = result?;
        for (i, buffer) in str_buffers.iter_mut().enumerate() {
            // 不足分は空文字列（NULL）
            buffer.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let mut table = Table::new();
    for (header, values) in headers.into_iter().zip(str_buffers) {
        table.add_column(header, infer_column(&values))?;
    }

    Ok(table)
}

/// 文字列データから列の型を推論する
fn infer_column(values: &[String]) -> Column {
    let non_empty: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();

    // すべて空の場合は文字列型
    if non_empty.is_empty() {
        return Column::String(StringColumn::from_options(vec![None; values.len()]));
    }

    // 整数型として解析を試みる
    if non_empty.iter().all(|s| s.parse::<i64>().is_ok()) {
        return Column::Int64(Int64Column::from_options(
            values.iter().map(|s| s.parse::<i64>().ok()).collect(),
        ));
    }

    // 浮動小数点型として解析を試みる
    if non_empty.iter().all(|s| s.parse::<f64>().is_ok()) {
        return Column::Float64(Float64Column::from_options(
            values.iter().map(|s| s.parse::<f64>().ok()).collect(),
        ));
    }

    // ブール型として解析を試みる
    if non_empty.iter().all(|s| parse_bool(s).is_some()) {
        return Column::Boolean(BooleanColumn::from_options(
            values.iter().map(|s| parse_bool(s)).collect(),
        ));
    }

    // デフォルトは文字列型
    Column::String(StringColumn::from_options(
        values
            .iter()
            .map(|s| (!s.is_empty()).then(|| s.clone()))
            .collect(),
    ))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// 表をCSVファイルに書き込む（NULLは空フィールド）
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_csv_to_writer(table, file)
}

/// 任意のライターにCSVを書き込む
pub fn write_csv_to_writer<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    // ヘッダー行を書き込む
    wtr.write_record(table.column_names())?;

    for i in 0..table.row_count() {
        let row: Vec<String> = table
            .iter_columns()
            .map(|(_, column)| column.value_at(i).to_csv_field())
            .collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
