//! 表のグループ化と集計機能

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::core::Table;
use crate::column::duration_column::{from_nanos, nanos};
use crate::column::{Column, ColumnType, Int64Column, KeyValue, Value};
use crate::error::{Error, Result};

/// 集計操作を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFunc {
    /// 件数（NULLを除く）
    Count,
    /// 合計
    Sum,
    /// 平均
    Mean,
    /// 中央値
    Median,
    /// 最小値
    Min,
    /// 最大値
    Max,
    /// 標本標準偏差
    Std,
    /// ユニーク値の数
    NUnique,
}

impl AggFunc {
    pub fn as_str(self) -> &'static str {
        match self {
            AggFunc::Count => "count",
            AggFunc::Sum => "sum",
            AggFunc::Mean => "mean",
            AggFunc::Median => "median",
            AggFunc::Min => "min",
            AggFunc::Max => "max",
            AggFunc::Std => "std",
            AggFunc::NUnique => "nunique",
        }
    }

    /// 入力列の型に対する集計結果の型
    pub fn output_type(self, input: ColumnType) -> Result<ColumnType> {
        use ColumnType::*;
        let output = match (self, input) {
            (AggFunc::Count | AggFunc::NUnique, _) => Int64,
            (AggFunc::Min | AggFunc::Max, t) => t,
            (AggFunc::Sum, Int64 | Boolean) => Int64,
            (AggFunc::Sum, Float64) => Float64,
            (AggFunc::Sum, Duration) => Duration,
            (AggFunc::Mean | AggFunc::Median | AggFunc::Std, Int64 | Float64 | Boolean) => Float64,
            (AggFunc::Mean | AggFunc::Median | AggFunc::Std, Duration) => Duration,
            (func, t) => {
                return Err(Error::InvalidOperation(format!(
                    "cannot apply {} to a {:?} column",
                    func, t
                )))
            }
        };
        Ok(output)
    }
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggFunc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "count" => Ok(AggFunc::Count),
            "sum" => Ok(AggFunc::Sum),
            "mean" => Ok(AggFunc::Mean),
            "median" => Ok(AggFunc::Median),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            "std" => Ok(AggFunc::Std),
            "nunique" => Ok(AggFunc::NUnique),
            other => Err(Error::InvalidInput(format!(
                "unknown aggregation function: {}",
                other
            ))),
        }
    }
}

/// 1つの集計指定（入力列、集計関数、出力列名）
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub column: String,
    pub func: AggFunc,
    pub alias: String,
}

impl Aggregation {
    /// 出力列名は入力列名と同じ
    pub fn new(column: impl Into<String>, func: AggFunc) -> Self {
        let column = column.into();
        Self {
            alias: column.clone(),
            column,
            func,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

/// グループ化結果を表す構造体
pub struct GroupBy<'a> {
    /// 元の表
    table: &'a Table,
    /// グループ化キー列
    keys: Vec<String>,
    /// キーの昇順に並んだグループと各グループの行インデックス
    groups: Vec<(Vec<KeyValue>, Vec<usize>)>,
}

impl Table {
    /// 表をグループ化
    ///
    /// キーのいずれかがNULLの行はどのグループにも入らない。
    /// グループはキーの昇順に並ぶ。
    pub fn group_by<I, S>(&self, columns: I) -> Result<GroupBy<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = columns
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        if keys.is_empty() {
            return Err(Error::InvalidInput("group_by needs at least one key column".to_string()));
        }

        let key_columns: Vec<&Column> = keys
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<_>>()?;

        let mut groups: BTreeMap<Vec<KeyValue>, Vec<usize>> = BTreeMap::new();
        for row in 0..self.row_count {
            let key: Option<Vec<KeyValue>> = key_columns.iter().map(|c| c.key_at(row)).collect();
            if let Some(key) = key {
                groups.entry(key).or_default().push(row);
            }
        }

        Ok(GroupBy {
            table: self,
            keys,
            groups: groups.into_iter().collect(),
        })
    }
}

impl<'a> GroupBy<'a> {
    /// キー列と集計列からなる表を作成する
    pub fn agg(&self, aggregations: &[Aggregation]) -> Result<Table> {
        let first_rows: Vec<usize> = self.groups.iter().map(|(_, rows)| rows[0]).collect();

        let mut result = Table::new();
        for key in &self.keys {
            result.add_column(key.clone(), self.table.column(key)?.take(&first_rows))?;
        }

        for aggregation in aggregations {
            let column = self.table.column(&aggregation.column)?;
            let output_type = aggregation.func.output_type(column.column_type())?;
            let values: Vec<Value> = self
                .groups
                .iter()
                .map(|(_, rows)| aggregate(column, rows, aggregation.func))
                .collect();
            result.add_column(
                aggregation.alias.clone(),
                Column::from_values(output_type, &values)?,
            )?;
        }

        Ok(result)
    }

    /// グループごとの行数
    pub fn count_rows(&self, alias: &str) -> Result<Table> {
        let mut result = self.agg(&[])?;
        let sizes: Vec<i64> = self.groups.iter().map(|(_, rows)| rows.len() as i64).collect();
        result.add_column(alias, Int64Column::new(sizes))?;
        Ok(result)
    }

    /// 元の各行に、その行が属するグループ内の非NULL件数を割り当てた列
    ///
    /// キーがNULLの行はNULLになる。
    pub fn transform_count(&self, column: &str) -> Result<Column> {
        let source = self.table.column(column)?;
        let mut counts: Vec<Option<i64>> = vec![None; self.table.row_count];

        for (_, rows) in &self.groups {
            let count = rows.iter().filter(|&&row| !source.is_null(row)).count() as i64;
            for &row in rows {
                counts[row] = Some(count);
            }
        }

        Ok(Column::Int64(Int64Column::from_options(counts)))
    }
}

/// 1グループ分の集計値を計算する
fn aggregate(column: &Column, rows: &[usize], func: AggFunc) -> Value {
    let present: Vec<usize> = rows.iter().copied().filter(|&r| !column.is_null(r)).collect();

    match func {
        AggFunc::Count => Value::Int64(present.len() as i64),
        AggFunc::NUnique => {
            let distinct: HashSet<KeyValue> = present.iter().filter_map(|&r| column.key_at(r)).collect();
            Value::Int64(distinct.len() as i64)
        }
        AggFunc::Min => present
            .iter()
            .copied()
            .min_by_key(|&r| column.key_at(r))
            .map_or(Value::Null, |r| column.value_at(r)),
        AggFunc::Max => present
            .iter()
            .copied()
            .max_by_key(|&r| column.key_at(r))
            .map_or(Value::Null, |r| column.value_at(r)),
        AggFunc::Sum => match column.take(&present) {
            Column::Int64(c) => Value::Int64(c.sum()),
            Column::Float64(c) => Value::Float64(c.sum()),
            Column::Duration(c) => Value::Duration(c.sum()),
            _ => Value::Int64(
                present
                    .iter()
                    .filter_map(|&r| column.value_at(r).as_i64())
                    .sum(),
            ),
        },
        AggFunc::Mean => match column.take(&present) {
            Column::Int64(c) => c.mean().map_or(Value::Null, Value::Float64),
            Column::Float64(c) => c.mean().map_or(Value::Null, Value::Float64),
            Column::Duration(c) => c.mean().map_or(Value::Null, Value::Duration),
            _ => reduce(&float_values(column, &present), func).map_or(Value::Null, Value::Float64),
        },
        AggFunc::Median if column.column_type() == ColumnType::Duration => {
            let mut values: Vec<i128> = present
                .iter()
                .filter_map(|&r| column.value_at(r).as_duration())
                .map(|d| nanos(&d))
                .collect();
            values.sort_unstable();
            let mid = values.len() / 2;
            match values.len() {
                0 => Value::Null,
                n if n % 2 == 0 => Value::Duration(from_nanos((values[mid - 1] + values[mid]) / 2)),
                _ => Value::Duration(from_nanos(values[mid])),
            }
        }
        AggFunc::Median | AggFunc::Std => {
            if let Column::Duration(c) = column {
                // 標準偏差はf64のナノ秒で計算し、整数ナノ秒に丸める
                let values: Vec<f64> = present
                    .iter()
                    .filter_map(|&r| c.value_at(r))
                    .map(|d| nanos(d) as f64)
                    .collect();
                reduce(&values, func)
                    .map_or(Value::Null, |n| Value::Duration(from_nanos(n.round() as i128)))
            } else {
                reduce(&float_values(column, &present), func).map_or(Value::Null, Value::Float64)
            }
        }
    }
}

fn float_values(column: &Column, rows: &[usize]) -> Vec<f64> {
    rows.iter()
        .filter_map(|&r| column.value_at(r).as_f64())
        .collect()
}

/// 平均・中央値・標本標準偏差（値がなければNone）
fn reduce(values: &[f64], func: AggFunc) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    match func {
        AggFunc::Mean => Some(mean),
        AggFunc::Median => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                Some((sorted[mid - 1] + sorted[mid]) / 2.0)
            } else {
                Some(sorted[mid])
            }
        }
        AggFunc::Std => {
            if values.len() < 2 {
                return None;
            }
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(var.sqrt())
        }
        _ => None,
    }
}
