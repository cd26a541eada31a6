use chrono::TimeDelta;

use crate::column::common::{Column, ColumnType, ColumnValue, TypedColumn};
use crate::column::value::{KeyValue, Value};
use crate::error::{Error, Result};

/// 期間型の列
pub type DurationColumn = TypedColumn<TimeDelta>;

const NANOS_PER_SEC: i128 = 1_000_000_000;
const NANOS_PER_DAY: f64 = 86_400.0 * 1e9;

impl ColumnValue for TimeDelta {
    const COLUMN_TYPE: ColumnType = ColumnType::Duration;

    fn placeholder() -> Self {
        TimeDelta::zero()
    }

    fn to_value(&self) -> Value {
        Value::Duration(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_duration()
    }

    fn key(&self) -> KeyValue {
        KeyValue::Duration(*self)
    }
}

/// 期間をナノ秒に変換する
pub fn nanos(d: &TimeDelta) -> i128 {
    d.num_seconds() as i128 * NANOS_PER_SEC + d.subsec_nanos() as i128
}

/// ナノ秒から期間に戻す
pub fn from_nanos(n: i128) -> TimeDelta {
    let secs = n.div_euclid(NANOS_PER_SEC);
    let rest = n.rem_euclid(NANOS_PER_SEC);
    TimeDelta::seconds(secs as i64) + TimeDelta::nanoseconds(rest as i64)
}

impl DurationColumn {
    /// データの合計を計算する（NULL値を除く）
    pub fn sum(&self) -> TimeDelta {
        from_nanos(self.iter().flatten().map(nanos).sum())
    }

    /// データの平均を計算する（NULL値を除く）
    pub fn mean(&self) -> Option<TimeDelta> {
        let values: Vec<i128> = self.iter().flatten().map(nanos).collect();
        if values.is_empty() {
            return None;
        }
        let total: i128 = values.iter().sum();
        Some(from_nanos(total / values.len() as i128))
    }
}

impl Column {
    /// 期間列を日数（Float64）に変換する
    pub fn duration_days(&self, name: &str) -> Result<Column> {
        match self {
            Column::Duration(col) => Ok(Column::Float64(
                col.map(|d| nanos(d) as f64 / NANOS_PER_DAY),
            )),
            other => Err(Error::ColumnTypeMismatch {
                name: name.to_string(),
                expected: ColumnType::Duration,
                found: other.column_type(),
            }),
        }
    }
}
