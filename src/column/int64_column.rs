use crate::column::common::{ColumnType, ColumnValue, TypedColumn};
use crate::column::value::{KeyValue, Value};

/// Int64型の列
pub type Int64Column = TypedColumn<i64>;

impl ColumnValue for i64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Int64;

    fn placeholder() -> Self {
        0
    }

    fn to_value(&self) -> Value {
        Value::Int64(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int64(v) => Some(*v),
            Value::Boolean(v) => Some(*v as i64),
            _ => None,
        }
    }

    fn key(&self) -> KeyValue {
        KeyValue::Int64(*self)
    }
}

impl Int64Column {
    /// データの合計を計算する（NULL値を除く）
    pub fn sum(&self) -> i64 {
        self.iter().flatten().sum()
    }

    /// データの平均を計算する（NULL値を除く）
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(sum, count), &v| (sum + v as f64, count + 1));
        (count > 0).then(|| sum / count as f64)
    }
}
