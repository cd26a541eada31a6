use crate::column::common::{ColumnType, ColumnValue, TypedColumn};
use crate::column::value::{FloatKey, KeyValue, Value};

/// Float64型の列
pub type Float64Column = TypedColumn<f64>;

impl ColumnValue for f64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Float64;

    fn placeholder() -> Self {
        f64::NAN
    }

    fn to_value(&self) -> Value {
        Value::Float64(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn key(&self) -> KeyValue {
        KeyValue::Float64(FloatKey::new(*self))
    }
}

impl Float64Column {
    /// データの合計を計算する（NULL値を除く）
    pub fn sum(&self) -> f64 {
        self.iter().flatten().sum()
    }

    /// データの平均を計算する（NULL値を除く）
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .iter()
            .flatten()
            .fold((0.0, 0usize), |(sum, count), &v| (sum + v, count + 1));
        (count > 0).then(|| sum / count as f64)
    }
}
