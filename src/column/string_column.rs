use crate::column::common::{ColumnType, ColumnValue, TypedColumn};
use crate::column::value::{KeyValue, Value};

/// 文字列型の列
pub type StringColumn = TypedColumn<String>;

impl ColumnValue for String {
    const COLUMN_TYPE: ColumnType = ColumnType::String;

    fn placeholder() -> Self {
        String::new()
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn key(&self) -> KeyValue {
        KeyValue::String(self.clone())
    }
}

impl StringColumn {
    /// 文字列スライスから列を作成する
    pub fn from_strs(values: &[&str]) -> Self {
        Self::new(values.iter().map(|s| s.to_string()).collect())
    }
}
