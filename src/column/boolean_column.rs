use crate::column::common::{ColumnType, ColumnValue, TypedColumn};
use crate::column::value::{KeyValue, Value};

/// ブール型の列
pub type BooleanColumn = TypedColumn<bool>;

impl ColumnValue for bool {
    const COLUMN_TYPE: ColumnType = ColumnType::Boolean;

    fn placeholder() -> Self {
        false
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    fn key(&self) -> KeyValue {
        KeyValue::Boolean(*self)
    }
}
