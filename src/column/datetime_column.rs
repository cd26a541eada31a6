use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::column::common::{Column, ColumnType, ColumnValue, TypedColumn};
use crate::column::value::{KeyValue, Value};
use crate::error::{Error, Result};

/// 日時型の列
pub type DateTimeColumn = TypedColumn<NaiveDateTime>;

impl ColumnValue for NaiveDateTime {
    const COLUMN_TYPE: ColumnType = ColumnType::DateTime;

    fn placeholder() -> Self {
        NaiveDateTime::MIN
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    fn key(&self) -> KeyValue {
        KeyValue::DateTime(*self)
    }
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// 日時文字列を解析する（日付のみの場合は0時）
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

impl Column {
    /// 文字列列を日時列に変換する
    ///
    /// 空文字列とNULLはNULLになる。解析できない値があれば
    /// `Error::TypeConversion` を返す。
    pub fn to_datetime(&self, name: &str) -> Result<Column> {
        match self {
            Column::DateTime(_) => Ok(self.clone()),
            Column::String(col) => {
                let mut values = Vec::with_capacity(col.len());
                for value in col.iter() {
                    match value.map(|s| s.trim()) {
                        None | Some("") => values.push(None),
                        Some(s) => {
                            let dt = parse_datetime(s).ok_or_else(|| Error::TypeConversion {
                                column: name.to_string(),
                                value: s.to_string(),
                                target: "datetime",
                            })?;
                            values.push(Some(dt));
                        }
                    }
                }
                Ok(Column::DateTime(DateTimeColumn::from_options(values)))
            }
            other => Err(Error::ColumnTypeMismatch {
                name: name.to_string(),
                expected: ColumnType::String,
                found: other.column_type(),
            }),
        }
    }
}
