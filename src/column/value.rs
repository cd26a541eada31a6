use std::fmt::{self, Display};

use chrono::{NaiveDateTime, TimeDelta};

/// 1つのセルの値（NULLを含む）
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int64(i64),
    Float64(f64),
    String(String),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
}

impl Value {
    /// NULLかどうかを返す
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// 数値として取得する（ブール値は0/1として扱う）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            Value::Boolean(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// CSVのフィールドとして書き出す文字列（NULLは空文字列）
    ///
    /// 浮動小数点数は整数値でも小数点付きで書き出す（読み戻しでFloat64になる）。
    pub fn to_csv_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Float64(v) => format!("{:?}", v),
            other => other.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            Value::Duration(v) => write!(f, "{}", format_duration(v)),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Value::Duration(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// `-5 days 00:00:00` の形式で期間を表示する
pub fn format_duration(d: &TimeDelta) -> String {
    let negative = *d < TimeDelta::zero();
    let abs = if negative { -*d } else { *d };
    let days = abs.num_days();
    let rest = abs - TimeDelta::days(days);
    let secs = rest.num_seconds();
    let nanos = rest.subsec_nanos();
    let sign = if negative { "-" } else { "" };
    let clock = format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60);

    if nanos == 0 {
        format!("{}{} days {}", sign, days, clock)
    } else {
        format!("{}{} days {}.{:09}", sign, days, clock, nanos)
    }
}

/// グループ化・結合に使うハッシュ可能で全順序を持つキー
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Boolean(bool),
    Int64(i64),
    Float64(FloatKey),
    String(String),
    DateTime(NaiveDateTime),
    Duration(TimeDelta),
}

/// f64を全順序のビット表現に変換したキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloatKey(u64);

impl FloatKey {
    pub fn new(value: f64) -> Self {
        // -0.0 と 0.0 は同じキー
        let value = if value == 0.0 { 0.0 } else { value };
        let bits = value.to_bits();
        if bits >> 63 == 1 {
            FloatKey(!bits)
        } else {
            FloatKey(bits | (1 << 63))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&TimeDelta::days(4)), "4 days 00:00:00");
        assert_eq!(format_duration(&-TimeDelta::days(5)), "-5 days 00:00:00");
        assert_eq!(
            format_duration(&(TimeDelta::days(1) + TimeDelta::seconds(3725))),
            "1 days 01:02:05"
        );
    }

    #[test]
    fn test_float_key_order() {
        let mut keys = vec![FloatKey::new(2.5), FloatKey::new(-1.0), FloatKey::new(0.0)];
        keys.sort();
        assert_eq!(
            keys,
            vec![FloatKey::new(-1.0), FloatKey::new(-0.0), FloatKey::new(2.5)]
        );
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(Some(3_i64)), Value::Int64(3));
        assert_eq!(Value::from(None::<f64>), Value::Null);
        assert_eq!(Value::Boolean(true).as_f64(), Some(1.0));
        assert_eq!(Value::Null.to_csv_field(), "");
    }
}
