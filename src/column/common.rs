use std::fmt::Debug;
use std::sync::Arc;

use crate::column::value::{KeyValue, Value};
use crate::column::{
    BooleanColumn, DateTimeColumn, DurationColumn, Float64Column, Int64Column, StringColumn,
};
use crate::error::{Error, Result};

/// 列の型を識別するための列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Float64,
    String,
    Boolean,
    DateTime,
    Duration,
}

impl ColumnType {
    /// 集計対象になる型かどうか（文字列と日時以外）
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ColumnType::Int64 | ColumnType::Float64 | ColumnType::Boolean | ColumnType::Duration
        )
    }
}

/// NULL値を追跡するビットマスク（ビットが1の行がNULL）
#[derive(Debug, Clone)]
pub struct BitMask {
    pub(crate) data: Arc<[u8]>,
    pub(crate) len: usize,
}

impl BitMask {
    /// ブール値のベクトルからビットマスクを作成する
    pub fn from_bools(bools: &[bool]) -> Self {
        let length = bools.len();
        let bytes_needed = (length + 7) / 8;
        let mut data = vec![0u8; bytes_needed];

        for (i, &is_set) in bools.iter().enumerate() {
            if is_set {
                data[i / 8] |= 1 << (i % 8);
            }
        }

        Self {
            data: data.into(),
            len: length,
        }
    }

    /// ビットが設定されているかどうかを確認する（範囲外はfalse）
    pub fn get(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        (self.data[index / 8] & (1 << (index % 8))) != 0
    }

    /// 設定されているビットの数
    pub fn count_ones(&self) -> usize {
        (0..self.len).filter(|&i| self.get(i)).count()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// 列に格納できる値の型が実装するトレイト
pub trait ColumnValue: Clone + Debug + Send + Sync + 'static {
    const COLUMN_TYPE: ColumnType;

    /// NULLの行に置くダミー値
    fn placeholder() -> Self;

    fn to_value(&self) -> Value;

    /// 型が合わない場合はNone
    fn from_value(value: &Value) -> Option<Self>;

    fn key(&self) -> KeyValue;
}

/// 型付きの列（値のバッファとNULLマスク）
#[derive(Debug, Clone)]
pub struct TypedColumn<T> {
    pub(crate) data: Arc<[T]>,
    pub(crate) null_mask: Option<BitMask>,
}

impl<T: ColumnValue> TypedColumn<T> {
    /// NULLを含まない列を作成する
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data: data.into(),
            null_mask: None,
        }
    }

    /// NULL値を含む列を作成する
    pub fn with_nulls(data: Vec<T>, nulls: Vec<bool>) -> Self {
        let null_mask = if nulls.iter().any(|&is_null| is_null) {
            Some(BitMask::from_bools(&nulls))
        } else {
            None
        };

        Self {
            data: data.into(),
            null_mask,
        }
    }

    /// Optionのベクトルから列を作成する
    pub fn from_options(values: Vec<Option<T>>) -> Self {
        let mut data = Vec::with_capacity(values.len());
        let mut nulls = Vec::with_capacity(values.len());

        for value in values {
            match value {
                Some(v) => {
                    data.push(v);
                    nulls.push(false);
                }
                None => {
                    data.push(T::placeholder());
                    nulls.push(true);
                }
            }
        }

        Self::with_nulls(data, nulls)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.null_mask.as_ref().map_or(false, |mask| mask.get(index))
    }

    pub fn null_count(&self) -> usize {
        self.null_mask.as_ref().map_or(0, BitMask::count_ones)
    }

    /// インデックスでデータを取得する
    pub fn get(&self, index: usize) -> Result<Option<&T>> {
        if index >= self.data.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }

        Ok(self.value_at(index))
    }

    pub(crate) fn value_at(&self, index: usize) -> Option<&T> {
        if self.is_null(index) {
            None
        } else {
            Some(&self.data[index])
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        (0..self.data.len()).map(move |i| self.value_at(i))
    }

    /// 指定した行だけを取り出した新しい列
    pub fn take(&self, indices: &[usize]) -> Self {
        Self::from_options(
            indices
                .iter()
                .map(|&i| self.value_at(i).cloned())
                .collect(),
        )
    }

    /// マッピング関数を適用した新しい列を作成する（NULLはそのまま）
    pub fn map<U, F>(&self, f: F) -> TypedColumn<U>
    where
        U: ColumnValue,
        F: Fn(&T) -> U,
    {
        TypedColumn::from_options(self.iter().map(|v| v.map(&f)).collect())
    }

    /// 2つの列を行ごとに組み合わせる（どちらかがNULLならNULL）
    pub fn zip_with<U, V, F>(&self, other: &TypedColumn<U>, f: F) -> Result<TypedColumn<V>>
    where
        U: ColumnValue,
        V: ColumnValue,
        F: Fn(&T, &U) -> V,
    {
        if self.len() != other.len() {
            return Err(Error::InconsistentRowCount {
                expected: self.len(),
                found: other.len(),
            });
        }

        Ok(TypedColumn::from_options(
            self.iter()
                .zip(other.iter())
                .map(|(a, b)| match (a, b) {
                    (Some(a), Some(b)) => Some(f(a, b)),
                    _ => None,
                })
                .collect(),
        ))
    }
}

/// 列を表す列挙型
#[derive(Debug, Clone)]
pub enum Column {
    Int64(Int64Column),
    Float64(Float64Column),
    String(StringColumn),
    Boolean(BooleanColumn),
    DateTime(DateTimeColumn),
    Duration(DurationColumn),
}

macro_rules! with_column {
    ($column:expr, $c:ident => $body:expr) => {
        match $column {
            Column::Int64($c) => $body,
            Column::Float64($c) => $body,
            Column::String($c) => $body,
            Column::Boolean($c) => $body,
            Column::DateTime($c) => $body,
            Column::Duration($c) => $body,
        }
    };
}

macro_rules! map_column {
    ($column:expr, $c:ident => $body:expr) => {
        match $column {
            Column::Int64($c) => Column::Int64($body),
            Column::Float64($c) => Column::Float64($body),
            Column::String($c) => Column::String($body),
            Column::Boolean($c) => Column::Boolean($body),
            Column::DateTime($c) => Column::DateTime($body),
            Column::Duration($c) => Column::Duration($body),
        }
    };
}

impl Column {
    /// 列の長さを返す
    pub fn len(&self) -> usize {
        with_column!(self, c => c.len())
    }

    /// 列が空かどうかを返す
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 列の型を返す
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::String(_) => ColumnType::String,
            Column::Boolean(_) => ColumnType::Boolean,
            Column::DateTime(_) => ColumnType::DateTime,
            Column::Duration(_) => ColumnType::Duration,
        }
    }

    pub fn is_null(&self, index: usize) -> bool {
        with_column!(self, c => c.is_null(index))
    }

    pub fn null_count(&self) -> usize {
        with_column!(self, c => c.null_count())
    }

    /// 指定行の値を取得する
    pub fn get_value(&self, index: usize) -> Result<Value> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.len(),
            });
        }
        Ok(self.value_at(index))
    }

    pub(crate) fn value_at(&self, index: usize) -> Value {
        with_column!(self, c => c.value_at(index).map_or(Value::Null, ColumnValue::to_value))
    }

    /// グループ化・結合用のキー（NULLはNone）
    pub(crate) fn key_at(&self, index: usize) -> Option<KeyValue> {
        with_column!(self, c => c.value_at(index).map(ColumnValue::key))
    }

    /// 全ての値を取得する
    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|i| self.value_at(i)).collect()
    }

    /// 指定した行だけを取り出した新しい列
    pub fn take(&self, indices: &[usize]) -> Column {
        map_column!(self, c => c.take(indices))
    }

    /// ブールマスクでtrueの行だけを残す
    pub fn filter(&self, mask: &[bool]) -> Result<Column> {
        if mask.len() != self.len() {
            return Err(Error::InconsistentRowCount {
                expected: self.len(),
                found: mask.len(),
            });
        }
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        Ok(self.take(&indices))
    }

    /// 値のベクトルから指定された型の列を作成する
    pub fn from_values(column_type: ColumnType, values: &[Value]) -> Result<Column> {
        fn build<T: ColumnValue>(values: &[Value]) -> Result<TypedColumn<T>> {
            let mut out = Vec::with_capacity(values.len());
            for value in values {
                if value.is_null() {
                    out.push(None);
                    continue;
                }
                match T::from_value(value) {
                    Some(v) => out.push(Some(v)),
                    None => {
                        return Err(Error::InvalidInput(format!(
                            "value {:?} does not fit a {:?} column",
                            value,
                            T::COLUMN_TYPE
                        )))
                    }
                }
            }
            Ok(TypedColumn::from_options(out))
        }

        Ok(match column_type {
            ColumnType::Int64 => Column::Int64(build(values)?),
            ColumnType::Float64 => Column::Float64(build(values)?),
            ColumnType::String => Column::String(build(values)?),
            ColumnType::Boolean => Column::Boolean(build(values)?),
            ColumnType::DateTime => Column::DateTime(build(values)?),
            ColumnType::Duration => Column::Duration(build(values)?),
        })
    }

    /// 数値列（整数・浮動小数点・ブール）をf64の列に変換する
    pub fn to_float64(&self) -> Result<Float64Column> {
        match self {
            Column::Float64(c) => Ok(c.clone()),
            Column::Int64(c) => Ok(c.map(|&v| v as f64)),
            Column::Boolean(c) => Ok(c.map(|&v| if v { 1.0 } else { 0.0 })),
            other => Err(Error::InvalidOperation(format!(
                "{:?} column is not numeric",
                other.column_type()
            ))),
        }
    }

    /// 行ごとの差（日時同士は期間、期間同士は期間、数値は数値）
    pub fn sub(&self, other: &Column) -> Result<Column> {
        match (self, other) {
            (Column::DateTime(a), Column::DateTime(b)) => {
                Ok(Column::Duration(a.zip_with(b, |a, b| *a - *b)?))
            }
            (Column::Duration(a), Column::Duration(b)) => {
                Ok(Column::Duration(a.zip_with(b, |a, b| *a - *b)?))
            }
            (Column::Int64(a), Column::Int64(b)) => {
                Ok(Column::Int64(a.zip_with(b, |a, b| a - b)?))
            }
            (a, b) => {
                let (a, b) = (a.to_float64()?, b.to_float64()?);
                Ok(Column::Float64(a.zip_with(&b, |a, b| a - b)?))
            }
        }
    }

    /// 行ごとの商（常にFloat64、期間同士は比率）
    pub fn div(&self, other: &Column) -> Result<Column> {
        match (self, other) {
            (Column::Duration(a), Column::Duration(b)) => Ok(Column::Float64(a.zip_with(
                b,
                |a, b| {
                    crate::column::duration_column::nanos(a) as f64
                        / crate::column::duration_column::nanos(b) as f64
                },
            )?)),
            (a, b) => {
                let (a, b) = (a.to_float64()?, b.to_float64()?);
                Ok(Column::Float64(a.zip_with(&b, |a, b| a / b)?))
            }
        }
    }

    /// スカラー倍（Float64）
    pub fn mul_scalar(&self, factor: f64) -> Result<Column> {
        Ok(Column::Float64(self.to_float64()?.map(|v| v * factor)))
    }
}

// 型変換のFrom実装
impl From<Int64Column> for Column {
    fn from(col: Int64Column) -> Self {
        Column::Int64(col)
    }
}

impl From<Float64Column> for Column {
    fn from(col: Float64Column) -> Self {
        Column::Float64(col)
    }
}

impl From<StringColumn> for Column {
    fn from(col: StringColumn) -> Self {
        Column::String(col)
    }
}

impl From<BooleanColumn> for Column {
    fn from(col: BooleanColumn) -> Self {
        Column::Boolean(col)
    }
}

impl From<DateTimeColumn> for Column {
    fn from(col: DateTimeColumn) -> Self {
        Column::DateTime(col)
    }
}

impl From<DurationColumn> for Column {
    fn from(col: DurationColumn) -> Self {
        Column::Duration(col)
    }
}
