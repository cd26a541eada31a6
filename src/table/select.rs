//! 表の列選択・行選択・変換

use std::collections::HashSet;

use super::core::Table;
use crate::column::{Column, ColumnType, KeyValue, Value};
use crate::error::{Error, Result};

impl Table {
    /// 列の選択（新しい表として）
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let mut result = Self::new();
        for &name in columns {
            result.add_column(name, self.column(name)?.clone())?;
        }
        Ok(result)
    }

    /// 列の削除（新しい表として）
    pub fn drop(&self, columns: &[&str]) -> Result<Self> {
        for &name in columns {
            self.column(name)?;
        }
        let keep: Vec<&str> = self
            .column_names
            .iter()
            .map(String::as_str)
            .filter(|name| !columns.contains(name))
            .collect();
        self.select(&keep)
    }

    /// 列名の変更（新しい表として）
    pub fn rename(&self, mapping: &[(&str, &str)]) -> Result<Self> {
        for (from, _) in mapping {
            self.column(from)?;
        }

        let mut result = Self::new();
        for (name, column) in self.iter_columns() {
            let new_name = mapping
                .iter()
                .find(|(from, _)| *from == name)
                .map_or(name, |(_, to)| *to);
            result.add_column(new_name, column.clone())?;
        }
        Ok(result)
    }

    /// 指定した行だけを取り出す
    pub fn take(&self, indices: &[usize]) -> Self {
        let mut result = Self::new();
        for (name, column) in self.iter_columns() {
            result.columns.push(column.take(indices));
            result.column_indices.insert(name.to_string(), result.column_names.len());
            result.column_names.push(name.to_string());
        }
        result.row_count = indices.len();
        result
    }

    /// ブールマスクによるフィルタリング（新しい表として）
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
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

    /// 列の値に対する述語でフィルタリング
    pub fn filter_by<F>(&self, name: &str, predicate: F) -> Result<Self>
    where
        F: Fn(&Value) -> bool,
    {
        let column = self.column(name)?;
        let mask: Vec<bool> = (0..self.row_count)
            .map(|i| predicate(&column.value_at(i)))
            .collect();
        self.filter(&mask)
    }

    /// 行ごとに値を変換した列を作る
    pub fn map_values<F>(&self, name: &str, output_type: ColumnType, f: F) -> Result<Column>
    where
        F: Fn(&Value) -> Value,
    {
        let column = self.column(name)?;
        let values: Vec<Value> = (0..self.row_count).map(|i| f(&column.value_at(i))).collect();
        Column::from_values(output_type, &values)
    }

    /// 行全体のキー（NULLはNone）
    pub(crate) fn row_key(&self, row: usize) -> Vec<Option<KeyValue>> {
        self.columns.iter().map(|c| c.key_at(row)).collect()
    }

    /// 重複行を取り除く（最初の出現を残す）
    pub fn distinct(&self) -> Self {
        let mut seen = HashSet::with_capacity(self.row_count);
        let indices: Vec<usize> = (0..self.row_count)
            .filter(|&row| seen.insert(self.row_key(row)))
            .collect();
        self.take(&indices)
    }

    /// NULLを含む行を取り除く
    pub fn drop_nulls(&self) -> Self {
        let indices: Vec<usize> = (0..self.row_count)
            .filter(|&row| self.columns.iter().all(|c| !c.is_null(row)))
            .collect();
        self.take(&indices)
    }
}
