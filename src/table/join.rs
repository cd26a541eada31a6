//! 表の結合（join）機能

use std::collections::HashMap;

use super::core::Table;
use crate::column::{Column, KeyValue};
use crate::error::{Error, Result};

/// 重複する非キー列に付ける接尾辞
const LEFT_SUFFIX: &str = "_x";
const RIGHT_SUFFIX: &str = "_y";

impl Table {
    /// 内部結合（merge）
    ///
    /// `on` の全ての列が一致する行同士を結合する。キーにNULLを含む行は
    /// どの行とも一致しない。結果は左側の行順を保ち、各左行に対して
    /// 一致する右行を元の順序で並べる。一致がなければ空の表を返す。
    ///
    /// # Arguments
    /// * `other` - 結合する右側の表
    /// * `on` - 両方の表に存在する結合キー列
    pub fn merge(&self, other: &Self, on: &[&str]) -> Result<Self> {
        if on.is_empty() {
            return Err(Error::InvalidInput("merge needs at least one key column".to_string()));
        }

        let mut left_keys = Vec::with_capacity(on.len());
        let mut right_keys = Vec::with_capacity(on.len());
        for &name in on {
            let left = self.column(name)?;
            let right = other.column(name)?;

            // 両方の列が同じ型であることを確認
            if left.column_type() != right.column_type() {
                return Err(Error::ColumnTypeMismatch {
                    name: name.to_string(),
                    expected: left.column_type(),
                    found: right.column_type(),
                });
            }
            left_keys.push(left);
            right_keys.push(right);
        }

        // 右側のキー→行インデックスのマッピングを構築
        let mut right_index: HashMap<Vec<KeyValue>, Vec<usize>> = HashMap::new();
        for row in 0..other.row_count {
            if let Some(key) = composite_key(&right_keys, row) {
                right_index.entry(key).or_default().push(row);
            }
        }

        let mut left_rows = Vec::new();
        let mut right_rows = Vec::new();
        for row in 0..self.row_count {
            let Some(key) = composite_key(&left_keys, row) else {
                continue;
            };
            if let Some(matches) = right_index.get(&key) {
                for &right_row in matches {
                    left_rows.push(row);
                    right_rows.push(right_row);
                }
            }
        }

        let is_key = |name: &str| on.contains(&name);
        let mut result = Self::new();

        // 左側の列（キー列は左側の位置に一度だけ）
        for (name, column) in self.iter_columns() {
            let out_name = if !is_key(name) && other.contains_column(name) {
                format!("{}{}", name, LEFT_SUFFIX)
            } else {
                name.to_string()
            };
            result.add_column(out_name, column.take(&left_rows))?;
        }

        // 右側の非キー列
        for (name, column) in other.iter_columns() {
            if is_key(name) {
                continue;
            }
            let out_name = if self.contains_column(name) {
                format!("{}{}", name, RIGHT_SUFFIX)
            } else {
                name.to_string()
            };
            result.add_column(out_name, column.take(&right_rows))?;
        }

        Ok(result)
    }
}

fn composite_key(columns: &[&Column], row: usize) -> Option<Vec<KeyValue>> {
    columns.iter().map(|c| c.key_at(row)).collect()
}
