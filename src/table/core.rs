use std::collections::HashMap;
use std::fmt;

use crate::column::{Column, ColumnType, Value};
use crate::error::{Error, Result};

/// 列指向のインメモリ表
///
/// 列はそれぞれ `Arc` でバッファを共有しているため、複製は安価。
#[derive(Clone, Default)]
pub struct Table {
    // 列データ
    pub(crate) columns: Vec<Column>,
    // 列名→インデックスのマッピング
    pub(crate) column_indices: HashMap<String, usize>,
    // 列の順序
    pub(crate) column_names: Vec<String>,
    // 行数
    pub(crate) row_count: usize,
}

impl Table {
    /// 新しい空の表を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// (列名, 列) のリストから表を作成
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, column) in columns {
            table.add_column(name, column)?;
        }
        Ok(table)
    }

    /// 列を追加
    pub fn add_column<C: Into<Column>>(&mut self, name: impl Into<String>, column: C) -> Result<()> {
        let name = name.into();
        let column = column.into();

        // 列名の重複チェック
        if self.column_indices.contains_key(&name) {
            return Err(Error::DuplicateColumnName(name));
        }

        // 行数の整合性チェック
        let column_len = column.len();
        if !self.columns.is_empty() && column_len != self.row_count {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count,
                found: column_len,
            });
        }

        if self.columns.is_empty() {
            self.row_count = column_len;
        }

        self.column_indices.insert(name.clone(), self.columns.len());
        self.columns.push(column);
        self.column_names.push(name);

        Ok(())
    }

    /// 列を追加、同名の列があれば置き換えた新しい表を返す
    pub fn with_column(&self, name: impl Into<String>, column: Column) -> Result<Self> {
        let name = name.into();
        let mut result = self.clone();

        match self.column_indices.get(&name) {
            Some(&idx) => {
                if column.len() != self.row_count {
                    return Err(Error::InconsistentRowCount {
                        expected: self.row_count,
                        found: column.len(),
                    });
                }
                result.columns[idx] = column;
            }
            None => result.add_column(name, column)?,
        }

        Ok(result)
    }

    /// 列の参照を取得
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_indices
            .get(name)
            .map(|&idx| &self.columns[idx])
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// 列の型を取得
    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        Ok(self.column(name)?.column_type())
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_indices.contains_key(name)
    }

    /// 列名のリストを取得
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// 行数を取得
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// 列数を取得
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// 指定セルの値を取得
    pub fn value(&self, row: usize, name: &str) -> Result<Value> {
        self.column(name)?.get_value(row)
    }

    /// (列名, 列) の組を順に返す
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    /// 先頭n行の表
    pub fn head(&self, n: usize) -> Self {
        let indices: Vec<usize> = (0..self.row_count.min(n)).collect();
        self.take(&indices)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 最大表示行数
        const MAX_ROWS: usize = 10;

        if self.columns.is_empty() {
            return write!(f, "Table (0 rows x 0 columns)");
        }

        writeln!(
            f,
            "Table ({} rows x {} columns):",
            self.row_count,
            self.columns.len()
        )?;

        // 列ヘッダーの表示
        write!(f, "{:<5} |", "idx")?;
        for name in &self.column_names {
            write!(f, " {:<15} |", name)?;
        }
        writeln!(f)?;

        // 区切り線
        write!(f, "{:-<5}-+", "")?;
        for _ in &self.column_names {
            write!(f, "-{:-<15}-+", "")?;
        }
        writeln!(f)?;

        let display_rows = self.row_count.min(MAX_ROWS);
        for i in 0..display_rows {
            write!(f, "{:<5} |", i)?;
            for column in &self.columns {
                let cell = match column.value_at(i) {
                    Value::Float64(v) => format!("{:.3}", v),
                    Value::String(s) => format!("\"{}\"", s),
                    other => other.to_string(),
                };
                write!(f, " {:<15} |", cell)?;
            }
            writeln!(f)?;
        }

        // 省略表示
        if self.row_count > MAX_ROWS {
            writeln!(f, "... ({} more rows)", self.row_count - MAX_ROWS)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Float64Column, Int64Column, StringColumn};

    #[test]
    fn test_add_column_checks() {
        let mut table = Table::new();
        table.add_column("id", Int64Column::new(vec![1, 2, 3])).unwrap();

        assert!(matches!(
            table.add_column("id", Int64Column::new(vec![4, 5, 6])),
            Err(Error::DuplicateColumnName(_))
        ));
        assert!(matches!(
            table.add_column("value", Float64Column::new(vec![1.0])),
            Err(Error::InconsistentRowCount { expected: 3, found: 1 })
        ));
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 1);
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let table = Table::from_columns(vec![
            ("id", Column::from(StringColumn::from_strs(&["a", "b"]))),
            ("x", Column::from(Int64Column::new(vec![1, 2]))),
        ])
        .unwrap();

        let replaced = table
            .with_column("x", Column::from(Float64Column::new(vec![0.5, 1.5])))
            .unwrap();
        assert_eq!(replaced.column_names(), &["id", "x"]);
        assert_eq!(replaced.value(1, "x").unwrap(), Value::Float64(1.5));

        let added = table
            .with_column("y", Column::from(Int64Column::new(vec![7, 8])))
            .unwrap();
        assert_eq!(added.column_names(), &["id", "x", "y"]);
    }

    #[test]
    fn test_missing_column_is_lookup_error() {
        let table = Table::new();
        assert!(matches!(table.column("nope"), Err(Error::ColumnNotFound(name)) if name == "nope"));
    }
}
