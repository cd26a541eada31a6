use std::path::PathBuf;

use thiserror::Error;

use crate::column::ColumnType;

/// エラー型の定義
#[derive(Error, Debug)]
pub enum Error {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("column type mismatch: column {name}, expected {expected:?}, found {found:?}")]
    ColumnTypeMismatch {
        name: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("cannot convert value {value:?} in column {column} to {target}")]
    TypeConversion {
        column: String,
        value: String,
        target: &'static str,
    },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// データディレクトリ自体が読めない
    #[error("cannot read data directory {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// テーブルファイルの読み込みに失敗した（どのテーブル・ファイルか記録する）
    #[error("failed to load table {table} from {}: {source}", path.display())]
    Load {
        table: String,
        path: PathBuf,
        source: Box<Error>,
    },

    /// 特徴量アクセサ内で発生したエラー（どのアクセサか記録する）
    #[error("{accessor}: {source}")]
    Accessor {
        accessor: &'static str,
        source: Box<Error>,
    },
}

impl Error {
    /// アクセサのコンテキストを取り除いた根本のエラーを返す
    pub fn root(&self) -> &Error {
        match self {
            Error::Accessor { source, .. } => source.root(),
            other => other,
        }
    }

    /// エラーが発生したアクセサの呼び出し経路（外側から順）
    pub fn accessor_path(&self) -> Vec<&'static str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::Accessor { accessor, source } = current {
            path.push(*accessor);
            current = source;
        }
        path
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Resultの型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// アクセサ名をエラーに付与する拡張トレイト
pub trait ResultExt<T> {
    fn in_accessor(self, accessor: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn in_accessor(self, accessor: &'static str) -> Result<T> {
        self.map_err(|err| Error::Accessor {
            accessor,
            source: Box::new(err),
        })
    }
}
