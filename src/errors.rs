use thiserror::Error;

use crate::models::dividend::FailureKind;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Excel parsing error: {0}")]
    ExcelError(#[from] calamine::Error),

    #[error("Excel writing error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Exchange error: {0}")]
    ExchangeError(String),

    /// 返回结构缺少预期字段
    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ScreenerError {
    /// 单只股票失败时的分类：字段缺失归为数据格式错误，其余一律视为获取失败
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ScreenerError::MalformedData(_) => FailureKind::MalformedData,
            _ => FailureKind::FetchFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

// 用于从字符串创建错误
impl From<String> for ScreenerError {
    fn from(s: String) -> Self {
        ScreenerError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for ScreenerError {
    fn from(s: &str) -> Self {
        ScreenerError::Unknown(s.to_string())
    }
}
