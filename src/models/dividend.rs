use chrono::NaiveDate;
use std::fmt;

use super::stock::StockIdentifier;

/// 分红方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    /// 现金派息
    Cash,
    /// 仅送股/转增等非现金分配
    Other,
}

impl DistributionKind {
    pub fn label(&self) -> &'static str {
        match self {
            DistributionKind::Cash => "现金分红",
            DistributionKind::Other => "非现金分红",
        }
    }
}

/// 单条分红记录，比例均为每10股
#[derive(Debug, Clone, PartialEq)]
pub struct DividendRecord {
    pub kind: DistributionKind,
    pub plan_type: String,
    pub cash_ratio: f64,
    pub bonus_ratio: Option<f64>,
    pub transfer_ratio: Option<f64>,
    pub report_date: NaiveDate,
    pub report_period: Option<String>,
    pub record_date: Option<NaiveDate>,
    pub ex_dividend_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl DividendRecord {
    pub fn is_cash(&self) -> bool {
        self.kind == DistributionKind::Cash
    }
}

/// 通过筛选的高股息股票
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningResult {
    pub exchange: String,
    pub code: String,
    pub name: String,
    pub latest_price: f64,
    pub dividend_per_share: f64,
    pub distribution_ratio: f64,
    pub yield_percent: f64,
    pub dividend_year: i32,
    pub record_date: Option<NaiveDate>,
    pub ex_dividend_date: Option<NaiveDate>,
}

/// 没有任何分红记录的股票
#[derive(Debug, Clone, PartialEq)]
pub struct NoDividendStock {
    pub exchange: String,
    pub code: String,
    pub name: String,
    pub note: String,
}

impl NoDividendStock {
    pub fn from_identifier(stock: &StockIdentifier) -> Self {
        Self {
            exchange: stock.exchange.clone(),
            code: stock.code.clone(),
            name: stock.name.clone(),
            note: "无分红记录".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 返回数据缺少字段
    MalformedData,
    /// 网络、接口或其他错误
    FetchFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MalformedData => write!(f, "数据格式错误"),
            FailureKind::FetchFailure => write!(f, "获取失败"),
        }
    }
}

/// 获取分红数据失败的股票
#[derive(Debug, Clone, PartialEq)]
pub struct StockFailure {
    pub code: String,
    pub name: String,
    pub kind: FailureKind,
    pub message: String,
}

impl StockFailure {
    /// 导出时的备注列，例如 "获取失败: HTTP 500"
    pub fn note(&self) -> String {
        format!("{}: {}", self.kind, self.message)
    }
}
