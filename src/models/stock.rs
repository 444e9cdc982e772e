use std::collections::HashMap;

/// 股票标识：交易所、代码、名称
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockIdentifier {
    pub exchange: String,
    pub code: String,
    pub name: String,
}

impl StockIdentifier {
    pub fn new(exchange: &str, code: &str, name: &str) -> Self {
        Self {
            exchange: exchange.to_string(),
            code: code.to_string(),
            name: name.to_string(),
        }
    }
}

/// 最新价快照：股票代码 -> 最新成交价，停牌股票不在其中
pub type PriceQuote = HashMap<String, f64>;
