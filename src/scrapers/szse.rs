use crate::models::stock::StockIdentifier;
use crate::scrapers::base::{RequestThrottle, StockListScraper};
use crate::errors::{Result, ScreenerError};
use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, DataType, Reader};
use log::info;
use reqwest::Client;
use std::time::Duration;

const SZSE_BASE_URL: &str = "https://www.szse.cn";

pub struct SZSEScraper {
    client: Client,
    base_url: String,
    throttle: RequestThrottle,
}

impl SZSEScraper {
    pub fn new() -> Result<Self> {
        Self::with_base_url(SZSE_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ScreenerError::RequestError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            throttle: RequestThrottle::new(Duration::from_millis(500)),
        })
    }

    // 代码列可能被 Excel 存成数字，需补齐6位
    fn cell_to_code(cell: &DataType) -> Option<String> {
        match cell {
            DataType::String(s) => {
                let s = s.trim();
                if s.is_empty() { None } else { Some(format!("{:0>6}", s)) }
            }
            DataType::Float(f) => Some(format!("{:06}", *f as i64)),
            DataType::Int(i) => Some(format!("{:06}", i)),
            _ => None,
        }
    }

    /// 解析深交所A股列表 xlsx
    pub fn parse_stock_list_xlsx(&self, bytes: &[u8]) -> Result<Vec<StockIdentifier>> {
        let mut workbook = open_workbook_auto_from_rs(std::io::Cursor::new(bytes.to_vec()))
            .map_err(ScreenerError::ExcelError)?;

        // 获取第一个工作表
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ScreenerError::DataError("XLSX文件中没有工作表".to_string()))?
            .map_err(ScreenerError::ExcelError)?;

        let mut rows = range.rows();

        // 根据表头定位代码与简称所在列
        let header = rows.next()
            .ok_or_else(|| ScreenerError::ExchangeError("深交所股票列表为空".to_string()))?;
        let column_of = |title: &str| {
            header.iter().position(|c| c.to_string().trim() == title)
        };
        let (code_col, name_col) = match (column_of("A股代码"), column_of("A股简称")) {
            (Some(code), Some(name)) => (code, name),
            _ => {
                return Err(ScreenerError::ExchangeError(
                    "深交所股票列表缺少 A股代码/A股简称 列".to_string(),
                ))
            }
        };

        let mut stocks = Vec::new();
        for row in rows {
            let code = match row.get(code_col).and_then(Self::cell_to_code) {
                Some(code) => code,
                None => continue,
            };
            let name = match row.get(name_col) {
                Some(cell) => cell.to_string().trim().to_string(),
                None => continue,
            };
            stocks.push(StockIdentifier::new(self.exchange_code(), &code, &name));
        }
        Ok(stocks)
    }
}

#[async_trait]
impl StockListScraper for SZSEScraper {
    fn exchange_code(&self) -> &'static str {
        "SZSE"
    }

    async fn fetch_stock_list(&self) -> Result<Vec<StockIdentifier>> {
        info!("开始获取深交所股票列表");

        // 限制请求频率
        self.throttle.wait().await;

        let response = self.client
            .get(format!("{}/api/report/ShowReport", self.base_url))
            .query(&[
                ("SHOWTYPE", "xlsx"),
                ("CATALOGID", "1110"),
                ("TABKEY", "tab1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        // 获取文件内容
        let bytes = response.bytes().await?;
        let stocks = self.parse_stock_list_xlsx(&bytes)?;

        info!("成功获取 {} 支深交所股票", stocks.len());
        Ok(stocks)
    }
}
