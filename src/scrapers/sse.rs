use crate::models::stock::StockIdentifier;
use crate::errors::{Result, ScreenerError};
use crate::scrapers::base::{strip_jsonp, RequestThrottle, StockListScraper};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use log::{debug, info};

const SSE_BASE_URL: &str = "https://yunhq.sse.com.cn:32042";

/// 上海证券交易所股票列表抓取器
pub struct SSEScraper {
    client: Client,
    base_url: String,
    throttle: RequestThrottle,
}

impl SSEScraper {
    /// 创建新的上交所数据抓取器
    pub fn new() -> Result<Self> {
        Self::with_base_url(SSE_BASE_URL)
    }

    /// 指定接口地址（测试时指向 wiremock）
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

    // 沪市A股：主板 60xxxx 与科创板 68xxxx，排除 900xxx B股
    fn is_a_share(code: &str) -> bool {
        code.len() == 6 && code.starts_with('6')
    }

    fn parse_stock_list(&self, text: &str) -> Result<Vec<StockIdentifier>> {
        let json: Value = serde_json::from_str(strip_jsonp(text))?;

        let list = json.get("list")
            .and_then(|l| l.as_array())
            .ok_or_else(|| ScreenerError::ExchangeError("上交所返回数据缺少 list 字段".to_string()))?;

        let mut stocks = Vec::new();
        for item in list {
            if let Some(fields) = item.as_array() {
                if fields.len() < 2 {
                    continue;
                }
                let code = fields[0].as_str().unwrap_or_default().trim();
                let name = fields[1].as_str().unwrap_or_default().trim();
                if !Self::is_a_share(code) {
                    continue;
                }
                stocks.push(StockIdentifier::new(self.exchange_code(), code, name));
            }
        }
        Ok(stocks)
    }
}

#[async_trait]
impl StockListScraper for SSEScraper {
    fn exchange_code(&self) -> &'static str {
        "SSE"
    }

    async fn fetch_stock_list(&self) -> Result<Vec<StockIdentifier>> {
        info!("获取上交所股票列表");

        // 限制请求频率
        self.throttle.wait().await;

        let response = self.client
            .get(format!("{}/v1/sh1/list/exchange/equity", self.base_url))
            .query(&[
                ("select", "code,name"),
                ("begin", "0"),
                ("end", "5000"),
            ])
            .header("Referer", "https://www.sse.com.cn/")
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        debug!("成功获取响应");

        let stocks = self.parse_stock_list(&text)?;
        info!("成功获取 {} 支上交所股票", stocks.len());
        Ok(stocks)
    }
}
