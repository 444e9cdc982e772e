use crate::errors::{Result, ScreenerError};
use crate::models::stock::PriceQuote;
use crate::scrapers::base::RequestThrottle;
use crate::util::value_as_f64;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const EASTMONEY_BASE_URL: &str = "https://82.push2.eastmoney.com";
const CLIST_PATH: &str = "/api/qt/clist/get";
// 沪深京A股
const A_SHARE_FILTER: &str = "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23,m:0 t:81 s:2048";
const PAGE_SIZE: usize = 100;

/// 东方财富全市场实时行情快照
pub struct EastmoneyClient {
    client: Client,
    base_url: String,
    throttle: RequestThrottle,
}

impl EastmoneyClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(EASTMONEY_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            throttle: RequestThrottle::new(Duration::from_millis(200)),
        })
    }

    async fn fetch_page(&self, page: usize) -> Result<Value> {
        self.throttle.wait().await;

        let page_str = page.to_string();
        let size_str = PAGE_SIZE.to_string();
        let response = self.client
            .get(format!("{}{}", self.base_url, CLIST_PATH))
            .query(&[
                ("pn", page_str.as_str()),
                ("pz", size_str.as_str()),
                ("po", "1"),
                ("np", "1"),
                ("fltt", "2"),
                ("invt", "2"),
                ("fid", "f12"),
                ("fs", A_SHARE_FILTER),
                ("fields", "f2,f12,f14"),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// 获取全部A股最新价，按页拉取直到取满 total
    pub async fn fetch_spot_prices(&self) -> Result<PriceQuote> {
        info!("获取A股实时行情快照");

        let mut prices = PriceQuote::new();
        let mut seen = 0usize;
        let mut page = 1usize;

        loop {
            let json = self.fetch_page(page).await?;
            let data = json.get("data")
                .filter(|d| !d.is_null())
                .ok_or_else(|| ScreenerError::MalformedData("行情数据缺少 data 字段".to_string()))?;
            let total = data.get("total").and_then(|t| t.as_u64()).unwrap_or(0) as usize;
            let diff = match data.get("diff").and_then(|d| d.as_array()) {
                Some(diff) if !diff.is_empty() => diff,
                _ => break,
            };

            seen += diff.len();
            parse_quotes(diff, &mut prices);
            debug!("第 {} 页: {} 条行情", page, diff.len());

            if seen >= total {
                break;
            }
            page += 1;
        }

        info!("成功获取 {} 支股票的最新价", prices.len());
        Ok(prices)
    }
}

// f12 为代码，f2 为最新价；停牌时 f2 为 "-"
fn parse_quotes(diff: &[Value], prices: &mut PriceQuote) {
    for item in diff {
        let code = match item.get("f12").and_then(|c| c.as_str()) {
            Some(code) => code,
            None => continue,
        };
        if let Some(price) = item.get("f2").and_then(value_as_f64) {
            prices.insert(code.to_string(), price);
        }
    }
}
