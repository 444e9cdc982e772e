use crate::models::stock::StockIdentifier;
use crate::errors::{Result, ScreenerError};
use crate::scrapers::base::{strip_jsonp, RequestThrottle, StockListScraper};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use log::{debug, info};

const BSE_BASE_URL: &str = "https://www.bse.cn";

/// 北京证券交易所股票列表抓取器
pub struct BSEScraper {
    client: Client,
    base_url: String,
    throttle: RequestThrottle,
}

/// 单页解析结果
struct BsePage {
    stocks: Vec<StockIdentifier>,
    total_pages: u64,
}

impl BSEScraper {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BSE_BASE_URL)
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

    // 北交所A股：43/83/87 开头的存量代码与 920 开头的新代码
    fn is_a_share(code: &str) -> bool {
        code.len() == 6
            && code.chars().all(|c| c.is_ascii_digit())
            && (code.starts_with('4') || code.starts_with('8') || code.starts_with("920"))
    }

    // 返回形如 null([{"content":[...],"totalPages":3,...}])
    fn parse_page(&self, text: &str) -> Result<BsePage> {
        let json: Value = serde_json::from_str(strip_jsonp(text))?;

        let page = json.as_array()
            .and_then(|pages| pages.first())
            .ok_or_else(|| ScreenerError::ExchangeError("北交所返回数据为空".to_string()))?;

        let content = page.get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| ScreenerError::ExchangeError("北交所返回数据缺少 content 字段".to_string()))?;

        let total_pages = page.get("totalPages").and_then(|t| t.as_u64()).unwrap_or(1);

        let stocks = content.iter()
            .filter_map(|item| {
                let code = item.get("xxzqdm")?.as_str()?.trim();
                let name = item.get("xxzqjc")?.as_str()?.trim();
                Self::is_a_share(code).then(|| StockIdentifier::new(self.exchange_code(), code, name))
            })
            .collect();

        Ok(BsePage { stocks, total_pages })
    }

    async fn fetch_page(&self, page: u64) -> Result<BsePage> {
        self.throttle.wait().await;

        let page_str = page.to_string();
        let response = self.client
            .post(format!("{}/nqxxController/nqxxCnzq.do", self.base_url))
            .form(&[
                ("page", page_str.as_str()),
                ("typejb", "T"),
                ("xxfcbj[]", "2"),
                ("xxzqdm", ""),
                ("sortfield", "xxzqdm"),
                ("sorttype", "asc"),
            ])
            .header("Referer", "https://www.bse.cn/nq/listedcompany.html")
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        debug!("北交所第 {} 页响应已获取", page + 1);
        self.parse_page(&text)
    }
}

#[async_trait]
impl StockListScraper for BSEScraper {
    fn exchange_code(&self) -> &'static str {
        "BSE"
    }

    async fn fetch_stock_list(&self) -> Result<Vec<StockIdentifier>> {
        info!("获取北交所股票列表");

        let first = self.fetch_page(0).await?;
        let total_pages = first.total_pages;
        let mut stocks = first.stocks;

        for page in 1..total_pages {
            stocks.extend(self.fetch_page(page).await?.stocks);
        }

        info!("成功获取 {} 支北交所股票（共 {} 页）", stocks.len(), total_pages);
        Ok(stocks)
    }
}
