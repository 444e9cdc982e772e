pub mod cninfo;
pub mod eastmoney;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::dividend::DividendRecord;
use crate::models::stock::{PriceQuote, StockIdentifier};
use crate::scrapers::base::StockListScraper;
use crate::scrapers::bse::BSEScraper;
use crate::scrapers::sse::SSEScraper;
use crate::scrapers::szse::SZSEScraper;
use cninfo::CninfoClient;
use eastmoney::EastmoneyClient;

/// 行情数据源：股票列表、单只股票分红历史、全市场最新价
#[async_trait]
pub trait MarketDataProvider {
    /// 获取全部A股代码与名称
    async fn list_stocks(&self) -> Result<Vec<StockIdentifier>>;

    /// 获取单只股票的分红历史
    async fn fetch_dividends(&self, code: &str) -> Result<Vec<DividendRecord>>;

    /// 获取全市场最新价快照
    async fn fetch_spot_prices(&self) -> Result<PriceQuote>;
}

/// 组合交易所列表、巨潮分红与东方财富行情的数据源
pub struct AShareProvider {
    scrapers: Vec<Arc<dyn StockListScraper + Send + Sync>>,
    cninfo: CninfoClient,
    eastmoney: EastmoneyClient,
}

impl AShareProvider {
    /// 使用默认的沪深北三个交易所数据源
    pub fn new() -> Result<Self> {
        let scrapers: Vec<Arc<dyn StockListScraper + Send + Sync>> = vec![
            Arc::new(SSEScraper::new()?),
            Arc::new(SZSEScraper::new()?),
            Arc::new(BSEScraper::new()?),
        ];
        Ok(Self::with_sources(scrapers, CninfoClient::new()?, EastmoneyClient::new()?))
    }

    pub fn with_sources(
        scrapers: Vec<Arc<dyn StockListScraper + Send + Sync>>,
        cninfo: CninfoClient,
        eastmoney: EastmoneyClient,
    ) -> Self {
        Self {
            scrapers,
            cninfo,
            eastmoney,
        }
    }
}

#[async_trait]
impl MarketDataProvider for AShareProvider {
    async fn list_stocks(&self) -> Result<Vec<StockIdentifier>> {
        let mut all_stocks = Vec::new();

        for scraper in &self.scrapers {
            info!("Listing stocks from {}", scraper.exchange_code());
            let stocks = scraper.fetch_stock_list().await?;
            info!("Found {} stocks in {}", stocks.len(), scraper.exchange_code());
            all_stocks.extend(stocks);
        }

        info!("共获取 {} 只 A 股股票", all_stocks.len());
        Ok(all_stocks)
    }

    async fn fetch_dividends(&self, code: &str) -> Result<Vec<DividendRecord>> {
        self.cninfo.fetch_dividends(code).await
    }

    async fn fetch_spot_prices(&self) -> Result<PriceQuote> {
        self.eastmoney.fetch_spot_prices().await
    }
}
