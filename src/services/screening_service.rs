use crate::config::Config;
use crate::data_provider::MarketDataProvider;
use crate::errors::Result;
use crate::models::dividend::{DividendRecord, NoDividendStock, ScreeningResult, StockFailure};
use crate::models::stock::{PriceQuote, StockIdentifier};
use crate::screener::{self, ScreeningCriteria, Verdict};
use crate::util::{self, xlsx_utils};
use log::{debug, info, warn};
use std::sync::Arc;

/// 一次筛选运行的全部产出
#[derive(Debug, Default)]
pub struct ScreeningReport {
    pub results: Vec<ScreeningResult>,
    pub no_dividend: Vec<NoDividendStock>,
    pub failures: Vec<StockFailure>,
    pub dividend_records: Vec<(StockIdentifier, DividendRecord)>,
    pub processed: usize,
    pub skipped_non_cash: usize,
    pub skipped_stale: usize,
    pub skipped_no_price: usize,
    pub skipped_low_yield: usize,
}

impl ScreeningReport {
    fn record_verdict(&mut self, stock: &StockIdentifier, verdict: Verdict) {
        match verdict {
            Verdict::Qualified(result) => {
                info!("股票 {}({}) [{}] 股息率 {:.2}%，入选", stock.code, stock.name, stock.exchange, result.yield_percent);
                self.results.push(result);
            }
            Verdict::NoDividends => {
                info!("股票 {}({}) [{}] 无分红数据", stock.code, stock.name, stock.exchange);
                self.no_dividend.push(NoDividendStock::from_identifier(stock));
            }
            Verdict::NoCashDividend => {
                debug!("股票 {} 无现金分红", stock.code);
                self.skipped_non_cash += 1;
            }
            Verdict::Stale { dividend_year } => {
                debug!("股票 {} 最近现金分红年度 {} 过早", stock.code, dividend_year);
                self.skipped_stale += 1;
            }
            Verdict::NoPrice => {
                debug!("股票 {} 无有效最新价", stock.code);
                self.skipped_no_price += 1;
            }
            Verdict::LowYield { yield_percent } => {
                debug!("股票 {} 股息率 {:.2}% 低于阈值", stock.code, yield_percent);
                self.skipped_low_yield += 1;
            }
        }
    }

    /// 导出用的四张表：入选、分红明细、无分红、获取失败
    pub fn to_tables(&self) -> Vec<xlsx_utils::Table> {
        vec![
            xlsx_utils::results_table(&self.results),
            xlsx_utils::dividend_records_table(&self.dividend_records),
            xlsx_utils::no_dividend_table(&self.no_dividend),
            xlsx_utils::failures_table(&self.failures),
        ]
    }
}

/// 筛选服务，串联数据获取、判定与导出
pub struct ScreeningService {
    config: Config,
    provider: Arc<dyn MarketDataProvider + Send + Sync>,
}

impl ScreeningService {
    pub fn new(config: Config, provider: Arc<dyn MarketDataProvider + Send + Sync>) -> Self {
        Self { config, provider }
    }

    /// 以北京时间当前年份构建阈值
    pub fn criteria(&self) -> ScreeningCriteria {
        self.criteria_for_year(util::current_year_cn())
    }

    pub fn criteria_for_year(&self, current_year: i32) -> ScreeningCriteria {
        ScreeningCriteria::new(current_year)
            .with_min_yield_percent(self.config.min_yield_percent)
            .with_recency_years(self.config.recency_years)
    }

    /// 获取股票列表；列表失败时整个运行失败
    async fn load_stock_list(&self) -> Result<Vec<StockIdentifier>> {
        let mut stocks = self.provider.list_stocks().await?;

        // 调试模式：只处理前N个股票
        if self.config.debug_mode {
            let original_count = stocks.len();
            stocks.truncate(self.config.debug_stock_limit);
            info!("DEBUG MODE: Processing only {} out of {} stocks",
                  stocks.len(), original_count);
        }
        Ok(stocks)
    }

    async fn load_prices(&self) -> PriceQuote {
        match self.provider.fetch_spot_prices().await {
            Ok(prices) => prices,
            Err(e) => {
                warn!("Failed to fetch spot prices, no stock can qualify: {}", e);
                PriceQuote::new()
            }
        }
    }

    /// 对单只股票取分红并判定
    pub async fn screen_stock(
        &self,
        stock: &StockIdentifier,
        prices: &PriceQuote,
        criteria: &ScreeningCriteria,
        report: &mut ScreeningReport,
    ) {
        match self.provider.fetch_dividends(&stock.code).await {
            Ok(records) => {
                if !records.is_empty() {
                    info!("股票 {}({}) 有 {} 条分红记录", stock.code, stock.name, records.len());
                }
                let verdict = screener::evaluate(stock, &records, prices, criteria);
                report.dividend_records.extend(records.into_iter().map(|r| (stock.clone(), r)));
                report.record_verdict(stock, verdict);
            }
            Err(e) => {
                let kind = e.failure_kind();
                warn!("股票 {}({}) [{}] {}: {}", stock.code, stock.name, stock.exchange, kind, e);
                report.failures.push(StockFailure {
                    code: stock.code.clone(),
                    name: stock.name.clone(),
                    kind,
                    message: e.to_string(),
                });
            }
        }
    }

    pub async fn run(&self) -> Result<ScreeningReport> {
        self.run_with_criteria(&self.criteria()).await
    }

    /// 依次处理全部股票，每处理 pace_every 只暂停 pace_delay
    pub async fn run_with_criteria(&self, criteria: &ScreeningCriteria) -> Result<ScreeningReport> {
        let stocks = self.load_stock_list().await?;
        let prices = self.load_prices().await;
        info!("Screening {} stocks with min yield {:.2}% since {}",
              stocks.len(), criteria.min_yield_percent, criteria.earliest_year());

        let mut report = ScreeningReport::default();

        for stock in &stocks {
            self.screen_stock(stock, &prices, criteria, &mut report).await;
            report.processed += 1;

            if self.config.pace_every > 0
                && report.processed % self.config.pace_every == 0
                && report.processed < stocks.len()
            {
                info!("已处理 {}/{} 只股票，暂停 {:?}", report.processed, stocks.len(), self.config.pace_delay);
                tokio::time::sleep(self.config.pace_delay).await;
            }
        }

        screener::sort_by_yield_desc(&mut report.results);
        Ok(report)
    }

    /// 运行筛选并写出 Excel
    pub async fn run_and_export(&self) -> Result<ScreeningReport> {
        let report = self.run().await?;
        self.export(&report)?;
        Ok(report)
    }

    pub fn export(&self, report: &ScreeningReport) -> Result<()> {
        info!("Saving screening report to {}", self.config.output_path);
        xlsx_utils::save_tables_to_xlsx(&report.to_tables(), &self.config.output_path)?;

        info!("✓ 高股息股票: {} 只", report.results.len());
        info!("✓ 分红记录: {} 条", report.dividend_records.len());
        info!("✓ 无分红数据的股票: {} 只", report.no_dividend.len());
        info!("✓ 数据获取失败的股票: {} 只", report.failures.len());
        info!("数据已保存到 {}", self.config.output_path);
        Ok(())
    }
}
