//! 高股息筛选规则
//!
//! 对单只股票的分红记录与最新价做判定，不做任何 I/O。

use chrono::Datelike;
use std::cmp::Ordering;

use crate::models::dividend::{DividendRecord, ScreeningResult};
use crate::models::stock::{PriceQuote, StockIdentifier};
use crate::util::round2;

/// 筛选阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreeningCriteria {
    /// 最低股息率（百分比）
    pub min_yield_percent: f64,
    /// 最近一次现金分红的年份不得早于 current_year - recency_years
    pub recency_years: i32,
    pub current_year: i32,
}

impl ScreeningCriteria {
    pub fn new(current_year: i32) -> Self {
        Self {
            min_yield_percent: 3.0,
            recency_years: 2,
            current_year,
        }
    }

    pub fn with_min_yield_percent(mut self, min_yield: f64) -> Self {
        self.min_yield_percent = min_yield;
        self
    }

    pub fn with_recency_years(mut self, years: i32) -> Self {
        self.recency_years = years;
        self
    }

    pub fn earliest_year(&self) -> i32 {
        self.current_year - self.recency_years
    }
}

/// 单只股票的判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Qualified(ScreeningResult),
    /// 从未分红
    NoDividends,
    /// 只有送股/转增
    NoCashDividend,
    /// 最近一次现金分红太久远
    Stale { dividend_year: i32 },
    /// 无最新价或价格不为正
    NoPrice,
    LowYield { yield_percent: f64 },
}

/// 选出报告日期最新的现金分红记录
///
/// 同一天有多条时取派息比例最高的；仍相同时取先出现的那条。
pub fn latest_cash_record(records: &[DividendRecord]) -> Option<&DividendRecord> {
    records
        .iter()
        .filter(|r| r.is_cash())
        .fold(None, |best: Option<&DividendRecord>, r| match best {
            None => Some(r),
            Some(b) => {
                let newer = r.report_date > b.report_date;
                let same_day_richer = r.report_date == b.report_date && r.cash_ratio > b.cash_ratio;
                if newer || same_day_richer { Some(r) } else { Some(b) }
            }
        })
}

pub fn evaluate(
    stock: &StockIdentifier,
    records: &[DividendRecord],
    prices: &PriceQuote,
    criteria: &ScreeningCriteria,
) -> Verdict {
    if records.is_empty() {
        return Verdict::NoDividends;
    }

    let latest = match latest_cash_record(records) {
        Some(record) => record,
        None => return Verdict::NoCashDividend,
    };

    let dividend_year = latest.report_date.year();
    if dividend_year < criteria.earliest_year() {
        return Verdict::Stale { dividend_year };
    }

    let price = match prices.get(&stock.code) {
        Some(&p) if p > 0.0 => p,
        _ => return Verdict::NoPrice,
    };

    let dividend_per_share = latest.cash_ratio / 10.0;
    // 等价于 dividend_per_share / price * 100
    let yield_percent = latest.cash_ratio * 10.0 / price;
    if yield_percent < criteria.min_yield_percent {
        return Verdict::LowYield { yield_percent };
    }

    Verdict::Qualified(ScreeningResult {
        exchange: stock.exchange.clone(),
        code: stock.code.clone(),
        name: stock.name.clone(),
        latest_price: round2(price),
        dividend_per_share: round2(dividend_per_share),
        distribution_ratio: latest.cash_ratio,
        yield_percent: round2(yield_percent),
        dividend_year,
        record_date: latest.record_date,
        ex_dividend_date: latest.ex_dividend_date,
    })
}

/// 按股息率降序排列，股息率相同保持原有顺序
pub fn sort_by_yield_desc(results: &mut [ScreeningResult]) {
    results.sort_by(|a, b| {
        b.yield_percent
            .partial_cmp(&a.yield_percent)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dividend::DistributionKind;
    use chrono::NaiveDate;

    fn record(kind: DistributionKind, ratio: f64, y: i32, m: u32, d: u32) -> DividendRecord {
        DividendRecord {
            kind,
            plan_type: "年度分红".to_string(),
            cash_ratio: ratio,
            bonus_ratio: None,
            transfer_ratio: None,
            report_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            report_period: None,
            record_date: NaiveDate::from_ymd_opt(y, m, d),
            ex_dividend_date: None,
            payment_date: None,
            description: None,
        }
    }

    fn cash(ratio: f64, y: i32, m: u32, d: u32) -> DividendRecord {
        record(DistributionKind::Cash, ratio, y, m, d)
    }

    fn stock() -> StockIdentifier {
        StockIdentifier::new("SSE", "600000", "浦发银行")
    }

    fn prices(price: f64) -> PriceQuote {
        let mut p = PriceQuote::new();
        p.insert("600000".to_string(), price);
        p
    }

    fn criteria() -> ScreeningCriteria {
        ScreeningCriteria::new(2025)
    }

    #[test]
    fn no_records_is_excluded() {
        assert_eq!(evaluate(&stock(), &[], &prices(10.0), &criteria()), Verdict::NoDividends);
    }

    #[test]
    fn non_cash_only_is_excluded() {
        let records = vec![record(DistributionKind::Other, 0.0, 2024, 6, 1)];
        assert_eq!(evaluate(&stock(), &records, &prices(10.0), &criteria()), Verdict::NoCashDividend);
    }

    #[test]
    fn ratio_five_at_price_ten_yields_five_percent() {
        let records = vec![cash(5.0, 2024, 6, 1)];
        match evaluate(&stock(), &records, &prices(10.0), &criteria()) {
            Verdict::Qualified(r) => {
                assert_eq!(r.dividend_per_share, 0.5);
                assert_eq!(r.yield_percent, 5.0);
                assert_eq!(r.distribution_ratio, 5.0);
                assert_eq!(r.dividend_year, 2024);
                assert_eq!(r.latest_price, 10.0);
            }
            other => panic!("expected qualified, got {:?}", other),
        }
    }

    #[test]
    fn recency_window_is_three_years_inclusive() {
        let ok = vec![cash(5.0, 2023, 1, 1)];
        assert!(matches!(evaluate(&stock(), &ok, &prices(10.0), &criteria()), Verdict::Qualified(_)));

        let stale = vec![cash(5.0, 2022, 12, 31)];
        assert_eq!(
            evaluate(&stock(), &stale, &prices(10.0), &criteria()),
            Verdict::Stale { dividend_year: 2022 }
        );
    }

    #[test]
    fn stale_check_uses_latest_cash_record_only() {
        // 最近的是送股，现金分红是四年前
        let records = vec![
            cash(8.0, 2021, 6, 1),
            record(DistributionKind::Other, 0.0, 2024, 6, 1),
        ];
        assert_eq!(
            evaluate(&stock(), &records, &prices(10.0), &criteria()),
            Verdict::Stale { dividend_year: 2021 }
        );
    }

    #[test]
    fn zero_or_missing_price_is_excluded() {
        let records = vec![cash(5.0, 2024, 6, 1)];
        assert_eq!(evaluate(&stock(), &records, &prices(0.0), &criteria()), Verdict::NoPrice);
        assert_eq!(evaluate(&stock(), &records, &PriceQuote::new(), &criteria()), Verdict::NoPrice);
    }

    #[test]
    fn yield_below_threshold_is_excluded() {
        let records = vec![cash(2.9, 2024, 6, 1)];
        assert!(matches!(
            evaluate(&stock(), &records, &prices(10.0), &criteria()),
            Verdict::LowYield { .. }
        ));

        let exact = vec![cash(3.0, 2024, 6, 1)];
        assert!(matches!(
            evaluate(&stock(), &exact, &prices(10.0), &criteria()),
            Verdict::Qualified(_)
        ));
    }

    #[test]
    fn configurable_thresholds_apply() {
        let records = vec![cash(5.0, 2024, 6, 1)];
        let strict = criteria().with_min_yield_percent(6.0);
        assert!(matches!(evaluate(&stock(), &records, &prices(10.0), &strict), Verdict::LowYield { .. }));

        let old = vec![cash(5.0, 2020, 6, 1)];
        let wide = criteria().with_recency_years(5);
        assert!(matches!(evaluate(&stock(), &old, &prices(10.0), &wide), Verdict::Qualified(_)));
    }

    #[test]
    fn latest_by_report_date_wins() {
        let records = vec![cash(3.0, 2023, 6, 1), cash(6.0, 2024, 6, 1), cash(9.0, 2022, 6, 1)];
        assert_eq!(latest_cash_record(&records).unwrap().cash_ratio, 6.0);
    }

    #[test]
    fn same_day_tie_prefers_higher_ratio_then_first_seen() {
        let records = vec![cash(3.0, 2024, 6, 1), cash(4.5, 2024, 6, 1), cash(4.5, 2024, 6, 1)];
        let picked = latest_cash_record(&records).unwrap();
        assert!(std::ptr::eq(picked, &records[1]));
    }

    #[test]
    fn values_are_rounded_to_two_decimals() {
        let records = vec![cash(4.1, 2024, 6, 1)];
        match evaluate(&stock(), &records, &prices(12.346), &criteria()) {
            Verdict::Qualified(r) => {
                assert_eq!(r.latest_price, 12.35);
                assert_eq!(r.dividend_per_share, 0.41);
                assert_eq!(r.yield_percent, 3.32);
            }
            other => panic!("expected qualified, got {:?}", other),
        }
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let make = |code: &str, y: f64| ScreeningResult {
            exchange: "SSE".to_string(),
            code: code.to_string(),
            name: String::new(),
            latest_price: 1.0,
            dividend_per_share: 0.1,
            distribution_ratio: 1.0,
            yield_percent: y,
            dividend_year: 2024,
            record_date: None,
            ex_dividend_date: None,
        };
        let mut results = vec![make("a", 3.5), make("b", 6.0), make("c", 3.5), make("d", 4.0)];
        sort_by_yield_desc(&mut results);
        let codes: Vec<&str> = results.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["b", "d", "a", "c"]);
    }
}
