use crate::models::stock::StockIdentifier;
use crate::errors::Result;
use async_trait::async_trait;
use log::debug;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// 交易所股票列表抓取器
#[async_trait]
pub trait StockListScraper {
    /// Get the exchange code this scraper is for
    fn exchange_code(&self) -> &'static str;

    /// Fetch all listed A-share identifiers of this exchange
    async fn fetch_stock_list(&self) -> Result<Vec<StockIdentifier>>;
}

/// 请求频率限制：两次请求之间至少间隔 min_interval
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(instant) = *last {
            let elapsed = instant.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!("等待 {:?} 以遵守频率限制", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// 去掉 JSONP 包装，例如 `jsonpCallback123({...})`
pub fn strip_jsonp(text: &str) -> &str {
    let trimmed = text.trim().trim_end_matches(';');
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    match (trimmed.find('('), trimmed.rfind(')')) {
        (Some(start), Some(end)) if start < end => &trimmed[start + 1..end],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_jsonp_unwraps_callback() {
        assert_eq!(strip_jsonp("jsonpCallback31050241({\"a\":1})"), "{\"a\":1}");
        assert_eq!(strip_jsonp("jQuery112_1({\"a\":(1)});"), "{\"a\":(1)}");
        assert_eq!(strip_jsonp("  {\"a\":1} "), "{\"a\":1}");
    }

    #[tokio::test]
    async fn throttle_spaces_consecutive_requests() {
        let throttle = RequestThrottle::new(Duration::from_millis(50));
        let start = Instant::now();
        throttle.wait().await;
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
