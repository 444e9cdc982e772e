//! 巨潮资讯分红送转接口
//!
//! 每只股票一次 POST 请求，返回该股票全部历史分红方案。

use crate::errors::{Result, ScreenerError};
use crate::models::dividend::{DistributionKind, DividendRecord};
use crate::scrapers::base::RequestThrottle;
use crate::util::{parse_date, value_as_date, value_as_f64, value_as_string};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const CNINFO_BASE_URL: &str = "http://webapi.cninfo.com.cn";
const DIVIDEND_PATH: &str = "/api/sysapi/p_sysapi1139";

// 接口字段
const FIELD_DECLARE_DATE: &str = "DECLAREDATE";
const FIELD_PLAN_TYPE: &str = "F001V";
const FIELD_BONUS_RATIO: &str = "F003N";
const FIELD_TRANSFER_RATIO: &str = "F004N";
const FIELD_CASH_RATIO: &str = "F005N";
const FIELD_RECORD_DATE: &str = "F006D";
const FIELD_EX_DATE: &str = "F007D";
const FIELD_PAYMENT_DATE: &str = "F010D";
const FIELD_DESCRIPTION: &str = "F012V";
const FIELD_REPORT_PERIOD: &str = "F044V";

pub struct CninfoClient {
    client: Client,
    base_url: String,
    throttle: RequestThrottle,
}

impl CninfoClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(CNINFO_BASE_URL)
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

    // 接口要求的加密头：当前秒级时间戳的 base64
    fn enc_key() -> String {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        STANDARD.encode(ts.to_string())
    }

    /// 获取单只股票的全部分红记录
    pub async fn fetch_dividends(&self, code: &str) -> Result<Vec<DividendRecord>> {
        self.throttle.wait().await;

        let response = self.client
            .post(format!("{}{}", self.base_url, DIVIDEND_PATH))
            .form(&[("scode", code)])
            .header("Accept-EncKey", Self::enc_key())
            .header("Origin", "https://webapi.cninfo.com.cn")
            .header("Referer", "https://webapi.cninfo.com.cn/")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScreenerError::DataError(format!("HTTP {} for {}", status, code)));
        }

        let text = response.text().await?;
        let json: Value = serde_json::from_str(&text)?;
        let records = parse_dividend_records(&json)?;
        debug!("股票 {} 获取到 {} 条分红记录", code, records.len());
        Ok(records)
    }
}

/// 解析接口返回的 records 数组
///
/// 缺少 records 或公告日期视为数据格式错误；派息比例大于0的记录为现金分红。
pub fn parse_dividend_records(json: &Value) -> Result<Vec<DividendRecord>> {
    let records = json.get("records")
        .and_then(|r| r.as_array())
        .ok_or_else(|| ScreenerError::MalformedData("'records'".to_string()))?;

    records.iter().map(parse_record).collect()
}

fn field<'a>(item: &'a Value, name: &str) -> &'a Value {
    static NULL: Value = Value::Null;
    item.get(name).unwrap_or(&NULL)
}

fn parse_record(item: &Value) -> Result<DividendRecord> {
    let declare = item.get(FIELD_DECLARE_DATE)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ScreenerError::MalformedData(format!("'{}'", FIELD_DECLARE_DATE)))?;
    let report_date = parse_date(declare)
        .map_err(|_| ScreenerError::MalformedData(format!("'{}': {}", FIELD_DECLARE_DATE, declare)))?;

    let cash_ratio = value_as_f64(field(item, FIELD_CASH_RATIO)).unwrap_or(0.0);
    let kind = if cash_ratio > 0.0 {
        DistributionKind::Cash
    } else {
        DistributionKind::Other
    };

    Ok(DividendRecord {
        kind,
        plan_type: value_as_string(field(item, FIELD_PLAN_TYPE)).unwrap_or_default(),
        cash_ratio,
        bonus_ratio: value_as_f64(field(item, FIELD_BONUS_RATIO)),
        transfer_ratio: value_as_f64(field(item, FIELD_TRANSFER_RATIO)),
        report_date,
        report_period: value_as_string(field(item, FIELD_REPORT_PERIOD)),
        record_date: value_as_date(field(item, FIELD_RECORD_DATE)),
        ex_dividend_date: value_as_date(field(item, FIELD_EX_DATE)),
        payment_date: value_as_date(field(item, FIELD_PAYMENT_DATE)),
        description: value_as_string(field(item, FIELD_DESCRIPTION)),
    })
}
