use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Asia::Shanghai;
use serde_json::Value;
use crate::errors::Result;

// 日期转换工具，兼容 "2024-06-20" 与 "2024-06-20 00:00:00"
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    let trimmed = date_str.trim();
    let day_part = trimmed.get(0..10).unwrap_or(trimmed);
    Ok(NaiveDate::parse_from_str(day_part, "%Y-%m-%d")?)
}

/// 北京时间的当前年份
pub fn current_year_cn() -> i32 {
    Utc::now().with_timezone(&Shanghai).year()
}

/// 四舍五入保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// 接口返回的数值可能是数字，也可能是字符串
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn value_as_date(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(|s| parse_date(s).ok())
}

// Excel 导出工具
pub mod xlsx_utils {
    use super::*;
    use crate::models::dividend::{DividendRecord, NoDividendStock, ScreeningResult, StockFailure};
    use crate::models::stock::StockIdentifier;
    use log::info;
    use rust_xlsxwriter::{Format, Workbook};
    use std::fs;
    use std::path::Path;

    pub const RESULTS_SHEET: &str = "高股息股票";
    pub const DIVIDENDS_SHEET: &str = "分红数据";
    pub const NO_DIVIDEND_SHEET: &str = "无分红股票";
    pub const FAILURES_SHEET: &str = "获取失败";

    /// 单元格
    #[derive(Debug, Clone, PartialEq)]
    pub enum Cell {
        Text(String),
        Number(f64),
        Date(NaiveDate),
        Empty,
    }

    impl From<&str> for Cell {
        fn from(s: &str) -> Self {
            Cell::Text(s.to_string())
        }
    }

    impl From<String> for Cell {
        fn from(s: String) -> Self {
            Cell::Text(s)
        }
    }

    impl From<f64> for Cell {
        fn from(v: f64) -> Self {
            Cell::Number(v)
        }
    }

    impl From<i32> for Cell {
        fn from(v: i32) -> Self {
            Cell::Number(v as f64)
        }
    }

    impl<T: Into<Cell>> From<Option<T>> for Cell {
        fn from(v: Option<T>) -> Self {
            v.map(Into::into).unwrap_or(Cell::Empty)
        }
    }

    impl From<NaiveDate> for Cell {
        fn from(d: NaiveDate) -> Self {
            Cell::Date(d)
        }
    }

    /// 一张工作表：表头 + 数据行
    #[derive(Debug, Clone)]
    pub struct Table {
        pub sheet_name: String,
        pub headers: Vec<String>,
        pub rows: Vec<Vec<Cell>>,
    }

    impl Table {
        pub fn new(sheet_name: &str, headers: &[&str]) -> Self {
            Self {
                sheet_name: sheet_name.to_string(),
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows: Vec::new(),
            }
        }

        pub fn push_row(&mut self, row: Vec<Cell>) {
            self.rows.push(row);
        }

        pub fn is_empty(&self) -> bool {
            self.rows.is_empty()
        }
    }

    // 将筛选结果转换为工作表
    pub fn results_table(results: &[ScreeningResult]) -> Table {
        let mut table = Table::new(RESULTS_SHEET, &[
            "股票代码", "股票名称", "交易所", "最新价", "每股分红", "派息比例(每10股)",
            "股息率(%)", "分红年度", "股权登记日", "除权除息日",
        ]);

        for r in results {
            table.push_row(vec![
                r.code.as_str().into(),
                r.name.as_str().into(),
                r.exchange.as_str().into(),
                r.latest_price.into(),
                r.dividend_per_share.into(),
                r.distribution_ratio.into(),
                r.yield_percent.into(),
                r.dividend_year.into(),
                r.record_date.into(),
                r.ex_dividend_date.into(),
            ]);
        }
        table
    }

    pub fn dividend_records_table(records: &[(StockIdentifier, DividendRecord)]) -> Table {
        let mut table = Table::new(DIVIDENDS_SHEET, &[
            "股票代码", "股票名称", "实施方案公告日期", "分红类型", "分红方式",
            "送股比例", "转增比例", "派息比例", "股权登记日", "除权日", "派息日",
            "实施方案分红说明", "报告时间",
        ]);

        for (stock, d) in records {
            table.push_row(vec![
                stock.code.as_str().into(),
                stock.name.as_str().into(),
                d.report_date.into(),
                d.plan_type.as_str().into(),
                d.kind.label().into(),
                d.bonus_ratio.into(),
                d.transfer_ratio.into(),
                d.cash_ratio.into(),
                d.record_date.into(),
                d.ex_dividend_date.into(),
                d.payment_date.into(),
                d.description.clone().into(),
                d.report_period.clone().into(),
            ]);
        }
        table
    }

    pub fn no_dividend_table(stocks: &[NoDividendStock]) -> Table {
        let mut table = Table::new(NO_DIVIDEND_SHEET, &["股票代码", "股票名称", "交易所", "备注"]);
        for s in stocks {
            table.push_row(vec![
                s.code.as_str().into(),
                s.name.as_str().into(),
                s.exchange.as_str().into(),
                s.note.as_str().into(),
            ]);
        }
        table
    }

    pub fn failures_table(failures: &[StockFailure]) -> Table {
        let mut table = Table::new(FAILURES_SHEET, &["股票代码", "股票名称", "备注"]);
        for f in failures {
            table.push_row(vec![
                f.code.as_str().into(),
                f.name.as_str().into(),
                f.note().into(),
            ]);
        }
        table
    }

    /// 将多张表写入同一个 xlsx 文件，每张表一个工作表
    ///
    /// 没有数据行的表会被跳过，但第一张表总会写出，保证文件至少有一个工作表
    pub fn save_tables_to_xlsx(tables: &[Table], path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let header_format = Format::new().set_bold();
        let mut workbook = Workbook::new();

        for (idx, table) in tables.iter().enumerate() {
            if idx > 0 && table.is_empty() {
                continue;
            }
            info!("  - {}: {} rows", table.sheet_name, table.rows.len());

            let worksheet = workbook.add_worksheet();
            worksheet.set_name(table.sheet_name.as_str())?;

            for (col, header) in table.headers.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, header.as_str(), &header_format)?;
            }

            for (i, row) in table.rows.iter().enumerate() {
                let row_idx = (i + 1) as u32;
                for (col, cell) in row.iter().enumerate() {
                    let col = col as u16;
                    match cell {
                        Cell::Text(s) => {
                            worksheet.write_string(row_idx, col, s.as_str())?;
                        }
                        Cell::Number(v) => {
                            worksheet.write_number(row_idx, col, *v)?;
                        }
                        Cell::Date(d) => {
                            worksheet.write_string(row_idx, col, d.format("%Y-%m-%d").to_string())?;
                        }
                        Cell::Empty => {}
                    }
                }
            }
        }

        workbook.save(path)?;
        info!("Saved workbook to {}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::xlsx_utils::*;
    use crate::models::dividend::{NoDividendStock, ScreeningResult};
    use crate::models::stock::StockIdentifier;
    use calamine::{open_workbook_auto, Reader};
    use serde_json::json;

    #[test]
    fn parse_date_accepts_datetime_suffix() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        assert_eq!(parse_date("2024-06-20").unwrap(), expected);
        assert_eq!(parse_date("2024-06-20 00:00:00").unwrap(), expected);
        assert!(parse_date("20240620").is_err());
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(4.3456), 4.35);
        assert_eq!(round2(0.5), 0.5);
        assert_eq!(round2(3.333333), 3.33);
    }

    #[test]
    fn json_values_accept_numbers_and_strings() {
        assert_eq!(value_as_f64(&json!(2.5)), Some(2.5));
        assert_eq!(value_as_f64(&json!("1,234.5")), Some(1234.5));
        assert_eq!(value_as_f64(&json!("-")), None);
        assert_eq!(value_as_f64(&Value::Null), None);
        assert_eq!(value_as_string(&json!("  ")), None);
        assert_eq!(value_as_string(&json!(" 2023年报 ")), Some("2023年报".to_string()));
    }

    #[test]
    fn workbook_contains_non_empty_sheets_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.xlsx");
        let path_str = path.to_str().unwrap();

        let results = vec![ScreeningResult {
            exchange: "SSE".to_string(),
            code: "600000".to_string(),
            name: "浦发银行".to_string(),
            latest_price: 10.0,
            dividend_per_share: 0.5,
            distribution_ratio: 5.0,
            yield_percent: 5.0,
            dividend_year: 2024,
            record_date: NaiveDate::from_ymd_opt(2024, 7, 10),
            ex_dividend_date: None,
        }];
        let no_dividend = vec![NoDividendStock::from_identifier(
            &StockIdentifier::new("SZSE", "000004", "国华网安"),
        )];

        let tables = vec![
            results_table(&results),
            dividend_records_table(&[]),
            no_dividend_table(&no_dividend),
            failures_table(&[]),
        ];
        save_tables_to_xlsx(&tables, path_str).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names().to_vec(), vec![RESULTS_SHEET.to_string(), NO_DIVIDEND_SHEET.to_string()]);

        let range = workbook.worksheet_range(RESULTS_SHEET).unwrap();
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].to_string(), "股票代码");
        assert_eq!(rows[1][0].to_string(), "600000");
        assert_eq!(rows[0][2].to_string(), "交易所");
        assert_eq!(rows[1][2].to_string(), "SSE");
        assert_eq!(rows[1][6].get_float(), Some(5.0));
        assert_eq!(rows[1][8].to_string(), "2024-07-10");

        let range = workbook.worksheet_range(NO_DIVIDEND_SHEET).unwrap();
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(rows[1][2].to_string(), "SZSE");
        assert_eq!(rows[1][3].to_string(), "无分红记录");
    }

    #[test]
    fn empty_results_sheet_is_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        save_tables_to_xlsx(&[results_table(&[]), failures_table(&[])], path.to_str().unwrap()).unwrap();

        let workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names().to_vec(), vec![RESULTS_SHEET.to_string()]);
    }
}
