use std::time::Duration;

pub const DEFAULT_OUTPUT_FILE: &str = "股票分红数据汇总.xlsx";

pub struct Config {
    pub debug_mode: bool,
    pub debug_stock_limit: usize,
    pub output_path: String,
    pub min_yield_percent: f64,
    pub recency_years: i32,
    pub pace_every: usize,
    pub pace_delay: Duration,
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            debug_stock_limit: 10,
            output_path: DEFAULT_OUTPUT_FILE.to_string(),
            min_yield_percent: 3.0,
            recency_years: 2,
            pace_every: 50,
            pace_delay: Duration::from_secs(1),
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_stock_limit(mut self, limit: usize) -> Self {
        self.debug_stock_limit = limit;
        self
    }

    pub fn with_output_path(mut self, path: &str) -> Self {
        self.output_path = path.to_string();
        self
    }

    pub fn with_min_yield_percent(mut self, min_yield: f64) -> Self {
        self.min_yield_percent = min_yield;
        self
    }

    pub fn with_recency_years(mut self, years: i32) -> Self {
        self.recency_years = years;
        self
    }

    // 每处理 pace_every 只股票暂停一次，避免触发数据源限流
    pub fn with_pacing(mut self, every: usize, delay: Duration) -> Self {
        self.pace_every = every;
        self.pace_delay = delay;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
