pub struct Config {
    pub debug_mode: bool,
    pub debug_symbol_limit: usize,
    pub data_dir: String,
    pub window_size: usize,
    pub close_trend_days: Vec<usize>,
    pub earnings_days_in_past: usize,
    pub remote_base_url: Option<String>,
    pub profile_refresh_days: i64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            debug_symbol_limit: 10,
            data_dir: "data".to_string(),
            window_size: 20,
            close_trend_days: vec![1, 3, 9],
            earnings_days_in_past: 15,
            remote_base_url: None,
            profile_refresh_days: 7,
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_symbol_limit(mut self, limit: usize) -> Self {
        self.debug_symbol_limit = limit;
        self
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = dir.to_string();
        self
    }

    // SMA 与标准差的窗口长度
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_close_trend_days(mut self, days: Vec<usize>) -> Self {
        self.close_trend_days = days;
        self
    }

    pub fn with_earnings_days_in_past(mut self, days: usize) -> Self {
        self.earnings_days_in_past = days;
        self
    }

    pub fn with_remote_base_url(mut self, url: &str) -> Self {
        self.remote_base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    // 公司资料缓存的有效天数
    pub fn with_profile_refresh_days(mut self, days: i64) -> Self {
        self.profile_refresh_days = days;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
