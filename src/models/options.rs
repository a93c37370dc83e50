use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 周期权列表中的公司信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionableSymbol {
    #[serde(rename = "company name")]
    pub company_name: String,
}

/// 支持周期权的股票代码集合，整体加载、整体保存
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionableSymbols {
    symbols: BTreeMap<String, OptionableSymbol>,
}

impl OptionableSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, company_name: &str) {
        self.symbols.insert(
            symbol.to_string(),
            OptionableSymbol { company_name: company_name.to_string() },
        );
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    pub fn company_name(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(symbol).map(|s| s.company_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for OptionableSymbols {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut set = OptionableSymbols::new();
        for (symbol, company_name) in iter {
            set.insert(symbol, company_name);
        }
        set
    }
}
