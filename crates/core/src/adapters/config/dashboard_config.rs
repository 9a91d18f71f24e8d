use std::time::Duration;

use serde::Deserialize;

use crate::domain::format::DEFAULT_VALUE_UNIT;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8501";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: usize = 200;

const DEFAULT_TITLE: &str = "압구정 공시가격 랭킹";
const DEFAULT_DISCLAIMER: &str = "※ 본 자료는 국토교통부 공시가격(2016~현재) 데이터를 기반으로 계산한 것으로, \
     재건축 시 실행될 감정평가액과 차이가 있을 수 있습니다.";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub disclaimer: String,
    pub value_unit: String,
    /// `0` fetches the sheet on every request.
    pub cache_ttl_secs: u64,
    /// Value year to rank by; the latest year column when unset.
    pub year: Option<i32>,
    /// Table rows rendered per page.
    pub page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            title: DEFAULT_TITLE.to_string(),
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            value_unit: DEFAULT_VALUE_UNIT.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            year: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl DashboardConfig {
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_ttl() {
        let config = DashboardConfig::default();
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(300)));

        let disabled = DashboardConfig {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(disabled.cache_ttl(), None);
    }
}
