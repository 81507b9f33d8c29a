//! Insights page data: KPI formatting and the parallel stats/chart fetch.

use serde_json::Value;

use intellidash_shared::Stats;

use crate::api::ApiClient;
use crate::chart::ChartSpec;
use crate::error::ApiError;
use crate::request::HttpClient;
use crate::route::Navigator;
use crate::store::TokenStore;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load insights data";

/// Chart collection requested on the insights page.
pub const ALL_CHARTS: &str = "all";

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsightsData {
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartSpec>,
}

/// Fetches stats and charts concurrently; either failing fails the load.
pub async fn load<C: HttpClient, S: TokenStore, N: Navigator>(
    api: &ApiClient<C, S, N>,
) -> Result<InsightsData, ApiError> {
    let (stats, charts) = futures::try_join!(api.stats(), api.chart(ALL_CHARTS))?;
    Ok(InsightsData {
        kpis: kpis(&stats),
        charts: ChartSpec::collection(&charts),
    })
}

pub fn kpis(stats: &Stats) -> Vec<Kpi> {
    stats
        .iter()
        .map(|(key, value)| Kpi {
            label: kpi_label(key),
            value: format_value(value),
        })
        .collect()
}

/// `total_sales` -> `TOTAL SALES`
pub fn kpi_label(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Grouped thousands, at most three fraction digits, trailing zeros dropped.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }

    let rounded = (n * 1000.0).round() / 1000.0;
    let abs = rounded.abs();
    let whole = abs.trunc();
    let frac = ((abs - whole) * 1000.0).round() as u64;

    let mut out = group_thousands(&format!("{:.0}", whole));
    if frac > 0 {
        let digits = format!("{:03}", frac);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    if rounded < 0.0 && (whole > 0.0 || frac > 0) {
        out.insert(0, '-');
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::request::MockHttpClient;
    use crate::route::{AppRoute, MockNavigator};
    use crate::store::MemoryTokenStore;
    use serde_json::json;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1234.0), "1,234");
        assert_eq!(format_number(1234567.891), "1,234,567.891");
        assert_eq!(format_number(-45210.5), "-45,210.5");
        assert_eq!(format_number(0.12345), "0.123");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn test_kpis_from_stats() {
        let stats = json!({"total_sales": 1250000, "top_region": "EU", "growth_rate": 4.25})
            .as_object()
            .cloned()
            .unwrap();
        let kpis = kpis(&stats);
        let find = |label: &str| kpis.iter().find(|k| k.label == label).map(|k| k.value.clone());
        assert_eq!(find("TOTAL SALES").as_deref(), Some("1,250,000"));
        assert_eq!(find("TOP REGION").as_deref(), Some("EU"));
        assert_eq!(find("GROWTH RATE").as_deref(), Some("4.25"));
    }

    fn api() -> ApiClient<MockHttpClient, MemoryTokenStore, MockNavigator> {
        ApiClient::new(
            ClientConfig::new("http://api.test"),
            MockHttpClient::new(),
            MemoryTokenStore::with_token("t"),
            MockNavigator::at(AppRoute::Insights),
        )
    }

    #[tokio::test]
    async fn test_load_combines_both_requests() {
        let api = api();
        api.http()
            .mock_response("http://api.test/api/data/stats", 200, json!({"users": 42}));
        api.http().mock_response(
            "http://api.test/api/data/chart/all",
            200,
            json!({"Sales": {"type": "bar", "labels": ["Q1"], "datasets": [{"label": "EU", "data": [3]}]}}),
        );

        let data = load(&api).await.unwrap();
        assert_eq!(data.kpis, vec![Kpi { label: "USERS".into(), value: "42".into() }]);
        assert_eq!(data.charts.len(), 1);
        assert_eq!(data.charts[0].title, "Sales");
        assert_eq!(api.http().request_count(), 2);
    }

    #[tokio::test]
    async fn test_load_fails_if_either_fails() {
        let api = api();
        api.http()
            .mock_response("http://api.test/api/data/stats", 200, json!({"users": 42}));
        api.http()
            .mock_raw("http://api.test/api/data/chart/all", 500, "");

        assert!(matches!(load(&api).await, Err(ApiError::Server { .. })));
    }
}
