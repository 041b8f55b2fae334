//! 多日天气预报拉取
//!
//! 响应必须同时携带 list 条目数组与 city 地名，缺失任一都按响应畸形处理。

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WeatherConfig;
use crate::http::{self, HttpFailure};
use crate::weather::error::WeatherError;

/// 单条预报（3 小时粒度）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastEntry {
    /// UTC 秒级时间戳
    pub dt: i64,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<ForecastCondition>,
    /// 降水概率，[0, 1]，部分档位没有该字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pop: Option<f64>,
}

impl ForecastEntry {
    /// 主要天气状况标签（如 Clear / Rain），缺失时返回空串
    pub fn condition(&self) -> &str {
        self.weather.first().map(|c| c.main.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastMain {
    /// 温度（摄氏）
    pub temp: f64,
    /// 体感温度（摄氏）
    pub feels_like: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastCondition {
    /// 状况主类别，如 Clear / Clouds / Rain
    pub main: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastCity {
    pub name: String,
}

/// 预报响应，list 与 city 都是必需字段
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastEntry>,
    pub city: ForecastCity,
}

/// 按坐标拉取 5 天预报（公制单位）
pub async fn fetch_forecast(
    client: &Client,
    config: &WeatherConfig,
    latitude: f64,
    longitude: f64,
) -> Result<ForecastResponse, WeatherError> {
    let api_key = match &config.forecast_api_key {
        Some(key) if !key.trim().is_empty() => key.clone(),
        _ => return Err(WeatherError::ApiKeyMissing),
    };

    let url = format!(
        "{}/data/2.5/forecast",
        config.forecast_base_url.trim_end_matches('/')
    );
    let request = client.get(url).query(&[
        ("lat", latitude.to_string()),
        ("lon", longitude.to_string()),
        ("units", "metric".to_string()),
        ("appid", api_key),
    ]);

    let response: ForecastResponse = http::execute_json(request, "forecast").await.map_err(|failure| {
        // 必需字段缺失会表现为反序列化失败，归类为响应畸形
        match failure {
            HttpFailure::Malformed(message) => WeatherError::MalformedResponse(message),
            other => WeatherError::from(other),
        }
    })?;

    debug!(
        "预报拉取成功: {}，共 {} 条",
        response.city.name,
        response.list.len()
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "list": [
            {"dt": 1717243200, "main": {"temp": 21.5, "feels_like": 20.9, "humidity": 60},
             "weather": [{"id": 800, "main": "Clear", "description": "clear sky"}], "pop": 0.1},
            {"dt": 1717254000, "main": {"temp": 23.0, "feels_like": 22.4},
             "weather": [{"main": "Rain"}]}
        ],
        "city": {"name": "Paris", "country": "FR"}
    }"#;

    #[test]
    fn test_forecast_response_parse() {
        let response: ForecastResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.city.name, "Paris");
        assert_eq!(response.list.len(), 2);
        assert_eq!(response.list[0].condition(), "Clear");
        assert_eq!(response.list[0].pop, Some(0.1));
        assert_eq!(response.list[1].pop, None);
    }

    #[test]
    fn test_forecast_response_missing_city_is_error() {
        let body = r#"{"list": []}"#;
        assert!(serde_json::from_str::<ForecastResponse>(body).is_err());
    }

    #[test]
    fn test_forecast_response_missing_list_is_error() {
        let body = r#"{"city": {"name": "Paris"}}"#;
        assert!(serde_json::from_str::<ForecastResponse>(body).is_err());
    }
}
