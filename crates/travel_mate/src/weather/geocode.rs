//! 正向地理编码：自由文本地名 -> 经纬度
//!
//! 上游没有歧义消除界面，固定取第一个候选结果。

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::WeatherConfig;
use crate::http;
use crate::weather::error::WeatherError;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    addresses: Vec<GeocodeAddress>,
}

#[derive(Debug, Deserialize)]
struct GeocodeAddress {
    geometry: Option<GeocodeGeometry>,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    /// GeoJSON 顺序：[经度, 纬度]
    #[serde(default)]
    coordinates: Vec<f64>,
}

/// 解析地名，返回 (纬度, 经度)
pub async fn geocode_city(client: &Client, config: &WeatherConfig, city: &str) -> Result<(f64, f64), WeatherError> {
    let api_key = match &config.geocode_api_key {
        Some(key) if !key.trim().is_empty() => key.clone(),
        _ => return Err(WeatherError::ApiKeyMissing),
    };

    let url = format!("{}/v1/geocode/forward", config.geocode_base_url.trim_end_matches('/'));
    let request = client
        .get(url)
        .query(&[("query", city), ("limit", "1")])
        .header(reqwest::header::AUTHORIZATION, api_key);

    let response: GeocodeResponse = http::execute_json(request, "geocode").await?;

    let Some(address) = response.addresses.into_iter().next() else {
        warn!("地理编码没有返回任何候选地点: {}", city);
        return Err(WeatherError::PlaceNotFound(city.to_string()));
    };

    // 坐标字段缺失视为响应畸形，绝不默认为 (0, 0)
    let coordinates = address.geometry.map(|g| g.coordinates).unwrap_or_default();
    if coordinates.len() < 2 {
        warn!("地理编码结果缺少坐标字段: {}", city);
        return Err(WeatherError::MalformedResponse(
            "geocode result missing coordinates".to_string(),
        ));
    }

    Ok((coordinates[1], coordinates[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocode_response_first_address() {
        let body = r#"{"addresses":[
            {"geometry":{"type":"Point","coordinates":[2.3522,48.8566]},"formattedAddress":"Paris, France"},
            {"geometry":{"type":"Point","coordinates":[-95.5555,33.6609]},"formattedAddress":"Paris, TX"}
        ]}"#;
        let response: GeocodeResponse = serde_json::from_str(body).unwrap();
        let first = &response.addresses[0];
        let coordinates = &first.geometry.as_ref().unwrap().coordinates;
        // 纬度在后，经度在前
        assert_eq!(coordinates[1], 48.8566);
        assert_eq!(coordinates[0], 2.3522);
    }

    #[test]
    fn test_geocode_response_empty() {
        let response: GeocodeResponse = serde_json::from_str(r#"{"addresses":[]}"#).unwrap();
        assert!(response.addresses.is_empty());
    }

    #[test]
    fn test_geocode_response_missing_geometry() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"addresses":[{"formattedAddress":"Nowhere"}]}"#).unwrap();
        assert!(response.addresses[0].geometry.is_none());
    }
}
