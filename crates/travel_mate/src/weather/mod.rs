pub mod error;
pub mod filter;
pub mod forecast;
pub mod geocode;
pub mod summary;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::WeatherConfig;
pub use error::WeatherError;
pub use forecast::ForecastEntry;

/// 构建天气链路共用的 HTTP 客户端（携带配置的超时）
pub fn build_client(config: &WeatherConfig) -> Result<Client, WeatherError> {
    Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds.max(5)))
        .build()
        .map_err(|e| WeatherError::ServiceUnreachable(e.to_string()))
}

/// 拉取目的地天气并生成一句话摘要（行李清单提示词用）
///
/// 任何一环失败都退化为 "Weather unavailable: ..." 的占位句，
/// 不向上传播错误，行李清单生成不因天气不可用而中断。
pub async fn fetch_weather_digest(
    config: &WeatherConfig,
    destination: &str,
    date_leaving: chrono::NaiveDate,
    date_returning: chrono::NaiveDate,
) -> String {
    info!(
        "获取 {} 在 {} ~ {} 的天气摘要",
        destination, date_leaving, date_returning
    );

    let client = match build_client(config) {
        Ok(client) => client,
        Err(e) => {
            warn!("构建天气客户端失败: {}", e);
            return "Weather unavailable: Failed to contact geocoding service.".to_string();
        }
    };

    let (latitude, longitude) = match geocode::geocode_city(&client, config, destination).await {
        Ok(coordinates) => coordinates,
        Err(WeatherError::PlaceNotFound(city)) => {
            return format!("Weather unavailable: Could not find coordinates for '{}'.", city);
        }
        Err(e) => {
            warn!("地理编码失败: {}", e);
            return "Weather unavailable: Failed to contact geocoding service.".to_string();
        }
    };

    let forecast = match forecast::fetch_forecast(&client, config, latitude, longitude).await {
        Ok(forecast) => forecast,
        Err(WeatherError::MalformedResponse(e)) => {
            warn!("预报响应结构不合法: {}", e);
            return "Weather unavailable: Received invalid data structure from weather service.".to_string();
        }
        Err(e) => {
            warn!("拉取预报失败: {}", e);
            return "Weather unavailable: Could not fetch forecast data.".to_string();
        }
    };

    let filtered = filter::filter_entries(&forecast.list, date_leaving, date_returning);
    summary::summarize_forecast(&filtered, &forecast.city.name)
}
