pub mod manager;

use std::path::PathBuf;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub use manager::ConfigManager;

/// 配置目录（数据库等持久化文件都放在这里）
pub static CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .expect("无法获取系统配置目录")
        .join("travel-mate")
});

/// 应用配置
///
/// 所有字段都有默认值，数据库 config_items 中的项按顶层键覆盖默认值，
/// 三个外部服务密钥可再被环境变量覆盖（便于容器部署）。
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务监听地址
    pub bind_address: String,
    pub openrouter: OpenRouterConfig,
    pub weather: WeatherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:12420".to_string(),
            openrouter: OpenRouterConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

/// AI 补全服务配置
///
/// 走 **OpenAI 兼容** 的 chat/completions 接口（OpenRouter / OpenAI / 其它兼容服务都可）。
/// 如果 api_key 为空，会直接返回错误，由调用方决定如何提示用户。
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// OpenAI 兼容接口 base url，例如：
    /// - https://openrouter.ai/api/v1
    /// - https://api.openai.com/v1
    pub base_url: String,
    /// API Key（用户自备），也可用 OPENROUTER_API_KEY 环境变量注入
    pub api_key: Option<String>,
    /// 模型名，例如 google/gemini-2.5-flash-preview / gpt-4o-mini
    pub model: String,
    /// 请求超时（秒）
    pub timeout_seconds: u64,
    /// 未显式指定时的 max_tokens 上限
    pub default_max_tokens: u32,
    /// HTTP-Referer 头（OpenRouter 用于流量归属统计）
    pub site_url: String,
    /// X-Title 头
    pub site_name: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: None,
            model: "google/gemini-2.5-flash-preview".to_string(),
            timeout_seconds: 30,
            default_max_tokens: 5000,
            site_url: "http://localhost".to_string(),
            site_name: "TravelMate".to_string(),
        }
    }
}

/// 天气链路配置（地理编码 + 预报）
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// 正向地理编码服务 base url
    pub geocode_base_url: String,
    /// 地理编码 API Key，也可用 GEOCODE_API_KEY 环境变量注入
    pub geocode_api_key: Option<String>,
    /// 天气预报服务 base url
    pub forecast_base_url: String,
    /// 预报 API Key，也可用 OWM_API_KEY 环境变量注入
    pub forecast_api_key: Option<String>,
    /// 请求超时（秒）
    pub timeout_seconds: u64,
    /// 预报服务可预测的最远天数（免费档为 5 天）
    pub forecast_horizon_days: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocode_base_url: "https://api.radar.io".to_string(),
            geocode_api_key: None,
            forecast_base_url: "https://api.openweathermap.org".to_string(),
            forecast_api_key: None,
            timeout_seconds: 10,
            forecast_horizon_days: 5,
        }
    }
}

impl Config {
    /// 用环境变量覆盖密钥类配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("OPENROUTER_API_KEY") {
            if !value.trim().is_empty() {
                self.openrouter.api_key = Some(value);
            }
        }
        if let Ok(value) = std::env::var("GEOCODE_API_KEY") {
            if !value.trim().is_empty() {
                self.weather.geocode_api_key = Some(value);
            }
        }
        if let Ok(value) = std::env::var("OWM_API_KEY") {
            if !value.trim().is_empty() {
                self.weather.forecast_api_key = Some(value);
            }
        }
        if let Ok(value) = std::env::var("TRAVEL_MATE_BIND") {
            if !value.trim().is_empty() {
                self.bind_address = value;
            }
        }
    }
}
