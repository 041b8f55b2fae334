use thiserror::Error;

use crate::http::HttpFailure;

/// 天气链路（地理编码 + 预报）的分类失败
#[derive(Error, Debug)]
pub enum WeatherError {
    /// 未配置对应服务的 API Key
    #[error("api key not configured")]
    ApiKeyMissing,
    /// 查询成功但没有任何匹配的地点
    #[error("place not found: {0}")]
    PlaceNotFound(String),
    #[error("service unreachable: {0}")]
    ServiceUnreachable(String),
    #[error("request timed out")]
    Timeout,
    #[error("request failed, status code: {0}")]
    RequestFailed(u16),
    /// 响应缺少必需字段，不允许静默使用默认值
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<HttpFailure> for WeatherError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Timeout => WeatherError::Timeout,
            HttpFailure::Unreachable(message) => WeatherError::ServiceUnreachable(message),
            HttpFailure::Status { status, .. } => WeatherError::RequestFailed(status),
            HttpFailure::Malformed(message) => WeatherError::MalformedResponse(message),
        }
    }
}
