use axum::http::StatusCode;
use thiserror::Error;

use crate::generator::GenerateError;
use crate::openrouter::CompletionError;
use crate::weather::WeatherError;

/// API 层的分类错误，决定 HTTP 状态码与面向用户的文案
#[derive(Error, Debug)]
pub enum InnerApiError {
    #[error("资源不存在: {0}")]
    NotFound(i32),
    #[error("{0}")]
    NotFoundDetail(String),
    #[error("请求参数错误: {0}")]
    BadRequest(String),
    /// 上游供应方（AI / 天气）失败，可稍后重试
    #[error("上游服务暂不可用: {0}")]
    BadGateway(String),
    #[error("服务内部错误: {0}")]
    Internal(String),
}

impl InnerApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InnerApiError::NotFound(_) | InnerApiError::NotFoundDetail(_) => StatusCode::NOT_FOUND,
            InnerApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            InnerApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            InnerApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 生成器错误到 API 错误的映射
///
/// 网络 / 供应方失败归 502，配置缺失与解析失败归 500；
/// 模型原始输出只进日志，这里的文案都是给用户看的简短提示。
pub fn map_generate_error(error: GenerateError) -> InnerApiError {
    match error {
        GenerateError::Completion(CompletionError::ApiKeyMissing) => {
            InnerApiError::Internal("AI 服务尚未配置 API Key".to_string())
        }
        GenerateError::Completion(CompletionError::Unauthorized) => {
            InnerApiError::BadGateway("AI 服务鉴权失败，请检查 API Key".to_string())
        }
        GenerateError::Completion(CompletionError::Timeout) => {
            InnerApiError::BadGateway("AI 服务响应超时".to_string())
        }
        GenerateError::Completion(CompletionError::Unreachable(_)) => {
            InnerApiError::BadGateway("无法连接 AI 服务".to_string())
        }
        GenerateError::Completion(CompletionError::UpstreamError(message)) => {
            InnerApiError::BadGateway(format!("AI 服务报告错误: {}", message))
        }
        GenerateError::Completion(CompletionError::RequestFailed { status, .. }) => {
            InnerApiError::BadGateway(format!("AI 服务请求失败（HTTP {}）", status))
        }
        GenerateError::Completion(CompletionError::EmptyCompletion) => {
            InnerApiError::BadGateway("AI 服务返回了空回复".to_string())
        }
        GenerateError::Completion(CompletionError::MalformedResponse(_)) => {
            InnerApiError::BadGateway("AI 服务返回了无法识别的响应".to_string())
        }
        GenerateError::Unparseable(_) => {
            InnerApiError::Internal("AI 回复无法解析为有效结构，请稍后重试".to_string())
        }
        GenerateError::Internal(e) => InnerApiError::Internal(e.to_string()),
    }
}

/// 天气链路错误到 API 错误的映射
pub fn map_weather_error(error: WeatherError) -> InnerApiError {
    match error {
        WeatherError::ApiKeyMissing => InnerApiError::Internal("天气服务尚未配置 API Key".to_string()),
        WeatherError::PlaceNotFound(city) => {
            InnerApiError::NotFoundDetail(format!("找不到地点 '{}' 对应的坐标", city))
        }
        WeatherError::Timeout => InnerApiError::BadGateway("天气服务响应超时".to_string()),
        WeatherError::ServiceUnreachable(_) => InnerApiError::BadGateway("无法连接天气服务".to_string()),
        WeatherError::RequestFailed(status) => {
            InnerApiError::BadGateway(format!("天气服务请求失败（HTTP {}）", status))
        }
        WeatherError::MalformedResponse(_) => {
            InnerApiError::BadGateway("天气服务返回了无法识别的响应".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::json_recovery::JsonRecoveryError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(InnerApiError::NotFound(1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            InnerApiError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            InnerApiError::BadGateway("x".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_network_failures_map_to_bad_gateway() {
        let error = map_generate_error(GenerateError::Completion(CompletionError::Timeout));
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_unparseable_maps_to_internal() {
        let error = map_generate_error(GenerateError::Unparseable(JsonRecoveryError {
            reason: "no json".to_string(),
            snippet: String::new(),
        }));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_place_not_found_maps_to_404() {
        let error = map_weather_error(WeatherError::PlaceNotFound("Atlantis".to_string()));
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
