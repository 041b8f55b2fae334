use thiserror::Error;

use crate::http::HttpFailure;

/// 补全调用的分类失败
///
/// 每一类都必须能被上层区分，生成器据此构造面向用户的错误信息而不是直接崩溃。
#[derive(Error, Debug)]
pub enum CompletionError {
    /// 未配置 API Key，属于配置错误，直接提示用户，不重试
    #[error("api key not configured")]
    ApiKeyMissing,
    #[error("unauthorized, check api key")]
    Unauthorized,
    #[error("request timed out")]
    Timeout,
    #[error("service unreachable: {0}")]
    Unreachable(String),
    #[error("request failed, status code: {status}, message: {message}")]
    RequestFailed { status: u16, message: String },
    /// 服务方在响应体里报告的错误（HTTP 状态可能仍是 200）
    #[error("upstream error: {0}")]
    UpstreamError(String),
    /// 响应解析成功但没有可用的回复文本
    #[error("completion contains no usable text")]
    EmptyCompletion,
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<HttpFailure> for CompletionError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Timeout => CompletionError::Timeout,
            HttpFailure::Unreachable(message) => CompletionError::Unreachable(message),
            HttpFailure::Status { status: 401, .. } => CompletionError::Unauthorized,
            HttpFailure::Status { status, body } => {
                // 错误响应体往往也是 {"error": {"message": ...}} 信封，优先取其中的 message
                let message = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|value| {
                        value
                            .pointer("/error/message")
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| crate::http::truncate_body(&body));
                CompletionError::RequestFailed { status, message }
            }
            HttpFailure::Malformed(message) => CompletionError::MalformedResponse(message),
        }
    }
}

impl CompletionError {
    /// 是否属于网络类失败（调用方可自行决定重试策略）
    #[allow(dead_code)]
    pub fn is_network(&self) -> bool {
        matches!(self, CompletionError::Timeout | CompletionError::Unreachable(_))
    }
}
