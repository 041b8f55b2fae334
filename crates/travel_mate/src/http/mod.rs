//! 外部 HTTP 请求的统一封装
//!
//! 所有出站请求都经由这里发送：单次尝试、显式超时（由调用方构建的
//! `reqwest::Client` 携带）、状态码校验与失败分类。失败时记录分类结果与
//! 截断后的响应体，便于排查上游问题。这里不做自动重试，HTTP 4xx 永远不重试。

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// 日志中响应体的最大保留长度
const BODY_SNIPPET_LIMIT: usize = 500;

/// 出站请求的分类失败
#[derive(Error, Debug)]
pub enum HttpFailure {
    #[error("request timed out")]
    Timeout,
    #[error("service unreachable: {0}")]
    Unreachable(String),
    #[error("request failed, status code: {status}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// 将 reqwest 传输层错误归类为超时或不可达
pub fn classify_transport_error(error: &reqwest::Error) -> HttpFailure {
    if error.is_timeout() {
        HttpFailure::Timeout
    } else {
        HttpFailure::Unreachable(error.to_string())
    }
}

/// 截断响应体用于日志输出
pub fn truncate_body(body: &str) -> String {
    if body.chars().count() > BODY_SNIPPET_LIMIT {
        format!("{}...", body.chars().take(BODY_SNIPPET_LIMIT).collect::<String>())
    } else {
        body.to_string()
    }
}

/// 发送请求并将 2xx 响应体解析为目标类型
///
/// `context` 用于日志定位（如 "geocode" / "forecast" / "openrouter"）。
pub async fn execute_json<T: DeserializeOwned>(request: RequestBuilder, context: &str) -> Result<T, HttpFailure> {
    let response = request.send().await.map_err(|e| {
        let failure = classify_transport_error(&e);
        warn!("外部请求发送失败 [{}]: {}", context, failure);
        failure
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        let failure = classify_transport_error(&e);
        warn!("外部响应读取失败 [{}]: {}", context, failure);
        failure
    })?;

    if !status.is_success() {
        warn!(
            "外部请求返回非 2xx [{}]: {} - {}",
            context,
            status,
            truncate_body(&body)
        );
        return Err(HttpFailure::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!("外部响应解析失败 [{}]: {} - {}", context, e, truncate_body(&body));
        HttpFailure::Malformed(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body_short() {
        assert_eq!(truncate_body("ok"), "ok");
    }

    #[test]
    fn test_truncate_body_long() {
        let body = "x".repeat(600);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), BODY_SNIPPET_LIMIT + 3);
    }

    #[test]
    fn test_truncate_body_multibyte_boundary() {
        // 多字节字符按字符数截断，不应产生非法切片
        let body = "天".repeat(600);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
    }
}
