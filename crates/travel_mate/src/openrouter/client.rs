//! OpenAI 兼容补全接口客户端
//!
//! 发送 chat/completions 请求并返回助手的原始回复文本，
//! 网络 / 鉴权 / 服务方错误 / 空回复分别归类，供生成器分流处理。

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::OpenRouterConfig;
use crate::http;
use crate::openrouter::error::CompletionError;

/// 对话消息（按 OpenAI 接口的 role/content 形式序列化）
#[derive(Serialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// 补全客户端，按请求构造（配置注入，不依赖全局状态）
#[derive(Debug)]
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterConfig,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(config: &OpenRouterConfig) -> Result<Self, CompletionError> {
        let api_key = match &config.api_key {
            Some(key) if !key.trim().is_empty() => key.clone(),
            _ => return Err(CompletionError::ApiKeyMissing),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(10)))
            .build()
            .map_err(|e| CompletionError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// 发送补全请求，返回助手回复的原始文本
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, CompletionError> {
        let max_tokens = max_tokens.unwrap_or(self.config.default_max_tokens);
        let base = self.config.base_url.trim_end_matches('/');

        info!(
            "发送补全请求（{}），max_tokens={}",
            self.config.model, max_tokens
        );

        let request = self
            .client
            .post(format!("{}/chat/completions", base))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", &self.config.site_name)
            .json(&ChatRequest {
                model: &self.config.model,
                messages,
                temperature,
                max_tokens,
            });

        let body: Value = http::execute_json(request, "openrouter").await?;
        let reply = parse_completion_body(&body)?;
        debug!("补全成功，回复长度 {} 字符", reply.chars().count());
        Ok(reply)
    }
}

/// 从补全响应体中提取回复文本
///
/// 服务方可能在 HTTP 200 的响应体里携带 error 信封，必须先检查；
/// choices 缺失、message.content 缺失或为空白都按空回复处理。
pub(crate) fn parse_completion_body(body: &Value) -> Result<String, CompletionError> {
    if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
        return Err(CompletionError::UpstreamError(message.to_string()));
    }

    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if content.is_empty() {
        return Err(CompletionError::EmptyCompletion);
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_completion_body_ok() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "  hello  "}}]
        });
        assert_eq!(parse_completion_body(&body).unwrap(), "hello");
    }

    #[test]
    fn test_parse_completion_body_error_envelope() {
        // HTTP 200 但响应体携带错误信封
        let body = json!({"error": {"message": "rate limited", "code": 429}});
        assert_matches!(
            parse_completion_body(&body),
            Err(CompletionError::UpstreamError(message)) if message == "rate limited"
        );
    }

    #[test]
    fn test_parse_completion_body_no_choices() {
        let body = json!({"choices": []});
        assert_matches!(parse_completion_body(&body), Err(CompletionError::EmptyCompletion));
    }

    #[test]
    fn test_parse_completion_body_null_content() {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
        assert_matches!(parse_completion_body(&body), Err(CompletionError::EmptyCompletion));
    }

    #[test]
    fn test_parse_completion_body_blank_content() {
        let body = json!({"choices": [{"message": {"content": "   "}}]});
        assert_matches!(parse_completion_body(&body), Err(CompletionError::EmptyCompletion));
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = OpenRouterConfig::default();
        assert_matches!(OpenRouterClient::new(&config), Err(CompletionError::ApiKeyMissing));
    }
}
