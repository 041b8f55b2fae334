//! 模型输出的 JSON 修复管线
//!
//! 模型声称会"只输出 JSON 对象"，实际经常混入说明文字、markdown 代码围栏
//! 或字面转义序列。这里按固定顺序尝试一组修复策略，任一策略解析成功且
//! 通过结构校验即停止：
//!
//! 1. 直接解析（去除首尾空白）
//! 2. 剥掉 markdown 代码围栏（带或不带语言标记）后重试
//! 3. 截取第一个 `{` 到最后一个 `}` 的子串后重试
//! 4. 还原常见的字面转义（`\"` 等）后重试
//!
//! 全部失败返回携带诊断片段的错误，诊断内容只进日志，绝不展示给最终用户。

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// 诊断片段在失败位置两侧各保留的字符数
const SNIPPET_RADIUS: usize = 40;

/// 修复失败（所有策略都没有产出通过结构校验的对象）
#[derive(Error, Debug)]
#[error("unable to recover json object: {reason}")]
pub struct JsonRecoveryError {
    pub reason: String,
    /// 失败位置附近的上下文片段，仅用于日志
    pub snippet: String,
}

/// 结构校验要求
///
/// 解析结果必须是对象，包含指定的顶层数组键，且数组的每个元素都是携带
/// 全部指定子键的对象。语法解析成功但结构不符与解析失败同等对待。
#[derive(Clone, Copy, Debug)]
pub struct ShapeSpec<'a> {
    pub array_key: &'a str,
    pub element_keys: &'a [&'a str],
}

/// 校验解析结果是否满足结构要求
pub fn validate_shape(value: &Value, shape: &ShapeSpec) -> bool {
    let Some(array) = value.get(shape.array_key).and_then(Value::as_array) else {
        return false;
    };
    array.iter().all(|element| {
        element
            .as_object()
            .is_some_and(|object| shape.element_keys.iter().all(|key| object.contains_key(*key)))
    })
}

/// 同义键折叠：模型偶尔返回单数键名，在结构校验前统一改写为规范键
///
/// 顶层 `category` -> `categories`；各分类元素内 `item` -> `items`。
/// 已存在规范键时不覆盖。
pub fn fold_key_synonyms(value: &mut Value) {
    if let Some(object) = value.as_object_mut() {
        if !object.contains_key("categories") {
            if let Some(moved) = object.remove("category") {
                object.insert("categories".to_string(), moved);
            }
        }
    }

    if let Some(categories) = value.get_mut("categories").and_then(Value::as_array_mut) {
        for element in categories {
            if let Some(object) = element.as_object_mut() {
                if !object.contains_key("items") {
                    if let Some(moved) = object.remove("item") {
                        object.insert("items".to_string(), moved);
                    }
                }
            }
        }
    }
}

/// 运行修复管线，返回第一个通过结构校验的对象
pub fn recover_object(raw: &str, shape: &ShapeSpec) -> Result<Value, JsonRecoveryError> {
    let trimmed = raw.trim();
    let mut last_failure: Option<(String, String)> = None;

    for (stage, candidate) in build_candidates(trimmed) {
        match serde_json::from_str::<Value>(&candidate) {
            Ok(mut value) => {
                fold_key_synonyms(&mut value);
                if validate_shape(&value, shape) {
                    debug!("JSON 修复在策略 [{}] 成功", stage);
                    return Ok(value);
                }
                last_failure = Some((
                    format!("stage {} parsed but failed shape validation", stage),
                    diagnostic_snippet(&candidate, 0),
                ));
            }
            Err(e) => {
                let offset = error_offset(&candidate, &e);
                last_failure = Some((format!("stage {}: {}", stage, e), diagnostic_snippet(&candidate, offset)));
            }
        }
    }

    let (reason, snippet) = last_failure.unwrap_or_else(|| ("empty input".to_string(), String::new()));
    warn!("JSON 修复失败: {} | 上下文: {}", reason, snippet);
    Err(JsonRecoveryError { reason, snippet })
}

/// 按顺序构造各策略的候选文本，跳过与前一策略相同的候选
fn build_candidates(trimmed: &str) -> Vec<(&'static str, String)> {
    let mut candidates: Vec<(&'static str, String)> = vec![("direct", trimmed.to_string())];

    if let Some(unfenced) = strip_code_fence(trimmed) {
        if unfenced != trimmed {
            candidates.push(("fence-stripped", unfenced));
        }
    }

    // 围栏剥离后的文本里再找大括号范围，覆盖"说明文字 + JSON"的混合输出
    let fence_base = candidates.last().map(|(_, text)| text.clone()).unwrap_or_default();
    if let Some(span) = brace_span(&fence_base) {
        if candidates.iter().all(|(_, text)| *text != span) {
            candidates.push(("brace-span", span));
        }
    }

    let unescape_base = candidates.last().map(|(_, text)| text.clone()).unwrap_or_default();
    let unescaped = unescape_common(&unescape_base);
    if unescaped != unescape_base {
        candidates.push(("unicode-unescape", unescaped));
    }

    candidates
}

/// 剥掉 markdown 代码围栏，返回围栏内的文本
fn strip_code_fence(text: &str) -> Option<String> {
    let text = text.trim();
    if !text.starts_with("```") {
        return None;
    }

    let inner = match text.find('\n') {
        // 首行是 ``` 或 ```json 之类的语言标记，跳过整行
        Some(newline) => &text[newline + 1..],
        // 单行形式：```{...}```
        None => text.trim_start_matches('`'),
    };
    let inner = inner.trim_end();
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    Some(inner.trim().to_string())
}

/// 截取第一个 `{` 到最后一个 `}` 的范围（含两端）
fn brace_span(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}

/// 还原常见的字面转义序列
///
/// 只处理模型输出里实际出现过的几种（`\"` `\n` `\t` `\\`），不是完整的
/// JSON 反转义。该策略排在最后，只在前面全部失败时才会执行。
fn unescape_common(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(current) = chars.next() {
        if current != '\\' {
            result.push(current);
            continue;
        }
        match chars.peek() {
            Some('"') => {
                result.push('"');
                chars.next();
            }
            Some('n') => {
                result.push('\n');
                chars.next();
            }
            Some('t') => {
                result.push('\t');
                chars.next();
            }
            Some('\\') => {
                result.push('\\');
                chars.next();
            }
            _ => result.push(current),
        }
    }
    result
}

/// 由 serde_json 的行列信息推算失败处的字节偏移
fn error_offset(text: &str, error: &serde_json::Error) -> usize {
    let mut offset = 0usize;
    for (index, line) in text.split('\n').enumerate() {
        if index + 1 == error.line() {
            offset += error.column().saturating_sub(1);
            break;
        }
        offset += line.len() + 1;
    }
    offset.min(text.len())
}

/// 截取失败位置两侧的上下文片段
fn diagnostic_snippet(text: &str, offset: usize) -> String {
    let mut start = offset.saturating_sub(SNIPPET_RADIUS);
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    let mut end = (offset + SNIPPET_RADIUS).min(text.len());
    while end > start && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("offset {}: ...{}...", offset, &text[start..end])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SHAPE: ShapeSpec = ShapeSpec {
        array_key: "categories",
        element_keys: &["name", "items"],
    };

    const VALID: &str = r#"{"categories":[{"name":"Clothing","items":[{"name":"T-shirt","quantity":3}]}]}"#;

    fn expected() -> Value {
        json!({"categories":[{"name":"Clothing","items":[{"name":"T-shirt","quantity":3}]}]})
    }

    #[test]
    fn test_direct_parse() {
        assert_eq!(recover_object(VALID, &SHAPE).unwrap(), expected());
    }

    #[test]
    fn test_fence_with_language_tag() {
        let raw = format!("```json\n{}\n```", VALID);
        assert_eq!(recover_object(&raw, &SHAPE).unwrap(), expected());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = format!("```\n{}\n```", VALID);
        assert_eq!(recover_object(&raw, &SHAPE).unwrap(), expected());
    }

    #[test]
    fn test_surrounding_prose() {
        let raw = format!("Sure! Here is your packing list:\n{}\nLet me know if you need more.", VALID);
        assert_eq!(recover_object(&raw, &SHAPE).unwrap(), expected());
    }

    #[test]
    fn test_prose_and_fence_combined() {
        let raw = format!("Here you go:\n```json\n{}\n```\nEnjoy your trip!", VALID);
        assert_eq!(recover_object(&raw, &SHAPE).unwrap(), expected());
    }

    #[test]
    fn test_escaped_quotes() {
        let raw = VALID.replace('"', "\\\"");
        assert_eq!(recover_object(&raw, &SHAPE).unwrap(), expected());
    }

    #[test]
    fn test_refusal_text_is_unparseable() {
        let error = recover_object("Sorry, I can't help with that.", &SHAPE).unwrap_err();
        assert!(!error.reason.is_empty());
    }

    #[test]
    fn test_no_brace_span_is_unparseable() {
        assert!(recover_object("no json here at all", &SHAPE).is_err());
        assert!(recover_object("", &SHAPE).is_err());
    }

    #[test]
    fn test_valid_json_wrong_shape_is_unparseable() {
        // 语法合法但缺少 categories 数组，与解析失败同等对待
        let error = recover_object(r#"{"result": "ok"}"#, &SHAPE).unwrap_err();
        assert!(error.reason.contains("shape validation"));
    }

    #[test]
    fn test_element_missing_subkey_is_unparseable() {
        let raw = r#"{"categories":[{"name":"Clothing"}]}"#;
        assert!(recover_object(raw, &SHAPE).is_err());
    }

    #[test]
    fn test_singular_key_folded() {
        let raw = r#"{"category":[{"name":"Clothing","items":[]}]}"#;
        let value = recover_object(raw, &SHAPE).unwrap();
        assert!(value.get("categories").is_some());
        assert!(value.get("category").is_none());
    }

    #[test]
    fn test_element_singular_item_key_folded() {
        let raw = r#"{"categories":[{"name":"Clothing","item":[{"name":"Socks"}]}]}"#;
        let value = recover_object(raw, &SHAPE).unwrap();
        assert!(value["categories"][0].get("items").is_some());
    }

    #[test]
    fn test_fold_does_not_overwrite_existing_key() {
        let mut value = json!({"categories": [], "category": "junk"});
        fold_key_synonyms(&mut value);
        assert_eq!(value["categories"], json!([]));
    }

    #[test]
    fn test_diagnostic_snippet_window() {
        let text = "a".repeat(200);
        let snippet = diagnostic_snippet(&text, 100);
        // 两侧各 40 字符再加前后缀
        assert!(snippet.contains(&"a".repeat(80)));
        assert!(snippet.starts_with("offset 100:"));
    }

    #[test]
    fn test_error_offset_multiline() {
        let text = "{\n\"key\": oops\n}";
        let error = serde_json::from_str::<Value>(text).unwrap_err();
        let offset = error_offset(text, &error);
        assert!(offset <= text.len());
        assert!(offset > 0);
    }
}
