pub mod category;
pub mod chat;
pub mod json_recovery;
pub mod packing;
pub mod tips;

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::openrouter::CompletionError;
use json_recovery::JsonRecoveryError;

/// 生成器层的分类失败
///
/// 生成器永远返回该类型而不是让底层错误直接穿透，API 层据此决定
/// HTTP 状态码与面向用户的提示文案。
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),
    /// 模型回复经过全部修复策略后仍无法解析为目标结构
    #[error("model reply unparseable: {0}")]
    Unparseable(#[from] JsonRecoveryError),
    /// 数据库等内部失败
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 每个行程一把生成锁，避免并发重建互相覆盖
static GENERATION_LOCKS: Lazy<DashMap<i32, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

/// 获取指定行程的生成锁
///
/// 同一行程的行李清单 / 贴士重建会在这把锁上串行化；不同行程互不影响。
pub fn trip_generation_lock(trip_id: i32) -> Arc<Mutex<()>> {
    GENERATION_LOCKS
        .entry(trip_id)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}
