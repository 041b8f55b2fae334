//! 行程助手对话
//!
//! 系统提示词携带行程上下文，带上最近几轮历史消息调用补全服务，
//! 成功后把用户消息与助手回复一起落库（失败则不写任何记录）。

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use tracing::info;

use crate::generator::GenerateError;
use crate::openrouter::{ChatMessage, OpenRouterClient};
use travel_mate_entity::entities::{chat_message, trip};

/// 带入上下文的历史消息条数上限（5 轮对话）
const HISTORY_LIMIT: u64 = 10;

/// 构造携带行程上下文的系统提示词
pub fn build_chat_system_prompt(trip: &trip::Model) -> String {
    let activities = if trip.activities.trim().is_empty() {
        "Not specified"
    } else {
        trip.activities.as_str()
    };

    format!(
        "You are a travel assistant for TravelMate. You are helping with a trip to {destination} \
         from {leaving} to {returning}. Planned activities: {activities}. \
         Provide concise, helpful answers.",
        destination = trip.destination,
        leaving = trip.date_leaving.format("%Y-%m-%d"),
        returning = trip.date_returning.format("%Y-%m-%d"),
        activities = activities,
    )
}

/// 读取最近的历史消息（按时间正序返回）
async fn recent_history(connection: &DatabaseConnection, trip_id: i32) -> Result<Vec<chat_message::Model>> {
    let mut messages = chat_message::Entity::find()
        .filter(chat_message::Column::TripId.eq(trip_id))
        .order_by_desc(chat_message::Column::CreatedAt)
        .order_by_desc(chat_message::Column::Id)
        .limit(HISTORY_LIMIT)
        .all(connection)
        .await?;
    messages.reverse();
    Ok(messages)
}

/// 发送一条用户消息并返回助手回复
///
/// 补全成功后用户消息与助手回复各落一行；任何失败都不产生数据库写入。
pub async fn send_chat_message(
    connection: &DatabaseConnection,
    client: &OpenRouterClient,
    trip: &trip::Model,
    user_id: i32,
    message: &str,
) -> Result<String, GenerateError> {
    let history = recent_history(connection, trip.id).await?;

    let mut messages = Vec::with_capacity(2 + history.len());
    messages.push(ChatMessage::system(build_chat_system_prompt(trip)));
    for record in &history {
        if record.is_user_message {
            messages.push(ChatMessage::user(record.content.clone()));
        } else {
            messages.push(ChatMessage::assistant(record.content.clone()));
        }
    }
    messages.push(ChatMessage::user(message.to_string()));

    let reply = client.chat_completion(&messages, 0.7, None).await?;

    let now = Utc::now();
    let user_row = chat_message::ActiveModel {
        trip_id: Set(trip.id),
        user_id: Set(user_id),
        content: Set(message.to_string()),
        is_user_message: Set(true),
        created_at: Set(now),
        ..Default::default()
    };
    let assistant_row = chat_message::ActiveModel {
        trip_id: Set(trip.id),
        user_id: Set(user_id),
        content: Set(reply.clone()),
        is_user_message: Set(false),
        created_at: Set(now),
        ..Default::default()
    };
    user_row.insert(connection).await.map_err(anyhow::Error::from)?;
    assistant_row.insert(connection).await.map_err(anyhow::Error::from)?;

    info!("行程 {} 对话完成，回复 {} 字符", trip.id, reply.chars().count());
    Ok(reply)
}

/// 读取完整对话历史（按时间正序）
pub async fn list_messages(connection: &DatabaseConnection, trip_id: i32) -> Result<Vec<chat_message::Model>> {
    Ok(chat_message::Entity::find()
        .filter(chat_message::Column::TripId.eq(trip_id))
        .order_by_asc(chat_message::Column::CreatedAt)
        .order_by_asc(chat_message::Column::Id)
        .all(connection)
        .await?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_system_prompt_embeds_trip_context() {
        let trip = trip::Model {
            id: 7,
            user_id: 1,
            destination: "Lisbon".to_string(),
            date_leaving: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            date_returning: NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
            activities: "Surfing".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
        };
        let prompt = build_chat_system_prompt(&trip);
        assert!(prompt.contains("a trip to Lisbon"));
        assert!(prompt.contains("from 2024-05-02 to 2024-05-09"));
        assert!(prompt.contains("Planned activities: Surfing"));
    }

    #[test]
    fn test_system_prompt_without_activities() {
        let trip = trip::Model {
            id: 7,
            user_id: 1,
            destination: "Lisbon".to_string(),
            date_leaving: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            date_returning: NaiveDate::from_ymd_opt(2024, 5, 9).unwrap(),
            activities: String::new(),
            notes: String::new(),
            created_at: Utc::now(),
        };
        assert!(build_chat_system_prompt(&trip).contains("Not specified"));
    }
}
