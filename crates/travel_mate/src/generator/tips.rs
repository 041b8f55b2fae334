//! 旅行贴士生成
//!
//! 与行李清单同一套管线（提示词 -> 补全 -> JSON 修复 -> 类别归一化），
//! 但不注入天气摘要。贴士没有用户手动来源，重新生成时整表清空后重建。

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value;
use tracing::{info, warn};

use crate::database::begin_write_transaction;
use crate::generator::category::resolve_tip_category;
use crate::generator::json_recovery::{self, ShapeSpec};
use crate::generator::GenerateError;
use crate::openrouter::{ChatMessage, OpenRouterClient};
use travel_mate_entity::category::TipCategory;
use travel_mate_entity::entities::{tip_item, travel_tips, trip};

const TIPS_SYSTEM_PROMPT: &str = "You are a helpful travel assistant. Your task is to generate travel tips \
in JSON format based on the user's trip details and activities. Output ONLY the JSON object with categories: \
'Cultural Advice', 'Local Information', 'Must Have Items'.";

const TIPS_EXAMPLE: &str = r#"{
    "categories": [
        {
            "name": "Cultural Advice",
            "items": [
                {"tip": "Learn a few basic local phrases like 'hello' and 'thank you'."},
                {"tip": "Dress modestly when visiting religious sites."}
            ]
        },
        {
            "name": "Local Information",
            "items": [
                {"tip": "Public transport is efficient. Consider buying a multi-day pass."}
            ]
        },
        {
            "name": "Must Have Items",
            "items": [
                {"tip": "Comfortable walking shoes are essential."},
                {"tip": "A universal travel adapter if coming from abroad."}
            ]
        }
    ]
}"#;

const TIPS_SHAPE: ShapeSpec<'static> = ShapeSpec {
    array_key: "categories",
    element_keys: &["name", "items"],
};

/// 归一化后的贴士集合
#[derive(Debug, Clone, PartialEq)]
pub struct TipsPlan {
    pub categories: Vec<TipsPlanCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TipsPlanCategory {
    pub category: TipCategory,
    pub tips: Vec<String>,
}

impl TipsPlan {
    pub fn tip_count(&self) -> usize {
        self.categories.iter().map(|category| category.tips.len()).sum()
    }
}

/// 构造贴士提示词（不含天气）
pub fn build_tips_prompt(trip: &trip::Model) -> String {
    let activities = if trip.activities.trim().is_empty() {
        "General tourism and leisure"
    } else {
        trip.activities.as_str()
    };

    format!(
        "Create a list of helpful travel tips in JSON format for a trip to {destination} from {leaving} to {returning}.\n\
         \n\
         Consider the following details:\n\
         Destination: {destination}\n\
         Dates: {leaving_display} to {returning_display}\n\
         Planned Activities: {activities}\n\
         \n\
         The output MUST be a valid JSON object containing a single key \"categories\".\n\
         The \"categories\" key should hold a list of category objects.\n\
         Each category object should have a \"name\" (string) and an \"items\" (list) key.\n\
         The \"name\" should be one of: \"Cultural Advice\", \"Local Information\", \"Must Have Items\".\n\
         Each item object in the \"items\" list should have a single key:\n\
         - \"tip\" (string, required): The text of the travel tip.\n\
         \n\
         Example JSON structure:\n\
         {example}\n\
         \n\
         Generate the travel tips now based on the trip details. Ensure the output is ONLY the JSON object. \
         Do not use bracketed placeholders like [Number].",
        destination = trip.destination,
        leaving = trip.date_leaving.format("%Y-%m-%d"),
        returning = trip.date_returning.format("%Y-%m-%d"),
        leaving_display = trip.date_leaving.format("%b %d, %Y"),
        returning_display = trip.date_returning.format("%b %d, %Y"),
        activities = activities,
        example = TIPS_EXAMPLE,
    )
}

/// 调用补全服务生成贴士
pub async fn generate_tips_plan(client: &OpenRouterClient, trip: &trip::Model) -> Result<TipsPlan, GenerateError> {
    info!("为行程 {}（{}）生成旅行贴士", trip.id, trip.destination);

    let messages = [
        ChatMessage::system(TIPS_SYSTEM_PROMPT),
        ChatMessage::user(build_tips_prompt(trip)),
    ];
    let reply = client.chat_completion(&messages, 0.7, Some(2000)).await?;
    let value = json_recovery::recover_object(&reply, &TIPS_SHAPE)?;
    let plan = map_tips_plan(&value);
    info!("行程 {} 的贴士映射完成，共 {} 条", trip.id, plan.tip_count());
    Ok(plan)
}

/// 将修复后的 JSON 映射为贴士集合，空贴士跳过，未识别类别落入 General
pub fn map_tips_plan(value: &Value) -> TipsPlan {
    let mut categories = Vec::new();

    for category_value in value.get("categories").and_then(Value::as_array).into_iter().flatten() {
        let label = category_value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("General Tips");
        let category = resolve_tip_category(label);

        let mut tips = Vec::new();
        for item_value in category_value.get("items").and_then(Value::as_array).into_iter().flatten() {
            let content = item_value
                .get("tip")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default();
            if content.is_empty() {
                warn!("跳过空贴士（类别: {}）", label);
                continue;
            }
            tips.push(content.to_string());
        }

        categories.push(TipsPlanCategory { category, tips });
    }

    TipsPlan { categories }
}

/// 惰性获取行程的贴士集合，不存在则创建
pub async fn get_or_create_travel_tips(connection: &DatabaseConnection, trip_id: i32) -> Result<travel_tips::Model> {
    if let Some(tips) = travel_tips::Entity::find()
        .filter(travel_tips::Column::TripId.eq(trip_id))
        .one(connection)
        .await?
    {
        return Ok(tips);
    }

    let model = travel_tips::ActiveModel {
        trip_id: Set(trip_id),
        generated: Set(false),
        last_updated: Set(Utc::now()),
        ..Default::default()
    };
    Ok(model.insert(connection).await?)
}

/// 持久化贴士
///
/// 与行李清单不同：这里无条件清空旧贴士再插入新贴士（贴士没有手动编辑
/// 入口，不存在需要保留的用户内容），删除 + 插入同样在一个写事务内完成。
pub async fn save_tips_plan(connection: &DatabaseConnection, travel_tips_id: i32, plan: &TipsPlan) -> Result<usize> {
    let txn = begin_write_transaction(connection).await?;

    tip_item::Entity::delete_many()
        .filter(tip_item::Column::TravelTipsId.eq(travel_tips_id))
        .exec(&txn)
        .await?;

    let models: Vec<tip_item::ActiveModel> = plan
        .categories
        .iter()
        .flat_map(|category| {
            category.tips.iter().map(|content| tip_item::ActiveModel {
                travel_tips_id: Set(travel_tips_id),
                category: Set(category.category.code().to_string()),
                content: Set(content.clone()),
                ..Default::default()
            })
        })
        .collect();
    let inserted = models.len();
    if !models.is_empty() {
        tip_item::Entity::insert_many(models).exec(&txn).await?;
    }

    let tips = travel_tips::Entity::find_by_id(travel_tips_id)
        .one(&txn)
        .await?
        .context("贴士集合不存在")?;
    let mut active: travel_tips::ActiveModel = tips.into();
    active.generated = Set(true);
    active.last_updated = Set(Utc::now());
    active.update(&txn).await?;

    txn.commit().await?;
    info!("贴士集合 {} 已写入 {} 条", travel_tips_id, inserted);
    Ok(inserted)
}

/// 读取贴士，按类别分组展示用
pub async fn list_tips(connection: &DatabaseConnection, travel_tips_id: i32) -> Result<Vec<tip_item::Model>> {
    Ok(tip_item::Entity::find()
        .filter(tip_item::Column::TravelTipsId.eq(travel_tips_id))
        .order_by_asc(tip_item::Column::Category)
        .order_by_asc(tip_item::Column::Id)
        .all(connection)
        .await?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sea_orm::Database;

    use super::*;
    use travel_mate_migration::{Migrator, MigratorTrait};

    fn tokyo_trip() -> trip::Model {
        trip::Model {
            id: 2,
            user_id: 1,
            destination: "Tokyo".to_string(),
            date_leaving: NaiveDate::from_ymd_opt(2024, 9, 10).unwrap(),
            date_returning: NaiveDate::from_ymd_opt(2024, 9, 15).unwrap(),
            activities: "Temples\nRamen tour".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_embeds_trip_facts() {
        let prompt = build_tips_prompt(&tokyo_trip());
        assert!(prompt.contains("a trip to Tokyo from 2024-09-10 to 2024-09-15"));
        assert!(prompt.contains("Temples\nRamen tour"));
        assert!(prompt.contains("\"Cultural Advice\", \"Local Information\", \"Must Have Items\""));
    }

    #[test]
    fn test_map_tips_plan_categories() {
        let value = serde_json::json!({
            "categories": [
                {"name": "Cultural Advice", "items": [{"tip": "Bow when greeting."}]},
                {"name": "Local Information", "items": [{"tip": "Get a Suica card."}, {"tip": ""}]},
                {"name": "Random Section", "items": [{"tip": "Something else."}]}
            ]
        });
        let plan = map_tips_plan(&value);

        assert_eq!(plan.categories.len(), 3);
        assert_eq!(plan.categories[0].category, TipCategory::Cultural);
        assert_eq!(plan.categories[1].category, TipCategory::LocalInfo);
        // 空贴士被跳过
        assert_eq!(plan.categories[1].tips.len(), 1);
        // 未识别类别落入 General
        assert_eq!(plan.categories[2].category, TipCategory::General);
        assert_eq!(plan.tip_count(), 3);
    }

    /// 内存库使用单连接池，保证所有操作落在同一个内存数据库上
    async fn memory_db() -> sea_orm::DatabaseConnection {
        let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_regenerate_wipes_all_tips() {
        let db = memory_db().await;

        let trip = trip::ActiveModel {
            user_id: Set(1),
            destination: Set("Tokyo".to_string()),
            date_leaving: Set(NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()),
            date_returning: Set(NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()),
            activities: Set(String::new()),
            notes: Set(String::new()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let tips = get_or_create_travel_tips(&db, trip.id).await.unwrap();

        tip_item::ActiveModel {
            travel_tips_id: Set(tips.id),
            category: Set("GENERAL".to_string()),
            content: Set("Old tip".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let plan = TipsPlan {
            categories: vec![TipsPlanCategory {
                category: TipCategory::MustHave,
                tips: vec!["Comfortable walking shoes are essential.".to_string()],
            }],
        };
        save_tips_plan(&db, tips.id, &plan).await.unwrap();

        // 旧贴士被整表清空，只剩新写入的一条
        let items = list_tips(&db, tips.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "MUST_HAVE");
        assert_eq!(items[0].content, "Comfortable walking shoes are essential.");
    }
}
