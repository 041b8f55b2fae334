//! 行李清单生成
//!
//! 提示词嵌入行程事实与天气摘要，回复经 JSON 修复与类别归一化后映射为
//! 结构化清单。重新生成只替换 AI 来源的条目，用户手动添加的条目必须保留。

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::Value;
use tracing::{info, warn};

use crate::database::begin_write_transaction;
use crate::generator::category::resolve_packing_category;
use crate::generator::json_recovery::{self, ShapeSpec};
use crate::generator::GenerateError;
use crate::openrouter::{ChatMessage, OpenRouterClient};
use travel_mate_entity::category::PackingCategory;
use travel_mate_entity::entities::{packing_item, packing_list, trip};

const PACKING_SYSTEM_PROMPT: &str = "You are a travel assistant. Your task is to generate a packing list \
in JSON format based on the user's trip details, activities, and weather forecast. Output ONLY the JSON object.";

/// 提示词里的输出结构示例，锚定模型返回的字段名
const PACKING_EXAMPLE: &str = r#"{
    "categories": [
        {
            "name": "Clothing",
            "items": [
                {"name": "T-shirts", "quantity": 5, "essential": false, "notes": "Breathable fabric"},
                {"name": "Jeans", "quantity": 1, "essential": false},
                {"name": "Rain Jacket", "quantity": 1, "essential": true, "notes": "Check weather forecast daily"}
            ]
        },
        {
            "name": "Toiletries",
            "items": [
                {"name": "Toothbrush", "quantity": 1, "essential": true},
                {"name": "Travel-size Shampoo", "quantity": 1, "essential": false}
            ]
        },
        {
            "name": "Documents",
            "items": [
                {"name": "Passport", "quantity": 1, "essential": true},
                {"name": "Local Currency", "quantity": 1, "essential": true, "notes": "Some cash recommended"}
            ]
        }
    ]
}"#;

const PACKING_SHAPE: ShapeSpec<'static> = ShapeSpec {
    array_key: "categories",
    element_keys: &["name", "items"],
};

/// 归一化后的行李清单
#[derive(Debug, Clone, PartialEq)]
pub struct PackingPlan {
    pub categories: Vec<PackingPlanCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackingPlanCategory {
    pub category: PackingCategory,
    pub items: Vec<PackingPlanItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackingPlanItem {
    pub name: String,
    pub quantity: i32,
    pub essential: bool,
    pub notes: String,
    pub for_day: Option<NaiveDate>,
}

impl PackingPlan {
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|category| category.items.len()).sum()
    }
}

/// 构造行李清单提示词（确定性输出，天气摘要原样嵌入）
pub fn build_packing_prompt(trip: &trip::Model, weather_digest: &str) -> String {
    let activities = if trip.activities.trim().is_empty() {
        "General tourism and leisure"
    } else {
        trip.activities.as_str()
    };

    format!(
        "Create a detailed packing list in JSON format for a trip to {destination} from {leaving} to {returning}.\n\
         \n\
         Consider the following details:\n\
         Destination: {destination}\n\
         Dates: {leaving_display} to {returning_display}\n\
         Planned Activities: {activities}\n\
         Weather Forecast Summary: {weather_digest}\n\
         \n\
         The output MUST be a valid JSON object containing a single key \"categories\".\n\
         The \"categories\" key should hold a list of category objects.\n\
         Each category object should have a \"name\" (string) and an \"items\" (list) key.\n\
         Each item object in the \"items\" list should have:\n\
         - \"name\" (string, required): The name of the item.\n\
         - \"quantity\" (integer, optional, default 1): How many of this item.\n\
         - \"essential\" (boolean, optional, default false): Is this item essential (e.g., passport, medications)? Mark essentials as true.\n\
         - \"notes\" (string, optional): Brief notes (e.g., 'Waterproof', 'For evening wear').\n\
         - \"for_day\" (string, optional): If item is specific to a day, provide date in 'YYYY-MM-DD' format. Only use if truly day-specific.\n\
         \n\
         Example JSON structure:\n\
         {example}\n\
         \n\
         Generate the packing list now based on the trip details and weather. Ensure the output is ONLY the JSON object.",
        destination = trip.destination,
        leaving = trip.date_leaving.format("%Y-%m-%d"),
        returning = trip.date_returning.format("%Y-%m-%d"),
        leaving_display = trip.date_leaving.format("%b %d, %Y"),
        returning_display = trip.date_returning.format("%b %d, %Y"),
        activities = activities,
        weather_digest = weather_digest,
        example = PACKING_EXAMPLE,
    )
}

/// 调用补全服务生成行李清单
pub async fn generate_packing_plan(
    client: &OpenRouterClient,
    trip: &trip::Model,
    weather_digest: &str,
) -> Result<PackingPlan, GenerateError> {
    info!("为行程 {}（{}）生成行李清单", trip.id, trip.destination);

    let messages = [
        ChatMessage::system(PACKING_SYSTEM_PROMPT),
        ChatMessage::user(build_packing_prompt(trip, weather_digest)),
    ];
    let reply = client.chat_completion(&messages, 0.6, Some(1500)).await?;
    let value = json_recovery::recover_object(&reply, &PACKING_SHAPE)?;
    let plan = map_packing_plan(&value, trip);
    info!("行程 {} 的清单映射完成，共 {} 个条目", trip.id, plan.item_count());
    Ok(plan)
}

/// 将修复后的 JSON 映射为结构化清单
///
/// 逐条目降级：缺名称的条目跳过，数量下限钳制为 1，非法或越界的日期丢弃，
/// 未识别类别落入 Miscellaneous。单个坏条目不影响其余条目。
pub fn map_packing_plan(value: &Value, trip: &trip::Model) -> PackingPlan {
    let mut categories = Vec::new();

    for category_value in value.get("categories").and_then(Value::as_array).into_iter().flatten() {
        let label = category_value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Miscellaneous");
        let category = resolve_packing_category(label);

        let mut items = Vec::new();
        for item_value in category_value.get("items").and_then(Value::as_array).into_iter().flatten() {
            let name = item_value
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default();
            if name.is_empty() {
                warn!("跳过缺少名称的行李条目（类别: {}）", label);
                continue;
            }

            items.push(PackingPlanItem {
                name: name.to_string(),
                quantity: item_value
                    .get("quantity")
                    .and_then(Value::as_i64)
                    .map(|quantity| quantity.max(1) as i32)
                    .unwrap_or(1),
                essential: item_value.get("essential").and_then(Value::as_bool).unwrap_or(false),
                notes: item_value
                    .get("notes")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                for_day: parse_for_day(item_value.get("for_day"), trip),
            });
        }

        categories.push(PackingPlanCategory { category, items });
    }

    PackingPlan { categories }
}

/// 解析条目的指定日期，必须落在行程日期范围内
fn parse_for_day(value: Option<&Value>, trip: &trip::Model) -> Option<NaiveDate> {
    let raw = value?.as_str()?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) if day >= trip.date_leaving && day <= trip.date_returning => Some(day),
        Ok(day) => {
            warn!("条目日期 {} 不在行程范围内，忽略", day);
            None
        }
        Err(e) => {
            warn!("无法解析条目日期 '{}': {}", raw, e);
            None
        }
    }
}

/// 惰性获取行程的行李清单，不存在则创建
pub async fn get_or_create_packing_list(
    connection: &DatabaseConnection,
    trip_id: i32,
) -> Result<packing_list::Model> {
    if let Some(list) = packing_list::Entity::find()
        .filter(packing_list::Column::TripId.eq(trip_id))
        .one(connection)
        .await?
    {
        return Ok(list);
    }

    let model = packing_list::ActiveModel {
        trip_id: Set(trip_id),
        generated: Set(false),
        last_updated: Set(Utc::now()),
        ..Default::default()
    };
    Ok(model.insert(connection).await?)
}

/// 持久化生成结果
///
/// 删除 + 批量插入在同一个写事务内完成：只删除 `custom_added = false` 的
/// AI 来源条目，用户手动添加的条目原样保留。
pub async fn save_packing_plan(
    connection: &DatabaseConnection,
    packing_list_id: i32,
    plan: &PackingPlan,
) -> Result<usize> {
    let txn = begin_write_transaction(connection).await?;

    packing_item::Entity::delete_many()
        .filter(packing_item::Column::PackingListId.eq(packing_list_id))
        .filter(packing_item::Column::CustomAdded.eq(false))
        .exec(&txn)
        .await?;

    let models: Vec<packing_item::ActiveModel> = plan
        .categories
        .iter()
        .flat_map(|category| {
            category.items.iter().map(|item| packing_item::ActiveModel {
                packing_list_id: Set(packing_list_id),
                name: Set(item.name.clone()),
                category: Set(category.category.code().to_string()),
                quantity: Set(item.quantity),
                is_essential: Set(item.essential),
                notes: Set(item.notes.clone()),
                for_day: Set(item.for_day),
                custom_added: Set(false),
                completed: Set(false),
                ..Default::default()
            })
        })
        .collect();
    let inserted = models.len();
    if !models.is_empty() {
        packing_item::Entity::insert_many(models).exec(&txn).await?;
    }

    let list = packing_list::Entity::find_by_id(packing_list_id)
        .one(&txn)
        .await?
        .context("行李清单不存在")?;
    let mut active: packing_list::ActiveModel = list.into();
    active.generated = Set(true);
    active.last_updated = Set(Utc::now());
    active.update(&txn).await?;

    txn.commit().await?;
    info!("行李清单 {} 已写入 {} 个 AI 生成条目", packing_list_id, inserted);
    Ok(inserted)
}

/// 读取清单条目，按类别 + 名称排序
pub async fn list_items(
    connection: &DatabaseConnection,
    packing_list_id: i32,
) -> Result<Vec<packing_item::Model>> {
    Ok(packing_item::Entity::find()
        .filter(packing_item::Column::PackingListId.eq(packing_list_id))
        .order_by_asc(packing_item::Column::Category)
        .order_by_asc(packing_item::Column::Name)
        .all(connection)
        .await?)
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;

    use super::*;
    use travel_mate_migration::{Migrator, MigratorTrait};

    fn paris_trip() -> trip::Model {
        trip::Model {
            id: 1,
            user_id: 1,
            destination: "Paris".to_string(),
            date_leaving: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            date_returning: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            activities: "Museum visits\nCafe hopping".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_embeds_trip_facts_and_digest() {
        let digest = "Average temperature around 22.0°C... mainly Clear... Likely dry.";
        let prompt = build_packing_prompt(&paris_trip(), digest);

        assert!(prompt.contains("a trip to Paris from 2024-06-01 to 2024-06-03"));
        // 天气摘要必须原样出现
        assert!(prompt.contains(digest));
        assert!(prompt.contains("Museum visits\nCafe hopping"));
        assert!(prompt.contains("\"categories\""));
    }

    #[test]
    fn test_prompt_default_activities() {
        let mut trip = paris_trip();
        trip.activities = "  ".to_string();
        let prompt = build_packing_prompt(&trip, "digest");
        assert!(prompt.contains("General tourism and leisure"));
    }

    #[test]
    fn test_fenced_reply_maps_to_plan() {
        // 模型回复带 markdown 围栏的典型场景
        let reply = "```json\n{\"categories\":[{\"name\":\"Clothing\",\"items\":[{\"name\":\"T-shirt\",\"quantity\":3}]}]}\n```";
        let value = json_recovery::recover_object(reply, &PACKING_SHAPE).unwrap();
        let plan = map_packing_plan(&value, &paris_trip());

        assert_eq!(plan.categories.len(), 1);
        assert_eq!(plan.categories[0].category, PackingCategory::Clothing);
        let item = &plan.categories[0].items[0];
        assert_eq!(item.name, "T-shirt");
        assert_eq!(item.quantity, 3);
        assert!(!item.essential);
    }

    #[test]
    fn test_refusal_reply_is_unparseable() {
        let result = json_recovery::recover_object("Sorry, I can't help with that.", &PACKING_SHAPE);
        assert!(result.is_err());
    }

    #[test]
    fn test_map_skips_nameless_and_clamps_quantity() {
        let value = serde_json::json!({
            "categories": [{
                "name": "Clothing",
                "items": [
                    {"name": "", "quantity": 2},
                    {"name": "Socks", "quantity": 0},
                    {"name": "Hat", "quantity": -3, "essential": true}
                ]
            }]
        });
        let plan = map_packing_plan(&value, &paris_trip());
        let items = &plan.categories[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[1].quantity, 1);
        assert!(items[1].essential);
    }

    #[test]
    fn test_map_for_day_validation() {
        let value = serde_json::json!({
            "categories": [{
                "name": "Misc",
                "items": [
                    {"name": "Ticket", "for_day": "2024-06-02"},
                    {"name": "Umbrella", "for_day": "2024-07-01"},
                    {"name": "Charger", "for_day": "not-a-date"}
                ]
            }]
        });
        let plan = map_packing_plan(&value, &paris_trip());
        let items = &plan.categories[0].items;
        assert_eq!(items[0].for_day, Some(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()));
        // 行程范围外或非法的日期丢弃，但条目本身保留
        assert_eq!(items[1].for_day, None);
        assert_eq!(items[2].for_day, None);
    }

    #[test]
    fn test_map_unknown_category_defaults_to_misc() {
        let value = serde_json::json!({
            "categories": [{"name": "Medications", "items": [{"name": "Aspirin"}]}]
        });
        let plan = map_packing_plan(&value, &paris_trip());
        assert_eq!(plan.categories[0].category, PackingCategory::Misc);
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
    async fn test_regenerate_preserves_custom_items() {
        let db = memory_db().await;

        let trip = trip::ActiveModel {
            user_id: Set(1),
            destination: Set("Paris".to_string()),
            date_leaving: Set(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            date_returning: Set(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()),
            activities: Set(String::new()),
            notes: Set(String::new()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let list = get_or_create_packing_list(&db, trip.id).await.unwrap();

        // 上一轮 AI 生成的条目 + 用户手动添加的条目
        packing_item::ActiveModel {
            packing_list_id: Set(list.id),
            name: Set("Old AI Item".to_string()),
            category: Set("MISC".to_string()),
            quantity: Set(1),
            is_essential: Set(false),
            notes: Set(String::new()),
            for_day: Set(None),
            custom_added: Set(false),
            completed: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        packing_item::ActiveModel {
            packing_list_id: Set(list.id),
            name: Set("My Lucky Hat".to_string()),
            category: Set("CLOTHING".to_string()),
            quantity: Set(1),
            is_essential: Set(false),
            notes: Set(String::new()),
            for_day: Set(None),
            custom_added: Set(true),
            completed: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let plan = PackingPlan {
            categories: vec![PackingPlanCategory {
                category: PackingCategory::Clothing,
                items: vec![PackingPlanItem {
                    name: "T-shirt".to_string(),
                    quantity: 3,
                    essential: false,
                    notes: String::new(),
                    for_day: None,
                }],
            }],
        };

        // 连续重建两次，手动条目必须一直保留，AI 条目被整批替换
        save_packing_plan(&db, list.id, &plan).await.unwrap();
        save_packing_plan(&db, list.id, &plan).await.unwrap();

        let items = list_items(&db, list.id).await.unwrap();
        assert_eq!(items.len(), 2);
        let custom: Vec<_> = items.iter().filter(|item| item.custom_added).collect();
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].name, "My Lucky Hat");
        assert!(custom[0].completed);
        let generated: Vec<_> = items.iter().filter(|item| !item.custom_added).collect();
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].name, "T-shirt");
        assert_eq!(generated[0].quantity, 3);

        let list = packing_list::Entity::find_by_id(list.id).one(&db).await.unwrap().unwrap();
        assert!(list.generated);
    }
}
