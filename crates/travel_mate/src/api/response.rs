use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Config;
use crate::utils::time_format::to_standard_string;
use crate::weather::ForecastEntry;
use travel_mate_entity::category::{PackingCategory, TipCategory};
use travel_mate_entity::entities::{chat_message, packing_item, tip_item, trip};

/// 行程信息
#[derive(Serialize, ToSchema)]
pub struct TripInfo {
    pub id: i32,
    pub user_id: i32,
    pub destination: String,
    pub date_leaving: NaiveDate,
    pub date_returning: NaiveDate,
    pub activities: String,
    pub notes: String,
    pub duration_days: i64,
    pub created_at: String,
}

impl From<trip::Model> for TripInfo {
    fn from(model: trip::Model) -> Self {
        Self {
            duration_days: model.duration_days(),
            created_at: to_standard_string(model.created_at),
            id: model.id,
            user_id: model.user_id,
            destination: model.destination,
            date_leaving: model.date_leaving,
            date_returning: model.date_returning,
            activities: model.activities,
            notes: model.notes,
        }
    }
}

/// 过滤后的单条预报
#[derive(Serialize, ToSchema)]
pub struct ForecastEntryInfo {
    /// UTC 秒级时间戳
    pub dt: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub condition: String,
    pub pop: Option<f64>,
}

impl From<&ForecastEntry> for ForecastEntryInfo {
    fn from(entry: &ForecastEntry) -> Self {
        Self {
            dt: entry.dt,
            temp: entry.main.temp,
            feels_like: entry.main.feels_like,
            condition: entry.condition().to_string(),
            pop: entry.pop,
        }
    }
}

/// 天气查询响应
#[derive(Serialize, ToSchema)]
pub struct WeatherForecastResponse {
    /// 预报服务解析出的城市名
    pub city: String,
    pub list: Vec<ForecastEntryInfo>,
    pub trip_duration: i64,
    /// 空列表时的补充说明（如超出预报范围）
    pub message: Option<String>,
}

/// 行李条目信息
#[derive(Serialize, ToSchema)]
pub struct PackingItemInfo {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub category_display: String,
    pub quantity: i32,
    pub is_essential: bool,
    pub notes: String,
    pub for_day: Option<NaiveDate>,
    pub custom_added: bool,
    pub completed: bool,
}

impl From<packing_item::Model> for PackingItemInfo {
    fn from(model: packing_item::Model) -> Self {
        let category_display = PackingCategory::from_str(&model.category)
            .map(|category| category.display_name().to_string())
            .unwrap_or_else(|_| model.category.clone());
        Self {
            category_display,
            id: model.id,
            name: model.name,
            category: model.category,
            quantity: model.quantity,
            is_essential: model.is_essential,
            notes: model.notes,
            for_day: model.for_day,
            custom_added: model.custom_added,
            completed: model.completed,
        }
    }
}

/// 按类别分组的行李条目
#[derive(Serialize, ToSchema)]
pub struct PackingCategoryGroup {
    pub category: String,
    pub category_display: String,
    pub items: Vec<PackingItemInfo>,
}

/// 行李清单响应
#[derive(Serialize, ToSchema)]
pub struct PackingListResponse {
    pub trip_id: i32,
    pub generated: bool,
    pub last_updated: String,
    pub categories: Vec<PackingCategoryGroup>,
}

/// 生成操作的结果
#[derive(Serialize, ToSchema)]
pub struct GenerateResponse {
    /// 本次写入的条目数
    pub items_created: usize,
}

/// 单条贴士
#[derive(Serialize, ToSchema)]
pub struct TipItemInfo {
    pub id: i32,
    pub content: String,
}

/// 按类别分组的贴士
#[derive(Serialize, ToSchema)]
pub struct TipCategoryGroup {
    pub category: String,
    pub category_display: String,
    pub tips: Vec<TipItemInfo>,
}

impl TipCategoryGroup {
    pub fn display_for(code: &str) -> String {
        TipCategory::from_str(code)
            .map(|category| category.display_name().to_string())
            .unwrap_or_else(|_| code.to_string())
    }
}

/// 旅行贴士响应
#[derive(Serialize, ToSchema)]
pub struct TravelTipsResponse {
    pub trip_id: i32,
    pub generated: bool,
    pub last_updated: String,
    pub categories: Vec<TipCategoryGroup>,
}

/// 对话消息信息
#[derive(Serialize, ToSchema)]
pub struct ChatMessageInfo {
    pub id: i32,
    pub content: String,
    pub is_user_message: bool,
    pub created_at: String,
}

impl From<chat_message::Model> for ChatMessageInfo {
    fn from(model: chat_message::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            is_user_message: model.is_user_message,
            created_at: to_standard_string(model.created_at),
        }
    }
}

/// 对话历史响应
#[derive(Serialize, ToSchema)]
pub struct ChatHistoryResponse {
    pub trip_id: i32,
    pub messages: Vec<ChatMessageInfo>,
}

/// 对话回复响应
#[derive(Serialize, ToSchema)]
pub struct ChatReplyResponse {
    pub reply: String,
}

/// 配置视图（密钥只暴露是否已配置）
#[derive(Serialize, ToSchema)]
pub struct ConfigResponse {
    pub bind_address: String,
    pub openrouter: OpenRouterConfigView,
    pub weather: WeatherConfigView,
}

#[derive(Serialize, ToSchema)]
pub struct OpenRouterConfigView {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub default_max_tokens: u32,
    pub api_key_set: bool,
}

#[derive(Serialize, ToSchema)]
pub struct WeatherConfigView {
    pub geocode_base_url: String,
    pub forecast_base_url: String,
    pub timeout_seconds: u64,
    pub forecast_horizon_days: u64,
    pub geocode_api_key_set: bool,
    pub forecast_api_key_set: bool,
}

impl From<&Config> for ConfigResponse {
    fn from(config: &Config) -> Self {
        fn key_set(key: &Option<String>) -> bool {
            key.as_ref().is_some_and(|value| !value.trim().is_empty())
        }

        Self {
            bind_address: config.bind_address.clone(),
            openrouter: OpenRouterConfigView {
                base_url: config.openrouter.base_url.clone(),
                model: config.openrouter.model.clone(),
                timeout_seconds: config.openrouter.timeout_seconds,
                default_max_tokens: config.openrouter.default_max_tokens,
                api_key_set: key_set(&config.openrouter.api_key),
            },
            weather: WeatherConfigView {
                geocode_base_url: config.weather.geocode_base_url.clone(),
                forecast_base_url: config.weather.forecast_base_url.clone(),
                timeout_seconds: config.weather.timeout_seconds,
                forecast_horizon_days: config.weather.forecast_horizon_days,
                geocode_api_key_set: key_set(&config.weather.geocode_api_key),
                forecast_api_key_set: key_set(&config.weather.forecast_api_key),
            },
        }
    }
}

/// 将查询出的条目按类别聚合（查询已按类别排序）
pub fn group_packing_items(items: Vec<packing_item::Model>) -> Vec<PackingCategoryGroup> {
    let mut groups: Vec<PackingCategoryGroup> = Vec::new();
    for item in items {
        let info = PackingItemInfo::from(item);
        match groups.last_mut() {
            Some(group) if group.category == info.category => group.items.push(info),
            _ => groups.push(PackingCategoryGroup {
                category: info.category.clone(),
                category_display: info.category_display.clone(),
                items: vec![info],
            }),
        }
    }
    groups
}

/// 将查询出的贴士按类别聚合（查询已按类别排序）
pub fn group_tip_items(items: Vec<tip_item::Model>) -> Vec<TipCategoryGroup> {
    let mut groups: Vec<TipCategoryGroup> = Vec::new();
    for item in items {
        match groups.last_mut() {
            Some(group) if group.category == item.category => group.tips.push(TipItemInfo {
                id: item.id,
                content: item.content,
            }),
            _ => {
                let category_display = TipCategoryGroup::display_for(&item.category);
                groups.push(TipCategoryGroup {
                    category: item.category.clone(),
                    category_display,
                    tips: vec![TipItemInfo {
                        id: item.id,
                        content: item.content,
                    }],
                });
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(category: &str, name: &str) -> packing_item::Model {
        packing_item::Model {
            id: 0,
            packing_list_id: 1,
            name: name.to_string(),
            category: category.to_string(),
            quantity: 1,
            is_essential: false,
            notes: String::new(),
            for_day: None,
            custom_added: false,
            completed: false,
        }
    }

    #[test]
    fn test_group_packing_items() {
        let items = vec![
            item("CLOTHING", "T-shirt"),
            item("CLOTHING", "Jeans"),
            item("MISC", "Umbrella"),
        ];
        let groups = group_packing_items(items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category_display, "Clothing");
        assert_eq!(groups[0].items.len(), 2);
        assert_eq!(groups[1].category_display, "Miscellaneous");
    }

    #[test]
    fn test_group_unknown_category_keeps_code() {
        let groups = group_packing_items(vec![item("LEGACY", "Thing")]);
        assert_eq!(groups[0].category_display, "LEGACY");
    }
}
