use anyhow::{anyhow, Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Set, Statement};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::utils::time_format::now_standard_string;
use travel_mate_entity::entities::{config_item, prelude::ConfigItem};

/// 配置管理器，负责配置的数据库存储与读取
///
/// config_items 表按顶层键（bind_address / openrouter / weather）存储 JSON 值，
/// 缺失的键落到 [`Config::default`]，密钥类配置最终还会被环境变量覆盖。
#[derive(Clone)]
pub struct ConfigManager {
    db: DatabaseConnection,
}

impl ConfigManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 确保配置表存在，不存在则创建
    pub async fn ensure_tables_exist(&self) -> Result<()> {
        let create_config_items = "
            CREATE TABLE IF NOT EXISTS config_items (
                key_name TEXT PRIMARY KEY NOT NULL,
                value_json TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL
            )";

        let create_config_changes = "
            CREATE TABLE IF NOT EXISTS config_changes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key_name TEXT NOT NULL,
                old_value TEXT,
                new_value TEXT NOT NULL,
                changed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP NOT NULL
            )";

        self.db
            .execute_unprepared(create_config_items)
            .await
            .context("创建config_items表失败")?;
        self.db
            .execute_unprepared(create_config_changes)
            .await
            .context("创建config_changes表失败")?;

        debug!("配置表检查完成");
        Ok(())
    }

    /// 从数据库加载配置，缺失项使用默认值，密钥允许环境变量覆盖
    pub async fn load_config(&self) -> Result<Config> {
        let items: Vec<config_item::Model> = ConfigItem::find().all(&self.db).await?;

        let mut root = serde_json::to_value(Config::default())?;
        for item in items {
            match serde_json::from_str::<Value>(&item.value_json) {
                Ok(value) => {
                    root[item.key_name.as_str()] = value;
                }
                Err(e) => {
                    warn!("配置项 {} 的 JSON 无法解析，忽略: {}", item.key_name, e);
                }
            }
        }

        let mut config: Config =
            serde_json::from_value(root).context("配置反序列化失败，请检查 config_items 表内容")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// 更新单个顶层配置项，并记录变更历史
    pub async fn update_item(&self, key_name: &str, value: Value) -> Result<Config> {
        // 先在当前配置上套用新值做一次完整反序列化，保证不会写入非法配置
        let current = self.load_config().await?;
        let mut root = serde_json::to_value(&current)?;
        if root.get(key_name).is_none() {
            return Err(anyhow!("未知的配置项: {}", key_name));
        }
        let old_value = root[key_name].clone();
        root[key_name] = value.clone();
        let updated: Config = serde_json::from_value(root).context("新配置值不合法")?;

        // 记录变更历史
        let record_change = Statement::from_sql_and_values(
            self.db.get_database_backend(),
            "INSERT INTO config_changes (key_name, old_value, new_value) VALUES (?, ?, ?)",
            [
                key_name.into(),
                old_value.to_string().into(),
                value.to_string().into(),
            ],
        );
        if let Err(e) = self.db.execute(record_change).await {
            warn!("记录配置变更历史失败: {}", e);
        }

        // 写入配置项（存在则覆盖）
        let model = config_item::ActiveModel {
            key_name: Set(key_name.to_string()),
            value_json: Set(value.to_string()),
            updated_at: Set(now_standard_string()),
        };
        ConfigItem::insert(model)
            .on_conflict(
                OnConflict::column(config_item::Column::KeyName)
                    .update_columns([config_item::Column::ValueJson, config_item::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        info!("配置项 {} 已更新", key_name);
        Ok(updated)
    }
}
