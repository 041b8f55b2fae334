use anyhow::Result;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use tracing::debug;
use travel_mate_migration::{Migrator, MigratorTrait};

use crate::config::CONFIG_DIR;

fn database_path() -> std::path::PathBuf {
    // 确保配置目录存在
    if !CONFIG_DIR.exists() {
        std::fs::create_dir_all(&*CONFIG_DIR).expect("创建配置目录失败");
    }
    CONFIG_DIR.join("data.sqlite")
}

/// 创建 SQLite 连接选项
///
/// 级联删除依赖外键约束，必须显式开启 foreign_keys。
fn create_sqlite_options() -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(database_path())
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(90))
        .pragma("cache_size", "-65536")
        .pragma("temp_store", "MEMORY")
}

async fn database_connection() -> Result<DatabaseConnection> {
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(90))
        .idle_timeout(std::time::Duration::from_secs(600))
        .connect_with(create_sqlite_options())
        .await?;

    let connection = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
    debug!("SQLite 连接池已创建（WAL 模式，外键约束开启）");
    Ok(connection)
}

async fn migrate_database() -> Result<()> {
    let db_path = CONFIG_DIR.join("data.sqlite");
    if !db_path.exists() {
        debug!("数据库文件不存在，将创建新的数据库");
    } else {
        debug!("检测到现有数据库文件，将在必要时应用迁移");
    }

    // 为迁移创建单连接池，避免多连接导致的迁移顺序问题
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(create_sqlite_options())
        .await?;
    let connection = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());

    Migrator::up(&connection, None).await?;

    // 显式关闭连接池，确保释放所有数据库锁
    pool.close().await;
    debug!("迁移完成，已关闭迁移连接池");
    Ok(())
}

/// 进行数据库迁移并获取数据库连接，供外部使用
pub async fn setup_database() -> DatabaseConnection {
    migrate_database().await.expect("数据库迁移失败");
    database_connection().await.expect("获取数据库连接失败")
}

/// 开始一个事务并立即获取写锁
///
/// 通过更新锁定表强制获取写锁，避免 SQLITE_BUSY_SNAPSHOT 问题。
/// 重新生成（删除 + 批量插入）必须在这样的事务里完成。
pub async fn begin_write_transaction(connection: &DatabaseConnection) -> Result<sea_orm::DatabaseTransaction> {
    use sea_orm::{ConnectionTrait, TransactionTrait};

    let _ = connection
        .execute_unprepared("CREATE TABLE IF NOT EXISTS _write_lock (id INTEGER PRIMARY KEY, ts INTEGER)")
        .await;
    let _ = connection
        .execute_unprepared("INSERT OR IGNORE INTO _write_lock (id, ts) VALUES (1, 0)")
        .await;

    let txn = connection.begin().await?;

    // 立即更新锁定表，强制获取写锁；其他事务持有锁时这里会等待 busy_timeout
    txn.execute_unprepared("UPDATE _write_lock SET ts = strftime('%s', 'now') WHERE id = 1")
        .await?;

    Ok(txn)
}
