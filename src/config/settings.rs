// ==========================================
// 球探招募管理平台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: settings_kv 表 (key-value, scope_id='global')
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use crate::db::open_sqlite_connection;
use crate::domain::types::UserRole;
use crate::repository::error::{RepositoryError, RepositoryResult};

// ===== 配置键 =====
pub const KEY_DEFAULT_ROLE: &str = "auth/default_role";
pub const KEY_SUPER_ADMIN_EMAILS: &str = "auth/super_admin_emails";
pub const KEY_REPORT_RETENTION_DAYS: &str = "report/retention_days";
pub const KEY_SIMILARITY_DEFAULT_LIMIT: &str = "similarity/default_limit";

// ===== 默认值 =====
/// 首次登录用户的默认角色
pub const DEFAULT_ROLE: UserRole = UserRole::Coach;

/// 报告保留天数（创建时间 + 保留期 = expires_at）
pub const DEFAULT_REPORT_RETENTION_DAYS: i64 = 30;

/// 相似推荐默认条数
pub const DEFAULT_SIMILARITY_LIMIT: usize = 5;

// ==========================================
// SettingsManager - 配置管理器
// ==========================================
pub struct SettingsManager {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsManager {
    /// 创建新的 SettingsManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建配置管理器
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 settings_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT value FROM settings_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入配置值（upsert）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO settings_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT (scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    // ==========================================
    // 类型化读取（带默认值）
    // ==========================================

    /// 首次登录用户的默认角色
    pub fn default_role(&self) -> RepositoryResult<UserRole> {
        Ok(self
            .get_value(KEY_DEFAULT_ROLE)?
            .and_then(|v| UserRole::from_str(&v))
            .unwrap_or(DEFAULT_ROLE))
    }

    /// 超级管理员邮箱名单（逗号分隔）
    pub fn super_admin_emails(&self) -> RepositoryResult<Vec<String>> {
        Ok(self
            .get_value(KEY_SUPER_ADMIN_EMAILS)?
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// 报告保留天数
    pub fn report_retention_days(&self) -> RepositoryResult<i64> {
        Ok(self
            .get_value(KEY_REPORT_RETENTION_DAYS)?
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_REPORT_RETENTION_DAYS))
    }

    /// 相似推荐默认条数
    pub fn similarity_default_limit(&self) -> RepositoryResult<usize> {
        Ok(self
            .get_value(KEY_SIMILARITY_DEFAULT_LIMIT)?
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_SIMILARITY_LIMIT))
    }
}
