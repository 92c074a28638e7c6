// ==========================================
// 球探招募管理平台 - 操作日志仓储
// ==========================================
// 职责: activity_log 表的追加与查询
// 红线: 只追加，不提供更新/删除
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, Row};
use serde_json::Value as JsonValue;

use crate::db::open_sqlite_connection;
use crate::domain::activity_log::ActivityLog;
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// ActivityLogRepository - 操作日志仓储
// ==========================================
pub struct ActivityLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityLogRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn row_to_log(row: &Row<'_>) -> rusqlite::Result<ActivityLog> {
        let details: Option<String> = row.get(6)?;
        Ok(ActivityLog {
            log_id: row.get(0)?,
            user_id: row.get(1)?,
            action: row.get(2)?,
            resource_type: row.get(3)?,
            resource_id: row.get(4)?,
            resource_name: row.get(5)?,
            details_json: details.and_then(|s| serde_json::from_str::<JsonValue>(&s).ok()),
            created_at: row.get(7)?,
        })
    }

    /// 追加一条操作日志
    pub fn insert(&self, log: &ActivityLog) -> RepositoryResult<()> {
        let details_json = log
            .details_json
            .as_ref()
            .map(|v| v.to_string());

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO activity_log (
                log_id, user_id, action, resource_type, resource_id,
                resource_name, details_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                log.log_id,
                log.user_id,
                log.action,
                log.resource_type,
                log.resource_id,
                log.resource_name,
                details_json,
                log.created_at,
            ],
        )?;
        Ok(())
    }

    /// 某资源的最近操作记录（新记录在前）
    pub fn find_by_resource(
        &self,
        resource_type: &str,
        resource_id: &str,
        limit: i64,
    ) -> RepositoryResult<Vec<ActivityLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT log_id, user_id, action, resource_type, resource_id,
                   resource_name, details_json, created_at
            FROM activity_log
            WHERE resource_type = ?1 AND resource_id = ?2
            ORDER BY created_at DESC
            LIMIT ?3
            "#,
        )?;
        let rows = stmt.query_map(params![resource_type, resource_id, limit], Self::row_to_log)?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }
}
