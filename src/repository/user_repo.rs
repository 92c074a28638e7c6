// ==========================================
// 球探招募管理平台 - 用户仓储
// ==========================================
// 职责: 管理 users 表的 CRUD 操作
// 红线: 不含业务逻辑，只负责数据访问
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::open_sqlite_connection;
use crate::domain::types::UserRole;
use crate::domain::user::User;
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// UserRepository - 用户仓储
// ==========================================
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    /// 创建新的 UserRepository 实例
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

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    const COLUMNS: &'static str = r#"
        user_id, external_id, email, first_name, last_name, avatar_url,
        role, organization_id, organization_name, preferences_json,
        timezone, language, is_active, last_login_at, created_at, updated_at
    "#;

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let role_str: String = row.get(6)?;
        Ok(User {
            user_id: row.get(0)?,
            external_id: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            avatar_url: row.get(5)?,
            // 角色列的非法值按最低权限处理（正常写入路径不会出现）
            role: UserRole::from_str(&role_str).unwrap_or(UserRole::Scout),
            organization_id: row.get(7)?,
            organization_name: row.get(8)?,
            preferences_json: row.get(9)?,
            timezone: row.get(10)?,
            language: row.get(11)?,
            is_active: row.get(12)?,
            last_login_at: row.get::<_, Option<DateTime<Utc>>>(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }

    /// 插入新用户
    ///
    /// # 说明
    /// - external_id / email 的唯一约束由数据库保证，
    ///   冲突时返回 UniqueConstraintViolation
    pub fn insert(&self, user: &User) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO users (
                user_id, external_id, email, first_name, last_name, avatar_url,
                role, organization_id, organization_name, preferences_json,
                timezone, language, is_active, last_login_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                user.user_id,
                user.external_id,
                user.email,
                user.first_name,
                user.last_name,
                user.avatar_url,
                user.role.as_str(),
                user.organization_id,
                user.organization_name,
                user.preferences_json,
                user.timezone,
                user.language,
                user.is_active,
                user.last_login_at,
                user.created_at,
                user.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按用户ID查询
    pub fn find_by_id(&self, user_id: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE user_id = ?1", Self::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![user_id], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按外部身份ID查询（登录路径）
    pub fn find_by_external_id(&self, external_id: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE external_id = ?1", Self::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![external_id], Self::row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 更新资料字段（身份与角色字段不在此列）
    pub fn update_profile(&self, user: &User) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE users SET
                first_name = ?2, last_name = ?3, avatar_url = ?4,
                preferences_json = ?5, timezone = ?6, language = ?7,
                updated_at = ?8
            WHERE user_id = ?1
            "#,
            params![
                user.user_id,
                user.first_name,
                user.last_name,
                user.avatar_url,
                user.preferences_json,
                user.timezone,
                user.language,
                Utc::now(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "User".to_string(),
                id: user.user_id.clone(),
            });
        }
        Ok(())
    }

    /// 更新最近登录时间
    pub fn touch_last_login(&self, user_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE users SET last_login_at = ?2 WHERE user_id = ?1",
            params![user_id, Utc::now()],
        )?;
        Ok(())
    }
}
