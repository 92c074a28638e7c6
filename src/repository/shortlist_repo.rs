// ==========================================
// 球探招募管理平台 - 候选名单仓储
// ==========================================
// 职责: 管理 shortlists / shortlist_items 两张表的数据访问
// 红线: 不含业务逻辑
// 约束: (shortlist_id, player_id) / (shortlist_id, coach_id) 的
//       唯一约束由数据库作为并发重复添加的最终防线；
//       pair_exists 只是提前给出更友好错误的快速检查
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};

use crate::db::open_sqlite_connection;
use crate::domain::shortlist::{ContactRecord, Shortlist, ShortlistItem};
use crate::domain::types::{
    EntityRef, ItemStatus, ShortlistPriority, ShortlistStatus, ShortlistType,
};
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// ShortlistFilter - 名单查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ShortlistFilter {
    pub list_type: Option<ShortlistType>,
    pub status: Option<ShortlistStatus>,
    pub created_by: Option<String>,
}

/// 枚举列解析失败时转成 rusqlite 的列转换错误，
/// 让损坏数据在读取时显式失败而不是被静默替换
fn column_error(msg: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::<dyn std::error::Error + Send + Sync>::from(msg.to_string()),
    )
}

// ==========================================
// ShortlistRepository - 候选名单仓储
// ==========================================
pub struct ShortlistRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShortlistRepository {
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

    // ==========================================
    // Shortlist 行映射
    // ==========================================

    const SHORTLIST_COLUMNS: &'static str = r#"
        shortlist_id, name, description, list_type, created_by, organization_id,
        status, priority, category, season, deadline, budget_eur,
        target_count, completed_count, notes, is_active, created_at, updated_at
    "#;

    fn row_to_shortlist(row: &Row<'_>) -> rusqlite::Result<Shortlist> {
        let list_type: String = row.get(3)?;
        let status: String = row.get(6)?;
        let priority: String = row.get(7)?;
        Ok(Shortlist {
            shortlist_id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            list_type: ShortlistType::from_str(&list_type)
                .ok_or_else(|| column_error("非法的 list_type 列值"))?,
            created_by: row.get(4)?,
            organization_id: row.get(5)?,
            status: ShortlistStatus::from_str(&status)
                .ok_or_else(|| column_error("非法的 status 列值"))?,
            priority: ShortlistPriority::from_str(&priority)
                .ok_or_else(|| column_error("非法的 priority 列值"))?,
            category: row.get(8)?,
            season: row.get(9)?,
            deadline: row.get(10)?,
            budget_eur: row.get(11)?,
            target_count: row.get(12)?,
            completed_count: row.get(13)?,
            notes: row.get(14)?,
            is_active: row.get(15)?,
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }

    // ==========================================
    // Shortlist 操作
    // ==========================================

    /// 插入名单
    pub fn insert_shortlist(&self, shortlist: &Shortlist) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shortlists (
                shortlist_id, name, description, list_type, created_by, organization_id,
                status, priority, category, season, deadline, budget_eur,
                target_count, completed_count, notes, is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18
            )
            "#,
            params![
                shortlist.shortlist_id,
                shortlist.name,
                shortlist.description,
                shortlist.list_type.as_str(),
                shortlist.created_by,
                shortlist.organization_id,
                shortlist.status.as_str(),
                shortlist.priority.as_str(),
                shortlist.category,
                shortlist.season,
                shortlist.deadline,
                shortlist.budget_eur,
                shortlist.target_count,
                shortlist.completed_count,
                shortlist.notes,
                shortlist.is_active,
                shortlist.created_at,
                shortlist.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询在册名单
    pub fn find_active_by_id(&self, shortlist_id: &str) -> RepositoryResult<Option<Shortlist>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shortlists WHERE shortlist_id = ?1 AND is_active = 1",
            Self::SHORTLIST_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![shortlist_id], Self::row_to_shortlist) {
            Ok(shortlist) => Ok(Some(shortlist)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 过滤/排序/分页查询
    pub fn list(
        &self,
        filter: &ShortlistFilter,
        sort_by: &str,
        sort_desc: bool,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Shortlist>> {
        let (where_clause, mut values) = Self::build_filter(filter);
        let order = if sort_desc { "DESC" } else { "ASC" };
        let sort_column = match sort_by {
            "name" => "name",
            "priority" => "priority",
            "deadline" => "deadline",
            _ => "created_at",
        };

        values.push(Box::new(limit));
        let limit_idx = values.len();
        values.push(Box::new(offset));
        let offset_idx = values.len();

        let sql = format!(
            "SELECT {} FROM shortlists WHERE {} ORDER BY {} {} LIMIT ?{} OFFSET ?{}",
            Self::SHORTLIST_COLUMNS,
            where_clause,
            sort_column,
            order,
            limit_idx,
            offset_idx,
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt.query_map(&param_refs[..], Self::row_to_shortlist)?;

        let mut shortlists = Vec::new();
        for row in rows {
            shortlists.push(row?);
        }
        Ok(shortlists)
    }

    /// 满足过滤条件的总数
    pub fn count(&self, filter: &ShortlistFilter) -> RepositoryResult<i64> {
        let (where_clause, values) = Self::build_filter(filter);
        let sql = format!("SELECT COUNT(*) FROM shortlists WHERE {}", where_clause);

        let conn = self.get_conn()?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let count = conn.query_row(&sql, &param_refs[..], |row| row.get(0))?;
        Ok(count)
    }

    fn build_filter(filter: &ShortlistFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = vec!["is_active = 1".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(list_type) = filter.list_type {
            values.push(Box::new(list_type.as_str()));
            conditions.push(format!("list_type = ?{}", values.len()));
        }
        if let Some(status) = filter.status {
            values.push(Box::new(status.as_str()));
            conditions.push(format!("status = ?{}", values.len()));
        }
        if let Some(ref created_by) = filter.created_by {
            values.push(Box::new(created_by.clone()));
            conditions.push(format!("created_by = ?{}", values.len()));
        }

        (conditions.join(" AND "), values)
    }

    /// 更新名单（list_type 与 created_by 不可变，不在更新列中）
    pub fn update_shortlist(&self, shortlist: &Shortlist) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE shortlists SET
                name = ?2, description = ?3, status = ?4, priority = ?5,
                category = ?6, season = ?7, deadline = ?8, budget_eur = ?9,
                target_count = ?10, completed_count = ?11, notes = ?12,
                updated_at = ?13
            WHERE shortlist_id = ?1
            "#,
            params![
                shortlist.shortlist_id,
                shortlist.name,
                shortlist.description,
                shortlist.status.as_str(),
                shortlist.priority.as_str(),
                shortlist.category,
                shortlist.season,
                shortlist.deadline,
                shortlist.budget_eur,
                shortlist.target_count,
                shortlist.completed_count,
                shortlist.notes,
                Utc::now(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Shortlist".to_string(),
                id: shortlist.shortlist_id.clone(),
            });
        }
        Ok(())
    }

    /// 软删除名单（条目保留在库中，随名单一起不可见；
    /// 物理清除时由外键 ON DELETE CASCADE 级联）
    pub fn soft_delete(&self, shortlist_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE shortlists SET is_active = 0, updated_at = ?2 WHERE shortlist_id = ?1",
            params![shortlist_id, Utc::now()],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Shortlist".to_string(),
                id: shortlist_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // ShortlistItem 行映射
    // ==========================================

    const ITEM_COLUMNS: &'static str = r#"
        item_id, shortlist_id, player_id, coach_id, status, priority,
        notes, fit_analysis, scout_rating, estimated_fee_eur, wage_demands_eur,
        contract_length_years, target_completion_date, last_contacted_date,
        contact_attempts, meetings_held, offers_made, contact_history,
        added_by, last_updated_by, created_at, updated_at
    "#;

    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<ShortlistItem> {
        let player_id: Option<String> = row.get(2)?;
        let coach_id: Option<String> = row.get(3)?;
        let status: String = row.get(4)?;
        let history_json: String = row.get(17)?;

        let entity = EntityRef::from_parts(player_id, coach_id)
            .map_err(|e| column_error(e))?;
        let contact_history: Vec<ContactRecord> = serde_json::from_str(&history_json)
            .map_err(|_| column_error("contact_history 列不是合法的JSON数组"))?;

        Ok(ShortlistItem {
            item_id: row.get(0)?,
            shortlist_id: row.get(1)?,
            entity,
            status: ItemStatus::from_str(&status)
                .ok_or_else(|| column_error("非法的 status 列值"))?,
            priority: row.get(5)?,
            notes: row.get(6)?,
            fit_analysis: row.get(7)?,
            scout_rating: row.get(8)?,
            estimated_fee_eur: row.get(9)?,
            wage_demands_eur: row.get(10)?,
            contract_length_years: row.get(11)?,
            target_completion_date: row.get(12)?,
            last_contacted_date: row.get(13)?,
            contact_attempts: row.get(14)?,
            meetings_held: row.get(15)?,
            offers_made: row.get(16)?,
            contact_history,
            added_by: row.get(18)?,
            last_updated_by: row.get(19)?,
            created_at: row.get(20)?,
            updated_at: row.get(21)?,
        })
    }

    fn history_to_json(history: &[ContactRecord]) -> RepositoryResult<String> {
        serde_json::to_string(history)
            .map_err(|e| RepositoryError::InternalError(format!("序列化 contact_history 失败: {}", e)))
    }

    // ==========================================
    // ShortlistItem 操作
    // ==========================================

    /// 插入条目
    ///
    /// # 说明
    /// - 重复 (名单, 实体) 对撞到唯一约束时返回 UniqueConstraintViolation
    pub fn insert_item(&self, item: &ShortlistItem) -> RepositoryResult<()> {
        let (player_id, coach_id) = item.entity.as_columns();
        let history_json = Self::history_to_json(&item.contact_history)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shortlist_items (
                item_id, shortlist_id, player_id, coach_id, status, priority,
                notes, fit_analysis, scout_rating, estimated_fee_eur, wage_demands_eur,
                contract_length_years, target_completion_date, last_contacted_date,
                contact_attempts, meetings_held, offers_made, contact_history,
                added_by, last_updated_by, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22
            )
            "#,
            params![
                item.item_id,
                item.shortlist_id,
                player_id,
                coach_id,
                item.status.as_str(),
                item.priority,
                item.notes,
                item.fit_analysis,
                item.scout_rating,
                item.estimated_fee_eur,
                item.wage_demands_eur,
                item.contract_length_years,
                item.target_completion_date,
                item.last_contacted_date,
                item.contact_attempts,
                item.meetings_held,
                item.offers_made,
                history_json,
                item.added_by,
                item.last_updated_by,
                item.created_at,
                item.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询条目
    pub fn find_item_by_id(&self, item_id: &str) -> RepositoryResult<Option<ShortlistItem>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shortlist_items WHERE item_id = ?1",
            Self::ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![item_id], Self::row_to_item) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 名单下全部条目（按加入顺序）
    pub fn list_items(&self, shortlist_id: &str) -> RepositoryResult<Vec<ShortlistItem>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shortlist_items WHERE shortlist_id = ?1 ORDER BY rowid ASC",
            Self::ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![shortlist_id], Self::row_to_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// (名单, 实体) 对是否已存在（应用层快速检查）
    pub fn pair_exists(&self, shortlist_id: &str, entity: &EntityRef) -> RepositoryResult<bool> {
        let (player_id, coach_id) = entity.as_columns();
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM shortlist_items
             WHERE shortlist_id = ?1 AND (player_id IS ?2 AND coach_id IS ?3)",
            params![shortlist_id, player_id, coach_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 更新条目（实体引用与所属名单不可变，不在更新列中）
    pub fn update_item(&self, item: &ShortlistItem) -> RepositoryResult<()> {
        let history_json = Self::history_to_json(&item.contact_history)?;

        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE shortlist_items SET
                status = ?2, priority = ?3, notes = ?4, fit_analysis = ?5,
                scout_rating = ?6, estimated_fee_eur = ?7, wage_demands_eur = ?8,
                contract_length_years = ?9, target_completion_date = ?10,
                last_contacted_date = ?11, contact_attempts = ?12,
                meetings_held = ?13, offers_made = ?14, contact_history = ?15,
                last_updated_by = ?16, updated_at = ?17
            WHERE item_id = ?1
            "#,
            params![
                item.item_id,
                item.status.as_str(),
                item.priority,
                item.notes,
                item.fit_analysis,
                item.scout_rating,
                item.estimated_fee_eur,
                item.wage_demands_eur,
                item.contract_length_years,
                item.target_completion_date,
                item.last_contacted_date,
                item.contact_attempts,
                item.meetings_held,
                item.offers_made,
                history_json,
                item.last_updated_by,
                item.updated_at,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ShortlistItem".to_string(),
                id: item.item_id.clone(),
            });
        }
        Ok(())
    }

    /// 硬删除条目（只删条目行，不动引用的球员/教练）
    pub fn delete_item(&self, item_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM shortlist_items WHERE item_id = ?1",
            params![item_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ShortlistItem".to_string(),
                id: item_id.to_string(),
            });
        }
        Ok(())
    }

    /// 名单下在册条目数
    pub fn count_items(&self, shortlist_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM shortlist_items WHERE shortlist_id = ?1",
            params![shortlist_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
