// ==========================================
// 球探招募管理平台 - 教练仓储
// ==========================================
// 职责: 管理 coaches 表的 CRUD 与过滤/排序/分页查询
// 软删除语义与球员仓储一致
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};

use crate::db::open_sqlite_connection;
use crate::domain::coach::Coach;
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// CoachFilter - 教练查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CoachFilter {
    pub current_role: Option<String>,  // 执教角色（模糊匹配）
    pub club: Option<String>,          // 俱乐部（模糊匹配）
    pub nationality: Option<String>,   // 国籍（模糊匹配）
    pub formation: Option<String>,     // 惯用阵型（模糊匹配）
    pub search: Option<String>,        // 名称/全名/俱乐部全文检索
}

// ==========================================
// CoachRepository - 教练仓储
// ==========================================
pub struct CoachRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CoachRepository {
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
        coach_id, name, full_name, date_of_birth, nationality, current_club,
        current_role, coaching_level, years_experience, contract_expires,
        estimated_salary_eur, preferred_formation, leadership_style,
        scouting_notes, overall_rating, availability_status,
        created_by, is_active, created_at, updated_at
    "#;

    fn row_to_coach(row: &Row<'_>) -> rusqlite::Result<Coach> {
        Ok(Coach {
            coach_id: row.get(0)?,
            name: row.get(1)?,
            full_name: row.get(2)?,
            date_of_birth: row.get(3)?,
            nationality: row.get(4)?,
            current_club: row.get(5)?,
            current_role: row.get(6)?,
            coaching_level: row.get(7)?,
            years_experience: row.get(8)?,
            contract_expires: row.get(9)?,
            estimated_salary_eur: row.get(10)?,
            preferred_formation: row.get(11)?,
            leadership_style: row.get(12)?,
            scouting_notes: row.get(13)?,
            overall_rating: row.get(14)?,
            availability_status: row.get(15)?,
            created_by: row.get(16)?,
            is_active: row.get(17)?,
            created_at: row.get(18)?,
            updated_at: row.get(19)?,
        })
    }

    /// 排序字段白名单，未知字段回退到 name
    fn sort_column(sort_by: &str) -> &'static str {
        match sort_by {
            "years_experience" => "years_experience",
            "overall_rating" => "overall_rating",
            "created_at" => "created_at",
            _ => "name",
        }
    }

    fn build_filter(filter: &CoachFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = vec!["is_active = 1".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref role) = filter.current_role {
            values.push(Box::new(format!("%{}%", role)));
            conditions.push(format!("current_role LIKE ?{}", values.len()));
        }
        if let Some(ref club) = filter.club {
            values.push(Box::new(format!("%{}%", club)));
            conditions.push(format!("current_club LIKE ?{}", values.len()));
        }
        if let Some(ref nationality) = filter.nationality {
            values.push(Box::new(format!("%{}%", nationality)));
            conditions.push(format!("nationality LIKE ?{}", values.len()));
        }
        if let Some(ref formation) = filter.formation {
            values.push(Box::new(format!("%{}%", formation)));
            conditions.push(format!("preferred_formation LIKE ?{}", values.len()));
        }
        if let Some(ref search) = filter.search {
            values.push(Box::new(format!("%{}%", search)));
            let idx = values.len();
            conditions.push(format!(
                "(name LIKE ?{idx} OR full_name LIKE ?{idx} OR current_club LIKE ?{idx})"
            ));
        }

        (conditions.join(" AND "), values)
    }

    /// 过滤/排序/分页查询
    pub fn list(
        &self,
        filter: &CoachFilter,
        sort_by: &str,
        sort_desc: bool,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Coach>> {
        let (where_clause, mut values) = Self::build_filter(filter);
        let order = if sort_desc { "DESC" } else { "ASC" };

        values.push(Box::new(limit));
        let limit_idx = values.len();
        values.push(Box::new(offset));
        let offset_idx = values.len();

        let sql = format!(
            "SELECT {} FROM coaches WHERE {} ORDER BY {} {} LIMIT ?{} OFFSET ?{}",
            Self::COLUMNS,
            where_clause,
            Self::sort_column(sort_by),
            order,
            limit_idx,
            offset_idx,
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt.query_map(&param_refs[..], Self::row_to_coach)?;

        let mut coaches = Vec::new();
        for row in rows {
            coaches.push(row?);
        }
        Ok(coaches)
    }

    /// 满足过滤条件的总数（分页元数据）
    pub fn count(&self, filter: &CoachFilter) -> RepositoryResult<i64> {
        let (where_clause, values) = Self::build_filter(filter);
        let sql = format!("SELECT COUNT(*) FROM coaches WHERE {}", where_clause);

        let conn = self.get_conn()?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let count = conn.query_row(&sql, &param_refs[..], |row| row.get(0))?;
        Ok(count)
    }

    /// 按ID查询在档教练
    pub fn find_active_by_id(&self, coach_id: &str) -> RepositoryResult<Option<Coach>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM coaches WHERE coach_id = ?1 AND is_active = 1",
            Self::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![coach_id], Self::row_to_coach) {
            Ok(coach) => Ok(Some(coach)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按ID查询（含已软删除，供删除路径使用）
    pub fn find_by_id(&self, coach_id: &str) -> RepositoryResult<Option<Coach>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM coaches WHERE coach_id = ?1", Self::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![coach_id], Self::row_to_coach) {
            Ok(coach) => Ok(Some(coach)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 同名同俱乐部的在档教练是否已存在（快速检查；
    /// 最终防线是 idx_coaches_name_club_active 唯一索引）
    pub fn exists_active_by_name_club(
        &self,
        name: &str,
        club: Option<&str>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM coaches
             WHERE name = ?1 AND current_club IS ?2 AND is_active = 1",
            params![name, club],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 插入教练
    pub fn insert(&self, coach: &Coach) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO coaches (
                coach_id, name, full_name, date_of_birth, nationality, current_club,
                current_role, coaching_level, years_experience, contract_expires,
                estimated_salary_eur, preferred_formation, leadership_style,
                scouting_notes, overall_rating, availability_status,
                created_by, is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
            )
            "#,
            params![
                coach.coach_id,
                coach.name,
                coach.full_name,
                coach.date_of_birth,
                coach.nationality,
                coach.current_club,
                coach.current_role,
                coach.coaching_level,
                coach.years_experience,
                coach.contract_expires,
                coach.estimated_salary_eur,
                coach.preferred_formation,
                coach.leadership_style,
                coach.scouting_notes,
                coach.overall_rating,
                coach.availability_status,
                coach.created_by,
                coach.is_active,
                coach.created_at,
                coach.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 更新教练
    pub fn update(&self, coach: &Coach) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE coaches SET
                name = ?2, full_name = ?3, date_of_birth = ?4, nationality = ?5,
                current_club = ?6, current_role = ?7, coaching_level = ?8,
                years_experience = ?9, contract_expires = ?10, estimated_salary_eur = ?11,
                preferred_formation = ?12, leadership_style = ?13, scouting_notes = ?14,
                overall_rating = ?15, availability_status = ?16, updated_at = ?17
            WHERE coach_id = ?1
            "#,
            params![
                coach.coach_id,
                coach.name,
                coach.full_name,
                coach.date_of_birth,
                coach.nationality,
                coach.current_club,
                coach.current_role,
                coach.coaching_level,
                coach.years_experience,
                coach.contract_expires,
                coach.estimated_salary_eur,
                coach.preferred_formation,
                coach.leadership_style,
                coach.scouting_notes,
                coach.overall_rating,
                coach.availability_status,
                Utc::now(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Coach".to_string(),
                id: coach.coach_id.clone(),
            });
        }
        Ok(())
    }

    /// 软删除（is_active=false）
    pub fn soft_delete(&self, coach_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE coaches SET is_active = 0, updated_at = ?2 WHERE coach_id = ?1",
            params![coach_id, Utc::now()],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Coach".to_string(),
                id: coach_id.to_string(),
            });
        }
        Ok(())
    }

    /// 全量在档教练（按目录插入顺序，供相似度候选池使用）
    pub fn list_active(&self) -> RepositoryResult<Vec<Coach>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM coaches WHERE is_active = 1 ORDER BY rowid ASC",
            Self::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_coach)?;

        let mut coaches = Vec::new();
        for row in rows {
            coaches.push(row?);
        }
        Ok(coaches)
    }
}
