// ==========================================
// 球探招募管理平台 - 球员仓储
// ==========================================
// 职责: 管理 players 表的 CRUD 与过滤/排序/分页查询
// 红线: 不含业务逻辑，只负责数据访问
// 软删除: is_active=false 的球员从所有默认查询中消失
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::open_sqlite_connection;
use crate::domain::player::Player;
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// PlayerFilter - 球员查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub position: Option<String>,      // 场上位置（模糊匹配）
    pub club: Option<String>,          // 俱乐部（模糊匹配）
    pub nationality: Option<String>,   // 国籍（含第二国籍，模糊匹配）
    pub min_value: Option<i64>,        // 身价下限（欧元）
    pub max_value: Option<i64>,        // 身价上限（欧元）
    pub search: Option<String>,        // 名称/全名/俱乐部全文检索
}

// ==========================================
// PlayerStatsSummary - 球员目录汇总统计
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatsSummary {
    pub total_players: i64,
    pub total_nationalities: i64,
    pub total_clubs: i64,
    pub total_positions: i64,
    pub avg_market_value_eur: i64,
    pub max_market_value_eur: Option<i64>,
    pub min_market_value_eur: Option<i64>,
    pub position_breakdown: Vec<PositionCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionCount {
    pub position: String,
    pub count: i64,
}

// ==========================================
// PlayerRepository - 球员仓储
// ==========================================
pub struct PlayerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PlayerRepository {
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
        player_id, name, full_name, date_of_birth, nationality, second_nationality,
        height_cm, weight_kg, preferred_foot, current_club, position, shirt_number,
        contract_expires, market_value_eur, weekly_wage_eur, agent_name,
        scouting_notes, overall_rating, potential_rating, availability_status,
        created_by, is_active, created_at, updated_at
    "#;

    fn row_to_player(row: &Row<'_>) -> rusqlite::Result<Player> {
        Ok(Player {
            player_id: row.get(0)?,
            name: row.get(1)?,
            full_name: row.get(2)?,
            date_of_birth: row.get(3)?,
            nationality: row.get(4)?,
            second_nationality: row.get(5)?,
            height_cm: row.get(6)?,
            weight_kg: row.get(7)?,
            preferred_foot: row.get(8)?,
            current_club: row.get(9)?,
            position: row.get(10)?,
            shirt_number: row.get(11)?,
            contract_expires: row.get(12)?,
            market_value_eur: row.get(13)?,
            weekly_wage_eur: row.get(14)?,
            agent_name: row.get(15)?,
            scouting_notes: row.get(16)?,
            overall_rating: row.get(17)?,
            potential_rating: row.get(18)?,
            availability_status: row.get(19)?,
            created_by: row.get(20)?,
            is_active: row.get(21)?,
            created_at: row.get(22)?,
            updated_at: row.get(23)?,
        })
    }

    /// 排序字段白名单，未知字段回退到 name
    fn sort_column(sort_by: &str) -> &'static str {
        match sort_by {
            "market_value" | "market_value_eur" => "market_value_eur",
            "overall_rating" => "overall_rating",
            "created_at" => "created_at",
            _ => "name",
        }
    }

    /// 组装过滤条件（只查在档球员）
    fn build_filter(filter: &PlayerFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = vec!["is_active = 1".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(ref position) = filter.position {
            values.push(Box::new(format!("%{}%", position)));
            conditions.push(format!("position LIKE ?{}", values.len()));
        }
        if let Some(ref club) = filter.club {
            values.push(Box::new(format!("%{}%", club)));
            conditions.push(format!("current_club LIKE ?{}", values.len()));
        }
        if let Some(ref nationality) = filter.nationality {
            values.push(Box::new(format!("%{}%", nationality)));
            let idx = values.len();
            conditions.push(format!(
                "(nationality LIKE ?{idx} OR second_nationality LIKE ?{idx})"
            ));
        }
        if let Some(min_value) = filter.min_value {
            values.push(Box::new(min_value));
            conditions.push(format!("market_value_eur >= ?{}", values.len()));
        }
        if let Some(max_value) = filter.max_value {
            values.push(Box::new(max_value));
            conditions.push(format!("market_value_eur <= ?{}", values.len()));
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
        filter: &PlayerFilter,
        sort_by: &str,
        sort_desc: bool,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Player>> {
        let (where_clause, mut values) = Self::build_filter(filter);
        let order = if sort_desc { "DESC" } else { "ASC" };

        values.push(Box::new(limit));
        let limit_idx = values.len();
        values.push(Box::new(offset));
        let offset_idx = values.len();

        let sql = format!(
            "SELECT {} FROM players WHERE {} ORDER BY {} {} LIMIT ?{} OFFSET ?{}",
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
        let rows = stmt.query_map(&param_refs[..], Self::row_to_player)?;

        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    }

    /// 满足过滤条件的总数（分页元数据）
    pub fn count(&self, filter: &PlayerFilter) -> RepositoryResult<i64> {
        let (where_clause, values) = Self::build_filter(filter);
        let sql = format!("SELECT COUNT(*) FROM players WHERE {}", where_clause);

        let conn = self.get_conn()?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let count = conn.query_row(&sql, &param_refs[..], |row| row.get(0))?;
        Ok(count)
    }

    /// 按ID查询在档球员
    pub fn find_active_by_id(&self, player_id: &str) -> RepositoryResult<Option<Player>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM players WHERE player_id = ?1 AND is_active = 1",
            Self::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![player_id], Self::row_to_player) {
            Ok(player) => Ok(Some(player)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按ID查询（含已软删除，供删除路径使用）
    pub fn find_by_id(&self, player_id: &str) -> RepositoryResult<Option<Player>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM players WHERE player_id = ?1", Self::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![player_id], Self::row_to_player) {
            Ok(player) => Ok(Some(player)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 同名同俱乐部的在档球员是否已存在（创建前的快速检查；
    /// 最终防线是 idx_players_name_club_active 唯一索引）
    pub fn exists_active_by_name_club(
        &self,
        name: &str,
        club: Option<&str>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM players
             WHERE name = ?1 AND current_club IS ?2 AND is_active = 1",
            params![name, club],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 插入球员
    pub fn insert(&self, player: &Player) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO players (
                player_id, name, full_name, date_of_birth, nationality, second_nationality,
                height_cm, weight_kg, preferred_foot, current_club, position, shirt_number,
                contract_expires, market_value_eur, weekly_wage_eur, agent_name,
                scouting_notes, overall_rating, potential_rating, availability_status,
                created_by, is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
            )
            "#,
            params![
                player.player_id,
                player.name,
                player.full_name,
                player.date_of_birth,
                player.nationality,
                player.second_nationality,
                player.height_cm,
                player.weight_kg,
                player.preferred_foot,
                player.current_club,
                player.position,
                player.shirt_number,
                player.contract_expires,
                player.market_value_eur,
                player.weekly_wage_eur,
                player.agent_name,
                player.scouting_notes,
                player.overall_rating,
                player.potential_rating,
                player.availability_status,
                player.created_by,
                player.is_active,
                player.created_at,
                player.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 更新球员（全字段覆盖，主键与 created_at/created_by 除外）
    pub fn update(&self, player: &Player) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE players SET
                name = ?2, full_name = ?3, date_of_birth = ?4, nationality = ?5,
                second_nationality = ?6, height_cm = ?7, weight_kg = ?8,
                preferred_foot = ?9, current_club = ?10, position = ?11,
                shirt_number = ?12, contract_expires = ?13, market_value_eur = ?14,
                weekly_wage_eur = ?15, agent_name = ?16, scouting_notes = ?17,
                overall_rating = ?18, potential_rating = ?19, availability_status = ?20,
                updated_at = ?21
            WHERE player_id = ?1
            "#,
            params![
                player.player_id,
                player.name,
                player.full_name,
                player.date_of_birth,
                player.nationality,
                player.second_nationality,
                player.height_cm,
                player.weight_kg,
                player.preferred_foot,
                player.current_club,
                player.position,
                player.shirt_number,
                player.contract_expires,
                player.market_value_eur,
                player.weekly_wage_eur,
                player.agent_name,
                player.scouting_notes,
                player.overall_rating,
                player.potential_rating,
                player.availability_status,
                Utc::now(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Player".to_string(),
                id: player.player_id.clone(),
            });
        }
        Ok(())
    }

    /// 软删除（is_active=false）
    pub fn soft_delete(&self, player_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE players SET is_active = 0, updated_at = ?2 WHERE player_id = ?1",
            params![player_id, Utc::now()],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Player".to_string(),
                id: player_id.to_string(),
            });
        }
        Ok(())
    }

    /// 全量在档球员（按目录插入顺序，供相似度候选池使用）
    pub fn list_active(&self) -> RepositoryResult<Vec<Player>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM players WHERE is_active = 1 ORDER BY rowid ASC",
            Self::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_player)?;

        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    }

    /// 目录汇总统计
    pub fn stats_summary(&self) -> RepositoryResult<PlayerStatsSummary> {
        let conn = self.get_conn()?;

        let (total_players, total_nationalities, total_clubs, total_positions, avg_value, max_value, min_value) =
            conn.query_row(
                r#"
                SELECT
                    COUNT(*),
                    COUNT(DISTINCT nationality),
                    COUNT(DISTINCT current_club),
                    COUNT(DISTINCT position),
                    AVG(market_value_eur),
                    MAX(market_value_eur),
                    MIN(market_value_eur)
                FROM players WHERE is_active = 1
                "#,
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<f64>>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                        row.get::<_, Option<i64>>(6)?,
                    ))
                },
            )?;

        let mut stmt = conn.prepare(
            "SELECT position, COUNT(*) FROM players WHERE is_active = 1
             GROUP BY position ORDER BY COUNT(*) DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PositionCount {
                position: row.get(0)?,
                count: row.get(1)?,
            })
        })?;

        let mut position_breakdown = Vec::new();
        for row in rows {
            position_breakdown.push(row?);
        }

        Ok(PlayerStatsSummary {
            total_players,
            total_nationalities,
            total_clubs,
            total_positions,
            avg_market_value_eur: avg_value.map(|v| v as i64).unwrap_or(0),
            max_market_value_eur: max_value,
            min_market_value_eur: min_value,
            position_breakdown,
        })
    }
}
