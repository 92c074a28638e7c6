// ==========================================
// 球探招募管理平台 - 球员 API
// ==========================================
// 职责: 球员目录的查询、维护与相似推荐
// 红线: 所有操作先过 RBAC；所有写入记录操作日志
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{PageRequest, Paginated};
use crate::auth::permissions::{self, Action, Resource};
use crate::config::settings::SettingsManager;
use crate::domain::activity_log::ActivityLog;
use crate::domain::player::Player;
use crate::domain::user::User;
use crate::engine::similarity::SimilarityEngine;
use crate::repository::activity_log_repo::ActivityLogRepository;
use crate::repository::player_repo::{PlayerFilter, PlayerRepository, PlayerStatsSummary};

// ==========================================
// 请求 DTO
// ==========================================

/// 球员创建请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerCreateRequest {
    pub name: String,
    pub full_name: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub nationality: Option<String>,
    pub second_nationality: Option<String>,
    pub height_cm: Option<i64>,
    pub weight_kg: Option<i64>,
    pub preferred_foot: Option<String>,
    pub current_club: Option<String>,
    pub position: String,
    pub shirt_number: Option<i64>,
    pub contract_expires: Option<chrono::NaiveDate>,
    pub market_value_eur: Option<i64>,
    pub weekly_wage_eur: Option<i64>,
    pub agent_name: Option<String>,
    pub scouting_notes: Option<String>,
    pub overall_rating: Option<i64>,
    pub potential_rating: Option<i64>,
}

/// 球员更新请求（None 表示不修改）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerUpdateRequest {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub nationality: Option<String>,
    pub second_nationality: Option<String>,
    pub height_cm: Option<i64>,
    pub weight_kg: Option<i64>,
    pub preferred_foot: Option<String>,
    pub current_club: Option<String>,
    pub position: Option<String>,
    pub shirt_number: Option<i64>,
    pub contract_expires: Option<chrono::NaiveDate>,
    pub market_value_eur: Option<i64>,
    pub weekly_wage_eur: Option<i64>,
    pub agent_name: Option<String>,
    pub scouting_notes: Option<String>,
    pub overall_rating: Option<i64>,
    pub potential_rating: Option<i64>,
    pub availability_status: Option<String>,
}

// ==========================================
// PlayerApi - 球员 API
// ==========================================

/// 球员API
///
/// 职责：
/// 1. 目录查询（过滤/排序/分页）
/// 2. 目录维护（创建/更新/软删除）
/// 3. 相似球员推荐
/// 4. ActivityLog 记录
pub struct PlayerApi {
    player_repo: Arc<PlayerRepository>,
    activity_log_repo: Arc<ActivityLogRepository>,
    similarity_engine: Arc<SimilarityEngine>,
    settings: Arc<SettingsManager>,
}

impl PlayerApi {
    pub fn new(
        player_repo: Arc<PlayerRepository>,
        activity_log_repo: Arc<ActivityLogRepository>,
        similarity_engine: Arc<SimilarityEngine>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            player_repo,
            activity_log_repo,
            similarity_engine,
            settings,
        }
    }

    /// 记录操作日志，失败时只告警（不影响主要操作）
    fn log_activity(&self, log: ActivityLog) {
        if let Err(e) = self.activity_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询球员列表（过滤 + 排序 + 分页）
    ///
    /// # 参数
    /// - filter: 过滤条件
    /// - sort_by: 排序字段（白名单外回退到 name）
    /// - sort_desc: 是否降序
    /// - page: 分页参数
    pub fn list_players(
        &self,
        filter: &PlayerFilter,
        sort_by: &str,
        sort_desc: bool,
        page: PageRequest,
        current_user: &User,
    ) -> ApiResult<Paginated<Player>> {
        permissions::require(current_user.role, Resource::Player, Action::Read)?;

        let page = page.clamped();
        let total = self.player_repo.count(filter)?;
        let players = self
            .player_repo
            .list(filter, sort_by, sort_desc, page.limit, page.offset)?;

        debug!(total, returned = players.len(), "球员列表查询");
        Ok(Paginated::new(players, page, total))
    }

    /// 查询球员详情
    pub fn get_player(&self, player_id: &str, current_user: &User) -> ApiResult<Player> {
        permissions::require(current_user.role, Resource::Player, Action::Read)?;

        self.player_repo
            .find_active_by_id(player_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Player(id={})不存在", player_id)))
    }

    /// 目录汇总统计
    pub fn stats_summary(&self, current_user: &User) -> ApiResult<PlayerStatsSummary> {
        permissions::require(current_user.role, Resource::Player, Action::Read)?;
        Ok(self.player_repo.stats_summary()?)
    }

    // ==========================================
    // 维护接口
    // ==========================================

    /// 创建球员
    ///
    /// # 错误
    /// - ValidationError: 名称或位置为空
    /// - Conflict: 同俱乐部下已存在同名在档球员
    ///   （应用层检查为快速路径，唯一索引是并发下的最终防线）
    pub fn create_player(
        &self,
        req: PlayerCreateRequest,
        current_user: &User,
    ) -> ApiResult<Player> {
        permissions::require(current_user.role, Resource::Player, Action::Create)?;

        if req.name.trim().is_empty() {
            return Err(ApiError::ValidationError("球员名称不能为空".to_string()));
        }
        if req.position.trim().is_empty() {
            return Err(ApiError::ValidationError("场上位置不能为空".to_string()));
        }

        if self
            .player_repo
            .exists_active_by_name_club(&req.name, req.current_club.as_deref())?
        {
            return Err(ApiError::Conflict(
                "该俱乐部下已存在同名球员".to_string(),
            ));
        }

        let now = Utc::now();
        let player = Player {
            player_id: uuid::Uuid::new_v4().to_string(),
            name: req.name,
            full_name: req.full_name,
            date_of_birth: req.date_of_birth,
            nationality: req.nationality,
            second_nationality: req.second_nationality,
            height_cm: req.height_cm,
            weight_kg: req.weight_kg,
            preferred_foot: req.preferred_foot,
            current_club: req.current_club,
            position: req.position,
            shirt_number: req.shirt_number,
            contract_expires: req.contract_expires,
            market_value_eur: req.market_value_eur,
            weekly_wage_eur: req.weekly_wage_eur,
            agent_name: req.agent_name,
            scouting_notes: req.scouting_notes,
            overall_rating: req.overall_rating,
            potential_rating: req.potential_rating,
            availability_status: "available".to_string(),
            created_by: Some(current_user.user_id.clone()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.player_repo.insert(&player)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "player_created",
                "player",
                Some(player.player_id.clone()),
            )
            .with_resource_name(player.name.clone()),
        );

        Ok(player)
    }

    /// 更新球员信息
    pub fn update_player(
        &self,
        player_id: &str,
        req: PlayerUpdateRequest,
        current_user: &User,
    ) -> ApiResult<Player> {
        permissions::require(current_user.role, Resource::Player, Action::Update)?;

        let mut player = self
            .player_repo
            .find_active_by_id(player_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Player(id={})不存在", player_id)))?;

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(ApiError::ValidationError("球员名称不能为空".to_string()));
            }
            player.name = name;
        }
        if let Some(position) = req.position {
            if position.trim().is_empty() {
                return Err(ApiError::ValidationError("场上位置不能为空".to_string()));
            }
            player.position = position;
        }
        if req.full_name.is_some() {
            player.full_name = req.full_name;
        }
        if req.date_of_birth.is_some() {
            player.date_of_birth = req.date_of_birth;
        }
        if req.nationality.is_some() {
            player.nationality = req.nationality;
        }
        if req.second_nationality.is_some() {
            player.second_nationality = req.second_nationality;
        }
        if req.height_cm.is_some() {
            player.height_cm = req.height_cm;
        }
        if req.weight_kg.is_some() {
            player.weight_kg = req.weight_kg;
        }
        if req.preferred_foot.is_some() {
            player.preferred_foot = req.preferred_foot;
        }
        if req.current_club.is_some() {
            player.current_club = req.current_club;
        }
        if req.shirt_number.is_some() {
            player.shirt_number = req.shirt_number;
        }
        if req.contract_expires.is_some() {
            player.contract_expires = req.contract_expires;
        }
        if req.market_value_eur.is_some() {
            player.market_value_eur = req.market_value_eur;
        }
        if req.weekly_wage_eur.is_some() {
            player.weekly_wage_eur = req.weekly_wage_eur;
        }
        if req.agent_name.is_some() {
            player.agent_name = req.agent_name;
        }
        if req.scouting_notes.is_some() {
            player.scouting_notes = req.scouting_notes;
        }
        if req.overall_rating.is_some() {
            player.overall_rating = req.overall_rating;
        }
        if req.potential_rating.is_some() {
            player.potential_rating = req.potential_rating;
        }
        if let Some(status) = req.availability_status {
            player.availability_status = status;
        }

        self.player_repo.update(&player)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "player_updated",
                "player",
                Some(player.player_id.clone()),
            )
            .with_resource_name(player.name.clone()),
        );

        Ok(player)
    }

    /// 软删除球员（is_active=false，保留历史引用）
    pub fn delete_player(&self, player_id: &str, current_user: &User) -> ApiResult<()> {
        permissions::require(current_user.role, Resource::Player, Action::Delete)?;

        let player = self
            .player_repo
            .find_by_id(player_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Player(id={})不存在", player_id)))?;

        self.player_repo.soft_delete(player_id)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "player_deleted",
                "player",
                Some(player_id.to_string()),
            )
            .with_resource_name(player.name),
        );

        Ok(())
    }

    // ==========================================
    // 相似推荐
    // ==========================================

    /// 查找相似球员
    ///
    /// # 参数
    /// - player_id: 目标球员ID
    /// - limit: 返回数量上限（缺省取配置 similarity/default_limit）
    pub fn find_similar_players(
        &self,
        player_id: &str,
        limit: Option<usize>,
        current_user: &User,
    ) -> ApiResult<Vec<Player>> {
        permissions::require(current_user.role, Resource::Player, Action::Read)?;

        let target = self
            .player_repo
            .find_active_by_id(player_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Player(id={})不存在", player_id)))?;

        let limit = match limit {
            Some(n) if n > 0 => n,
            _ => self.settings.similarity_default_limit()?,
        };

        // 候选池按目录插入顺序提供，排序平局时保持该顺序
        let pool = self.player_repo.list_active()?;
        let today = Utc::now().date_naive();
        let similar = self
            .similarity_engine
            .find_similar_players(&target, &pool, limit, today);

        debug!(
            player_id = %player_id,
            pool_size = pool.len(),
            returned = similar.len(),
            "相似球员推荐"
        );
        Ok(similar)
    }
}
