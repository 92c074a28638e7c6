// ==========================================
// 球探招募管理平台 - 教练 API
// ==========================================
// 职责: 教练目录的查询、维护与相似推荐
// 红线: 所有操作先过 RBAC；所有写入记录操作日志
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{PageRequest, Paginated};
use crate::auth::permissions::{self, Action, Resource};
use crate::config::settings::SettingsManager;
use crate::domain::activity_log::ActivityLog;
use crate::domain::coach::Coach;
use crate::domain::user::User;
use crate::engine::similarity::SimilarityEngine;
use crate::repository::activity_log_repo::ActivityLogRepository;
use crate::repository::coach_repo::{CoachFilter, CoachRepository};

// ==========================================
// 请求 DTO
// ==========================================

/// 教练创建请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachCreateRequest {
    pub name: String,
    pub full_name: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub nationality: Option<String>,
    pub current_club: Option<String>,
    pub current_role: Option<String>,
    pub coaching_level: Option<String>,
    pub years_experience: Option<i64>,
    pub contract_expires: Option<chrono::NaiveDate>,
    pub estimated_salary_eur: Option<i64>,
    pub preferred_formation: Option<String>,
    pub leadership_style: Option<String>,
    pub scouting_notes: Option<String>,
    pub overall_rating: Option<i64>,
}

/// 教练更新请求（None 表示不修改）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachUpdateRequest {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub nationality: Option<String>,
    pub current_club: Option<String>,
    pub current_role: Option<String>,
    pub coaching_level: Option<String>,
    pub years_experience: Option<i64>,
    pub contract_expires: Option<chrono::NaiveDate>,
    pub estimated_salary_eur: Option<i64>,
    pub preferred_formation: Option<String>,
    pub leadership_style: Option<String>,
    pub scouting_notes: Option<String>,
    pub overall_rating: Option<i64>,
    pub availability_status: Option<String>,
}

// ==========================================
// CoachApi - 教练 API
// ==========================================
pub struct CoachApi {
    coach_repo: Arc<CoachRepository>,
    activity_log_repo: Arc<ActivityLogRepository>,
    similarity_engine: Arc<SimilarityEngine>,
    settings: Arc<SettingsManager>,
}

impl CoachApi {
    pub fn new(
        coach_repo: Arc<CoachRepository>,
        activity_log_repo: Arc<ActivityLogRepository>,
        similarity_engine: Arc<SimilarityEngine>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            coach_repo,
            activity_log_repo,
            similarity_engine,
            settings,
        }
    }

    fn log_activity(&self, log: ActivityLog) {
        if let Err(e) = self.activity_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询教练列表（过滤 + 排序 + 分页）
    pub fn list_coaches(
        &self,
        filter: &CoachFilter,
        sort_by: &str,
        sort_desc: bool,
        page: PageRequest,
        current_user: &User,
    ) -> ApiResult<Paginated<Coach>> {
        permissions::require(current_user.role, Resource::Coach, Action::Read)?;

        let page = page.clamped();
        let total = self.coach_repo.count(filter)?;
        let coaches = self
            .coach_repo
            .list(filter, sort_by, sort_desc, page.limit, page.offset)?;

        Ok(Paginated::new(coaches, page, total))
    }

    /// 查询教练详情
    pub fn get_coach(&self, coach_id: &str, current_user: &User) -> ApiResult<Coach> {
        permissions::require(current_user.role, Resource::Coach, Action::Read)?;

        self.coach_repo
            .find_active_by_id(coach_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Coach(id={})不存在", coach_id)))
    }

    // ==========================================
    // 维护接口
    // ==========================================

    /// 创建教练
    ///
    /// # 错误
    /// - ValidationError: 名称为空
    /// - Conflict: 同俱乐部下已存在同名在档教练
    pub fn create_coach(&self, req: CoachCreateRequest, current_user: &User) -> ApiResult<Coach> {
        permissions::require(current_user.role, Resource::Coach, Action::Create)?;

        if req.name.trim().is_empty() {
            return Err(ApiError::ValidationError("教练名称不能为空".to_string()));
        }

        if self
            .coach_repo
            .exists_active_by_name_club(&req.name, req.current_club.as_deref())?
        {
            return Err(ApiError::Conflict(
                "该俱乐部下已存在同名教练".to_string(),
            ));
        }

        let now = Utc::now();
        let coach = Coach {
            coach_id: uuid::Uuid::new_v4().to_string(),
            name: req.name,
            full_name: req.full_name,
            date_of_birth: req.date_of_birth,
            nationality: req.nationality,
            current_club: req.current_club,
            current_role: req.current_role,
            coaching_level: req.coaching_level,
            years_experience: req.years_experience,
            contract_expires: req.contract_expires,
            estimated_salary_eur: req.estimated_salary_eur,
            preferred_formation: req.preferred_formation,
            leadership_style: req.leadership_style,
            scouting_notes: req.scouting_notes,
            overall_rating: req.overall_rating,
            availability_status: "available".to_string(),
            created_by: Some(current_user.user_id.clone()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.coach_repo.insert(&coach)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "coach_created",
                "coach",
                Some(coach.coach_id.clone()),
            )
            .with_resource_name(coach.name.clone()),
        );

        Ok(coach)
    }

    /// 更新教练信息
    pub fn update_coach(
        &self,
        coach_id: &str,
        req: CoachUpdateRequest,
        current_user: &User,
    ) -> ApiResult<Coach> {
        permissions::require(current_user.role, Resource::Coach, Action::Update)?;

        let mut coach = self
            .coach_repo
            .find_active_by_id(coach_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Coach(id={})不存在", coach_id)))?;

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(ApiError::ValidationError("教练名称不能为空".to_string()));
            }
            coach.name = name;
        }
        if req.full_name.is_some() {
            coach.full_name = req.full_name;
        }
        if req.date_of_birth.is_some() {
            coach.date_of_birth = req.date_of_birth;
        }
        if req.nationality.is_some() {
            coach.nationality = req.nationality;
        }
        if req.current_club.is_some() {
            coach.current_club = req.current_club;
        }
        if req.current_role.is_some() {
            coach.current_role = req.current_role;
        }
        if req.coaching_level.is_some() {
            coach.coaching_level = req.coaching_level;
        }
        if req.years_experience.is_some() {
            coach.years_experience = req.years_experience;
        }
        if req.contract_expires.is_some() {
            coach.contract_expires = req.contract_expires;
        }
        if req.estimated_salary_eur.is_some() {
            coach.estimated_salary_eur = req.estimated_salary_eur;
        }
        if req.preferred_formation.is_some() {
            coach.preferred_formation = req.preferred_formation;
        }
        if req.leadership_style.is_some() {
            coach.leadership_style = req.leadership_style;
        }
        if req.scouting_notes.is_some() {
            coach.scouting_notes = req.scouting_notes;
        }
        if req.overall_rating.is_some() {
            coach.overall_rating = req.overall_rating;
        }
        if let Some(status) = req.availability_status {
            coach.availability_status = status;
        }

        self.coach_repo.update(&coach)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "coach_updated",
                "coach",
                Some(coach.coach_id.clone()),
            )
            .with_resource_name(coach.name.clone()),
        );

        Ok(coach)
    }

    /// 软删除教练
    pub fn delete_coach(&self, coach_id: &str, current_user: &User) -> ApiResult<()> {
        permissions::require(current_user.role, Resource::Coach, Action::Delete)?;

        let coach = self
            .coach_repo
            .find_by_id(coach_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Coach(id={})不存在", coach_id)))?;

        self.coach_repo.soft_delete(coach_id)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "coach_deleted",
                "coach",
                Some(coach_id.to_string()),
            )
            .with_resource_name(coach.name),
        );

        Ok(())
    }

    // ==========================================
    // 相似推荐
    // ==========================================

    /// 查找相似教练（同执教角色 + 同惯用阵型，目录顺序）
    pub fn find_similar_coaches(
        &self,
        coach_id: &str,
        limit: Option<usize>,
        current_user: &User,
    ) -> ApiResult<Vec<Coach>> {
        permissions::require(current_user.role, Resource::Coach, Action::Read)?;

        let target = self
            .coach_repo
            .find_active_by_id(coach_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Coach(id={})不存在", coach_id)))?;

        let limit = match limit {
            Some(n) if n > 0 => n,
            _ => self.settings.similarity_default_limit()?,
        };

        let pool = self.coach_repo.list_active()?;
        Ok(self.similarity_engine.find_similar_coaches(&target, &pool, limit))
    }
}
