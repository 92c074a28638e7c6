// ==========================================
// 球探招募管理平台 - 候选名单 API（策展引擎）
// ==========================================
// 职责:
// 1. 名单生命周期（创建/查询/更新/软删除）
// 2. 条目管理（多态实体引用、状态工作流、接触审计）
// 3. 汇总指标计算
// 红线:
// - 所有操作先过 RBAC；写操作仅限名单创建者或管理员
// - 条目的每次状态迁移必须在 contact_history 留痕
// - (名单, 实体) 去重以数据库唯一约束为最终防线
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{PageRequest, Paginated};
use crate::auth::permissions::{self, Action, Resource};
use crate::domain::activity_log::ActivityLog;
use crate::domain::shortlist::{Shortlist, ShortlistAggregates, ShortlistItem};
use crate::domain::types::{EntityRef, ItemStatus, ShortlistPriority, ShortlistType};
use crate::domain::user::User;
use crate::repository::activity_log_repo::ActivityLogRepository;
use crate::repository::coach_repo::CoachRepository;
use crate::repository::player_repo::PlayerRepository;
use crate::repository::shortlist_repo::{ShortlistFilter, ShortlistRepository};

// ==========================================
// 请求/响应 DTO
// ==========================================

/// 名单创建请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub list_type: ShortlistType,
    pub priority: Option<ShortlistPriority>,
    pub category: Option<String>,
    pub season: Option<String>,
    pub deadline: Option<chrono::NaiveDate>,
    pub budget_eur: Option<i64>,
    pub target_count: Option<i64>,
    pub notes: Option<String>,
}

/// 名单更新请求（None 表示不修改；list_type 不可变更）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortlistUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<crate::domain::types::ShortlistStatus>,
    pub priority: Option<ShortlistPriority>,
    pub category: Option<String>,
    pub season: Option<String>,
    pub deadline: Option<chrono::NaiveDate>,
    pub budget_eur: Option<i64>,
    pub target_count: Option<i64>,
    pub completed_count: Option<i64>,
    pub notes: Option<String>,
}

/// 条目添加请求
///
/// player_id/coach_id 作为一对可空ID进入边界，
/// 由 EntityRef::from_parts 校验“恰好其一”
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub player_id: Option<String>,
    pub coach_id: Option<String>,
    pub status: Option<ItemStatus>,      // 缺省 identified
    pub priority: Option<i64>,           // 1-5，缺省 3
    pub notes: Option<String>,
    pub fit_analysis: Option<String>,
    pub scout_rating: Option<i64>,
    pub estimated_fee_eur: Option<i64>,
    pub wage_demands_eur: Option<i64>,
    pub contract_length_years: Option<i64>,
    pub target_completion_date: Option<chrono::NaiveDate>,
}

/// 条目更新请求（状态迁移走 update_item_status）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub priority: Option<i64>,
    pub notes: Option<String>,
    pub fit_analysis: Option<String>,
    pub scout_rating: Option<i64>,
    pub estimated_fee_eur: Option<i64>,
    pub wage_demands_eur: Option<i64>,
    pub contract_length_years: Option<i64>,
    pub target_completion_date: Option<chrono::NaiveDate>,
    pub meetings_held: Option<i64>,
    pub offers_made: Option<i64>,
}

/// 名单详情（条目按需附带，汇总指标总是读取时现算）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistDetail {
    pub shortlist: Shortlist,
    pub items: Option<Vec<ShortlistItem>>,
    pub aggregates: ShortlistAggregates,
}

// ==========================================
// ShortlistApi - 候选名单 API
// ==========================================
pub struct ShortlistApi {
    shortlist_repo: Arc<ShortlistRepository>,
    player_repo: Arc<PlayerRepository>,
    coach_repo: Arc<CoachRepository>,
    activity_log_repo: Arc<ActivityLogRepository>,
}

impl ShortlistApi {
    pub fn new(
        shortlist_repo: Arc<ShortlistRepository>,
        player_repo: Arc<PlayerRepository>,
        coach_repo: Arc<CoachRepository>,
        activity_log_repo: Arc<ActivityLogRepository>,
    ) -> Self {
        Self {
            shortlist_repo,
            player_repo,
            coach_repo,
            activity_log_repo,
        }
    }

    fn log_activity(&self, log: ActivityLog) {
        if let Err(e) = self.activity_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }
    }

    /// 名单写操作仅限创建者或管理员
    ///
    /// 错误消息与权限拒绝一致，不暴露归属细节
    fn ensure_owner(shortlist: &Shortlist, current_user: &User) -> ApiResult<()> {
        use crate::domain::types::UserRole;
        if current_user.role == UserRole::Admin || shortlist.created_by == current_user.user_id {
            Ok(())
        } else {
            Err(ApiError::AuthorizationError)
        }
    }

    fn find_shortlist(&self, shortlist_id: &str) -> ApiResult<Shortlist> {
        self.shortlist_repo
            .find_active_by_id(shortlist_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Shortlist(id={})不存在", shortlist_id)))
    }

    fn find_item(&self, item_id: &str) -> ApiResult<ShortlistItem> {
        self.shortlist_repo
            .find_item_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("ShortlistItem(id={})不存在", item_id)))
    }

    // ==========================================
    // 名单生命周期
    // ==========================================

    /// 创建名单（初始状态 active）
    pub fn create_shortlist(
        &self,
        req: ShortlistCreateRequest,
        current_user: &User,
    ) -> ApiResult<Shortlist> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Create)?;

        if req.name.trim().is_empty() {
            return Err(ApiError::ValidationError("名单名称不能为空".to_string()));
        }

        let now = Utc::now();
        let shortlist = Shortlist {
            shortlist_id: uuid::Uuid::new_v4().to_string(),
            name: req.name,
            description: req.description,
            list_type: req.list_type,
            created_by: current_user.user_id.clone(),
            organization_id: current_user.organization_id.clone(),
            status: crate::domain::types::ShortlistStatus::Active,
            priority: req.priority.unwrap_or(ShortlistPriority::Medium),
            category: req.category,
            season: req.season,
            deadline: req.deadline,
            budget_eur: req.budget_eur,
            target_count: req.target_count,
            completed_count: 0,
            notes: req.notes,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.shortlist_repo.insert_shortlist(&shortlist)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "shortlist_created",
                "shortlist",
                Some(shortlist.shortlist_id.clone()),
            )
            .with_resource_name(shortlist.name.clone()),
        );

        Ok(shortlist)
    }

    /// 查询名单详情
    ///
    /// # 参数
    /// - with_items: 是否在响应中附带条目列表
    ///
    /// 汇总指标总是现算（读取时派生，避免陈旧值）
    pub fn get_shortlist(
        &self,
        shortlist_id: &str,
        with_items: bool,
        current_user: &User,
    ) -> ApiResult<ShortlistDetail> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Read)?;

        let shortlist = self.find_shortlist(shortlist_id)?;
        let items = self.shortlist_repo.list_items(shortlist_id)?;
        let aggregates = ShortlistAggregates::compute(&shortlist, &items);

        Ok(ShortlistDetail {
            shortlist,
            items: if with_items { Some(items) } else { None },
            aggregates,
        })
    }

    /// 查询名单列表（过滤 + 排序 + 分页）
    pub fn list_shortlists(
        &self,
        filter: &ShortlistFilter,
        sort_by: &str,
        sort_desc: bool,
        page: PageRequest,
        current_user: &User,
    ) -> ApiResult<Paginated<Shortlist>> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Read)?;

        let page = page.clamped();
        let total = self.shortlist_repo.count(filter)?;
        let shortlists = self
            .shortlist_repo
            .list(filter, sort_by, sort_desc, page.limit, page.offset)?;

        Ok(Paginated::new(shortlists, page, total))
    }

    /// 更新名单（list_type 不可变更）
    pub fn update_shortlist(
        &self,
        shortlist_id: &str,
        req: ShortlistUpdateRequest,
        current_user: &User,
    ) -> ApiResult<Shortlist> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Update)?;

        let mut shortlist = self.find_shortlist(shortlist_id)?;
        Self::ensure_owner(&shortlist, current_user)?;

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(ApiError::ValidationError("名单名称不能为空".to_string()));
            }
            shortlist.name = name;
        }
        if req.description.is_some() {
            shortlist.description = req.description;
        }
        if let Some(status) = req.status {
            shortlist.status = status;
        }
        if let Some(priority) = req.priority {
            shortlist.priority = priority;
        }
        if req.category.is_some() {
            shortlist.category = req.category;
        }
        if req.season.is_some() {
            shortlist.season = req.season;
        }
        if req.deadline.is_some() {
            shortlist.deadline = req.deadline;
        }
        if req.budget_eur.is_some() {
            shortlist.budget_eur = req.budget_eur;
        }
        if req.target_count.is_some() {
            shortlist.target_count = req.target_count;
        }
        if let Some(completed) = req.completed_count {
            if completed < 0 {
                return Err(ApiError::ValidationError(
                    "completed_count 不能为负".to_string(),
                ));
            }
            shortlist.completed_count = completed;
        }
        if req.notes.is_some() {
            shortlist.notes = req.notes;
        }

        self.shortlist_repo.update_shortlist(&shortlist)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "shortlist_updated",
                "shortlist",
                Some(shortlist.shortlist_id.clone()),
            )
            .with_resource_name(shortlist.name.clone()),
        );

        Ok(shortlist)
    }

    /// 软删除名单（条目随名单一起不可见）
    pub fn delete_shortlist(&self, shortlist_id: &str, current_user: &User) -> ApiResult<()> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Delete)?;

        let shortlist = self.find_shortlist(shortlist_id)?;
        Self::ensure_owner(&shortlist, current_user)?;

        self.shortlist_repo.soft_delete(shortlist_id)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "shortlist_deleted",
                "shortlist",
                Some(shortlist_id.to_string()),
            )
            .with_resource_name(shortlist.name),
        );

        Ok(())
    }

    // ==========================================
    // 条目管理
    // ==========================================

    /// 添加条目
    ///
    /// # 错误
    /// - ValidationError: 实体引用缺失/多余、类型与名单不匹配、优先级越界
    /// - NotFound: 名单或引用实体不存在（或已软删除）
    /// - Conflict: (名单, 实体) 对已存在
    pub fn add_item(
        &self,
        shortlist_id: &str,
        req: AddItemRequest,
        current_user: &User,
    ) -> ApiResult<ShortlistItem> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Update)?;

        // 恰好一个实体引用（边界校验后进入类型层不变量）
        let entity = EntityRef::from_parts(req.player_id, req.coach_id)
            .map_err(|msg| ApiError::ValidationError(msg.to_string()))?;

        let shortlist = self.find_shortlist(shortlist_id)?;
        Self::ensure_owner(&shortlist, current_user)?;

        // 条目类型必须与名单类型一致
        if entity.entity_type() != shortlist.list_type {
            return Err(ApiError::ValidationError(format!(
                "条目类型({})与名单类型({})不匹配",
                entity.entity_type(),
                shortlist.list_type
            )));
        }

        let priority = req.priority.unwrap_or(3);
        if !(ShortlistItem::PRIORITY_MIN..=ShortlistItem::PRIORITY_MAX).contains(&priority) {
            return Err(ApiError::ValidationError(format!(
                "条目优先级必须在{}-{}之间",
                ShortlistItem::PRIORITY_MIN,
                ShortlistItem::PRIORITY_MAX
            )));
        }

        // 引用实体必须在档
        let entity_name = match &entity {
            EntityRef::Player(player_id) => self
                .player_repo
                .find_active_by_id(player_id)?
                .map(|p| p.name)
                .ok_or_else(|| ApiError::NotFound(format!("Player(id={})不存在", player_id)))?,
            EntityRef::Coach(coach_id) => self
                .coach_repo
                .find_active_by_id(coach_id)?
                .map(|c| c.name)
                .ok_or_else(|| ApiError::NotFound(format!("Coach(id={})不存在", coach_id)))?,
        };

        // 快速去重检查；并发下以唯一约束为准（撞约束同样映射为 Conflict）
        if self.shortlist_repo.pair_exists(shortlist_id, &entity)? {
            return Err(ApiError::Conflict(
                "该球员/教练已在名单中".to_string(),
            ));
        }

        let now = Utc::now();
        let item = ShortlistItem {
            item_id: uuid::Uuid::new_v4().to_string(),
            shortlist_id: shortlist_id.to_string(),
            entity,
            status: req.status.unwrap_or(ItemStatus::Identified),
            priority,
            notes: req.notes,
            fit_analysis: req.fit_analysis,
            scout_rating: req.scout_rating,
            estimated_fee_eur: req.estimated_fee_eur,
            wage_demands_eur: req.wage_demands_eur,
            contract_length_years: req.contract_length_years,
            target_completion_date: req.target_completion_date,
            last_contacted_date: None,
            contact_attempts: 0,
            meetings_held: 0,
            offers_made: 0,
            contact_history: vec![],
            added_by: Some(current_user.user_id.clone()),
            last_updated_by: None,
            created_at: now,
            updated_at: now,
        };

        self.shortlist_repo.insert_item(&item)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "shortlist_item_added",
                "shortlist",
                Some(shortlist_id.to_string()),
            )
            .with_resource_name(entity_name)
            .with_details(&serde_json::json!({ "item_id": item.item_id.clone() })),
        );

        Ok(item)
    }

    /// 更新条目的评估与财务字段（状态迁移走 update_item_status）
    pub fn update_item(
        &self,
        item_id: &str,
        req: UpdateItemRequest,
        current_user: &User,
    ) -> ApiResult<ShortlistItem> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Update)?;

        let mut item = self.find_item(item_id)?;
        let shortlist = self.find_shortlist(&item.shortlist_id)?;
        Self::ensure_owner(&shortlist, current_user)?;

        if let Some(priority) = req.priority {
            if !(ShortlistItem::PRIORITY_MIN..=ShortlistItem::PRIORITY_MAX).contains(&priority) {
                return Err(ApiError::ValidationError(format!(
                    "条目优先级必须在{}-{}之间",
                    ShortlistItem::PRIORITY_MIN,
                    ShortlistItem::PRIORITY_MAX
                )));
            }
            item.priority = priority;
        }
        if req.notes.is_some() {
            item.notes = req.notes;
        }
        if req.fit_analysis.is_some() {
            item.fit_analysis = req.fit_analysis;
        }
        if req.scout_rating.is_some() {
            item.scout_rating = req.scout_rating;
        }
        if req.estimated_fee_eur.is_some() {
            item.estimated_fee_eur = req.estimated_fee_eur;
        }
        if req.wage_demands_eur.is_some() {
            item.wage_demands_eur = req.wage_demands_eur;
        }
        if req.contract_length_years.is_some() {
            item.contract_length_years = req.contract_length_years;
        }
        if req.target_completion_date.is_some() {
            item.target_completion_date = req.target_completion_date;
        }
        if let Some(meetings) = req.meetings_held {
            item.meetings_held = meetings;
        }
        if let Some(offers) = req.offers_made {
            item.offers_made = offers;
        }

        item.last_updated_by = Some(current_user.user_id.clone());
        item.updated_at = Utc::now();
        self.shortlist_repo.update_item(&item)?;

        Ok(item)
    }

    /// 条目状态迁移
    ///
    /// 任意状态间迁移都被接受（推进顺序是约定而非强制），
    /// 但每次调用恰好追加一条审计记录
    pub fn update_item_status(
        &self,
        item_id: &str,
        new_status: ItemStatus,
        notes: Option<String>,
        current_user: &User,
    ) -> ApiResult<ShortlistItem> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Update)?;

        let mut item = self.find_item(item_id)?;
        let shortlist = self.find_shortlist(&item.shortlist_id)?;
        Self::ensure_owner(&shortlist, current_user)?;

        let old_status = item.change_status(
            new_status,
            notes,
            Some(current_user.user_id.clone()),
            Utc::now(),
        );

        self.shortlist_repo.update_item(&item)?;

        debug!(
            item_id = %item_id,
            from = %old_status,
            to = %new_status,
            "条目状态迁移"
        );
        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "shortlist_item_status_changed",
                "shortlist",
                Some(item.shortlist_id.clone()),
            )
            .with_details(&serde_json::json!({
                "item_id": item.item_id.clone(),
                "from": old_status.as_str(),
                "to": new_status.as_str(),
            })),
        );

        Ok(item)
    }

    /// 记录一次接触动作（会议、报价、电话等）
    ///
    /// 动作文本含 "contact" 时递增 contact_attempts
    pub fn record_contact(
        &self,
        item_id: &str,
        action: &str,
        notes: Option<String>,
        current_user: &User,
    ) -> ApiResult<ShortlistItem> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Update)?;

        if action.trim().is_empty() {
            return Err(ApiError::ValidationError("接触动作不能为空".to_string()));
        }

        let mut item = self.find_item(item_id)?;
        let shortlist = self.find_shortlist(&item.shortlist_id)?;
        Self::ensure_owner(&shortlist, current_user)?;

        item.record_contact(action, notes, Some(current_user.user_id.clone()), Utc::now());
        self.shortlist_repo.update_item(&item)?;

        Ok(item)
    }

    /// 移除条目（硬删除条目行，不动引用的球员/教练）
    pub fn remove_item(
        &self,
        shortlist_id: &str,
        item_id: &str,
        current_user: &User,
    ) -> ApiResult<()> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Update)?;

        let shortlist = self.find_shortlist(shortlist_id)?;
        Self::ensure_owner(&shortlist, current_user)?;

        let item = self.find_item(item_id)?;
        if item.shortlist_id != shortlist_id {
            return Err(ApiError::NotFound(format!(
                "ShortlistItem(id={})不属于该名单",
                item_id
            )));
        }

        self.shortlist_repo.delete_item(item_id)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "shortlist_item_removed",
                "shortlist",
                Some(shortlist_id.to_string()),
            )
            .with_details(&serde_json::json!({ "item_id": item_id })),
        );

        Ok(())
    }

    /// 计算名单汇总指标（读取时派生）
    pub fn compute_aggregates(
        &self,
        shortlist_id: &str,
        current_user: &User,
    ) -> ApiResult<ShortlistAggregates> {
        permissions::require(current_user.role, Resource::Shortlist, Action::Read)?;

        let shortlist = self.find_shortlist(shortlist_id)?;
        let items = self.shortlist_repo.list_items(shortlist_id)?;
        Ok(ShortlistAggregates::compute(&shortlist, &items))
    }
}
