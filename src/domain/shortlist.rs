// ==========================================
// 球探招募管理平台 - 候选名单领域模型
// ==========================================
// 对齐: shortlists / shortlist_items 表
// 红线: contact_history 只追加，每次状态迁移必须留痕
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    EntityRef, ItemStatus, ShortlistPriority, ShortlistStatus, ShortlistType,
};

// ==========================================
// Shortlist - 候选名单
// ==========================================
// 归属: 恰好一名创建者；写操作仅限创建者（或管理员）
// list_type 创建后不可变，名单内所有条目必须与之匹配
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortlist {
    pub shortlist_id: String,          // 名单ID
    pub name: String,                  // 名单名称
    pub description: Option<String>,
    pub list_type: ShortlistType,      // player / coach（不可变）
    pub created_by: String,            // 创建者（所有者）
    pub organization_id: Option<String>,

    // ===== 状态与优先级 =====
    pub status: ShortlistStatus,
    pub priority: ShortlistPriority,

    // ===== 组织信息 =====
    pub category: Option<String>,      // summer_targets / backup_options / ...
    pub season: Option<String>,        // 2026-27

    // ===== 时间与预算 =====
    pub deadline: Option<NaiveDate>,
    pub budget_eur: Option<i64>,

    // ===== 进度跟踪 =====
    pub target_count: Option<i64>,     // 目标签约数
    pub completed_count: i64,          // 已完成签约数

    pub notes: Option<String>,
    pub is_active: bool,               // 软删除标记
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// ContactRecord - 接触/审计记录
// ==========================================
// 持久化形态: shortlist_items.contact_history JSON 数组，只追加
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub action: String,                // 动作描述
    pub notes: Option<String>,         // 备注
    pub timestamp: DateTime<Utc>,      // 记录时间
    pub actor: Option<String>,         // 操作人（用户ID）
}

// ==========================================
// ShortlistItem - 候选名单条目
// ==========================================
// 恰好引用一名球员或一名教练（EntityRef 保证）；
// 同一名单内同一实体至多出现一次；
// 条目随名单存在，移除时硬删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistItem {
    pub item_id: String,               // 条目ID
    pub shortlist_id: String,          // 所属名单
    pub entity: EntityRef,             // 引用的球员或教练

    // ===== 跟进状态 =====
    pub status: ItemStatus,
    pub priority: i64,                 // 1-5 星级

    // ===== 评估 =====
    pub notes: Option<String>,
    pub fit_analysis: Option<String>,  // 阵容契合度分析
    pub scout_rating: Option<i64>,     // 0-100 球探评分

    // ===== 财务估算 =====
    pub estimated_fee_eur: Option<i64>, // 预估转会费
    pub wage_demands_eur: Option<i64>,  // 薪资要求（周薪）
    pub contract_length_years: Option<i64>,

    // ===== 时间线 =====
    pub target_completion_date: Option<NaiveDate>,
    pub last_contacted_date: Option<NaiveDate>,

    // ===== 进度计数 =====
    pub contact_attempts: i64,
    pub meetings_held: i64,
    pub offers_made: i64,

    // ===== 审计 =====
    pub contact_history: Vec<ContactRecord>, // 只追加

    // ===== 系统字段 =====
    pub added_by: Option<String>,
    pub last_updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortlistItem {
    /// 条目优先级的合法区间
    pub const PRIORITY_MIN: i64 = 1;
    pub const PRIORITY_MAX: i64 = 5;

    /// 追加一条接触/审计记录
    ///
    /// # 说明
    /// - contact_history 只追加，从不修改或删除既有记录
    /// - 动作文本含 "contact"（不区分大小写）时视为一次接触，
    ///   递增 contact_attempts
    pub fn push_history(
        &mut self,
        action: impl Into<String>,
        notes: Option<String>,
        actor: Option<String>,
        now: DateTime<Utc>,
    ) {
        let action = action.into();
        if action.to_lowercase().contains("contact") {
            self.contact_attempts += 1;
        }
        self.contact_history.push(ContactRecord {
            action,
            notes,
            timestamp: now,
            actor,
        });
    }

    /// 状态迁移
    ///
    /// 任意状态间迁移都被接受（推进顺序是约定而非强制，
    /// 以支持人工修正与回退），但每次迁移都追加一条审计记录。
    ///
    /// # 返回
    /// - 迁移前的旧状态
    pub fn change_status(
        &mut self,
        new_status: ItemStatus,
        notes: Option<String>,
        actor: Option<String>,
        now: DateTime<Utc>,
    ) -> ItemStatus {
        let old_status = self.status;
        self.status = new_status;
        self.push_history(
            format!("Status changed from {} to {}", old_status, new_status),
            notes,
            actor.clone(),
            now,
        );
        self.last_updated_by = actor;
        self.updated_at = now;
        old_status
    }

    /// 记录一次接触动作（会议、报价、电话等）
    pub fn record_contact(
        &mut self,
        action: impl Into<String>,
        notes: Option<String>,
        actor: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.push_history(action, notes, actor.clone(), now);
        self.last_contacted_date = Some(now.date_naive());
        self.last_updated_by = actor;
        self.updated_at = now;
    }
}

// ==========================================
// ShortlistAggregates - 名单汇总指标
// ==========================================
// 读取时派生，不落库，避免底层数据变化后的陈旧值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistAggregates {
    pub items_count: usize,            // 在册条目数
    pub total_estimated_cost: i64,     // 预估总成本（缺失费用按0计）
    pub progress_percentage: f64,      // 签约进度百分比
}

impl ShortlistAggregates {
    /// 基于名单与其条目计算汇总指标
    ///
    /// # 规则
    /// - items_count: 条目数量
    /// - total_estimated_cost: estimated_fee_eur 之和，缺失按 0
    /// - progress_percentage: target_count 为正时
    ///   min(100, completed_count / target_count * 100)，否则 0
    pub fn compute(shortlist: &Shortlist, items: &[ShortlistItem]) -> Self {
        let total_estimated_cost = items
            .iter()
            .filter_map(|item| item.estimated_fee_eur)
            .sum();

        let progress_percentage = match shortlist.target_count {
            Some(target) if target > 0 => {
                let pct = shortlist.completed_count as f64 / target as f64 * 100.0;
                pct.min(100.0)
            }
            _ => 0.0,
        };

        Self {
            items_count: items.len(),
            total_estimated_cost,
            progress_percentage,
        }
    }
}
