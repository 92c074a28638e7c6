// ==========================================
// 球探招募管理平台 - 领域类型定义
// ==========================================
// 序列化格式: snake_case (与数据库存储一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 用户角色 (User Role)
// ==========================================
// 权限完全由角色派生，见 auth::permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,   // 管理员
    Analyst, // 分析师
    Coach,   // 教练
    Scout,   // 球探
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl UserRole {
    /// 从字符串解析角色
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "analyst" => Some(UserRole::Analyst),
            "coach" => Some(UserRole::Coach),
            "scout" => Some(UserRole::Scout),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Analyst => "analyst",
            UserRole::Coach => "coach",
            UserRole::Scout => "scout",
        }
    }
}

// ==========================================
// 候选名单类型 (Shortlist Type)
// ==========================================
// 创建后不可变，名单内所有条目必须与之匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistType {
    Player, // 球员名单
    Coach,  // 教练名单
}

impl fmt::Display for ShortlistType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ShortlistType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "player" => Some(ShortlistType::Player),
            "coach" => Some(ShortlistType::Coach),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShortlistType::Player => "player",
            ShortlistType::Coach => "coach",
        }
    }
}

// ==========================================
// 候选名单状态 (Shortlist Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistStatus {
    Active,    // 进行中
    Archived,  // 已归档
    Completed, // 已完成
    OnHold,    // 暂停
}

impl fmt::Display for ShortlistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ShortlistStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(ShortlistStatus::Active),
            "archived" => Some(ShortlistStatus::Archived),
            "completed" => Some(ShortlistStatus::Completed),
            "on_hold" => Some(ShortlistStatus::OnHold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShortlistStatus::Active => "active",
            ShortlistStatus::Archived => "archived",
            ShortlistStatus::Completed => "completed",
            ShortlistStatus::OnHold => "on_hold",
        }
    }
}

// ==========================================
// 候选名单优先级 (Shortlist Priority)
// ==========================================
// 顺序: Low < Medium < High < Urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistPriority {
    Low,    // 低
    Medium, // 中
    High,   // 高
    Urgent, // 紧急
}

impl fmt::Display for ShortlistPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ShortlistPriority {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(ShortlistPriority::Low),
            "medium" => Some(ShortlistPriority::Medium),
            "high" => Some(ShortlistPriority::High),
            "urgent" => Some(ShortlistPriority::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShortlistPriority::Low => "low",
            ShortlistPriority::Medium => "medium",
            ShortlistPriority::High => "high",
            ShortlistPriority::Urgent => "urgent",
        }
    }
}

// ==========================================
// 条目跟进状态 (Item Status)
// ==========================================
// 约定的推进顺序:
//   identified -> scouted -> analyzed -> shortlisted
//   -> approached -> negotiating -> signed
// rejected / unavailable 可从任意非终态进入
// 注意: 顺序是约定而非强制，任意状态间迁移都被接受，
//       但每次迁移必须在 contact_history 中留下审计记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Identified,  // 已发现
    Scouted,     // 已考察
    Analyzed,    // 已分析
    Shortlisted, // 已入选
    Approached,  // 已接触
    Negotiating, // 谈判中
    Signed,      // 已签约
    Rejected,    // 已放弃
    Unavailable, // 不可引进
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ItemStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "identified" => Some(ItemStatus::Identified),
            "scouted" => Some(ItemStatus::Scouted),
            "analyzed" => Some(ItemStatus::Analyzed),
            "shortlisted" => Some(ItemStatus::Shortlisted),
            "approached" => Some(ItemStatus::Approached),
            "negotiating" => Some(ItemStatus::Negotiating),
            "signed" => Some(ItemStatus::Signed),
            "rejected" => Some(ItemStatus::Rejected),
            "unavailable" => Some(ItemStatus::Unavailable),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Identified => "identified",
            ItemStatus::Scouted => "scouted",
            ItemStatus::Analyzed => "analyzed",
            ItemStatus::Shortlisted => "shortlisted",
            ItemStatus::Approached => "approached",
            ItemStatus::Negotiating => "negotiating",
            ItemStatus::Signed => "signed",
            ItemStatus::Rejected => "rejected",
            ItemStatus::Unavailable => "unavailable",
        }
    }

    /// 是否为约定意义上的终态（不做强制校验）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ItemStatus::Signed | ItemStatus::Rejected | ItemStatus::Unavailable
        )
    }
}

// ==========================================
// 报告状态 (Report Status)
// ==========================================
// pending -> generating -> completed | failed
// expired 为读取时派生状态（completed 且过期），不落库
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,    // 等待生成
    Generating, // 生成中
    Completed,  // 已完成
    Failed,     // 生成失败
    Expired,    // 已过期（派生）
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ReportStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ReportStatus::Pending),
            "generating" => Some(ReportStatus::Generating),
            "completed" => Some(ReportStatus::Completed),
            "failed" => Some(ReportStatus::Failed),
            "expired" => Some(ReportStatus::Expired),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Generating => "generating",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
            ReportStatus::Expired => "expired",
        }
    }
}

// ==========================================
// 报告类型 (Report Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    PlayerScout,      // 球员考察报告
    CoachAnalysis,    // 教练分析报告
    ShortlistSummary, // 名单汇总报告
    Comparison,       // 对比报告
    MarketAnalysis,   // 市场分析报告
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ReportType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "player_scout" => Some(ReportType::PlayerScout),
            "coach_analysis" => Some(ReportType::CoachAnalysis),
            "shortlist_summary" => Some(ReportType::ShortlistSummary),
            "comparison" => Some(ReportType::Comparison),
            "market_analysis" => Some(ReportType::MarketAnalysis),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::PlayerScout => "player_scout",
            ReportType::CoachAnalysis => "coach_analysis",
            ReportType::ShortlistSummary => "shortlist_summary",
            ReportType::Comparison => "comparison",
            ReportType::MarketAnalysis => "market_analysis",
        }
    }
}

// ==========================================
// 实体引用 (Entity Ref)
// ==========================================
// 候选名单条目恰好引用一名球员或一名教练。
// 用带标签的枚举代替“两个可空外键 + CHECK 约束”，
// 让“两者皆空/两者皆设”在类型层面不可表示；
// 数据库层的 CHECK 约束仅作为外部写入的兜底。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity_type", content = "entity_id", rename_all = "snake_case")]
pub enum EntityRef {
    Player(String),
    Coach(String),
}

impl EntityRef {
    /// 从一对可空ID构造（边界输入校验）
    ///
    /// # 返回
    /// - Ok(EntityRef): 恰好提供了一个ID
    /// - Err(&str): 两者皆空或两者皆设，错误消息供 ValidationError 使用
    pub fn from_parts(
        player_id: Option<String>,
        coach_id: Option<String>,
    ) -> Result<Self, &'static str> {
        match (player_id, coach_id) {
            (Some(p), None) => Ok(EntityRef::Player(p)),
            (None, Some(c)) => Ok(EntityRef::Coach(c)),
            (Some(_), Some(_)) => Err("player_id 与 coach_id 只能提供其一"),
            (None, None) => Err("必须提供 player_id 或 coach_id"),
        }
    }

    /// 引用的实体ID
    pub fn id(&self) -> &str {
        match self {
            EntityRef::Player(id) | EntityRef::Coach(id) => id,
        }
    }

    /// 引用的实体类型（与候选名单类型对应）
    pub fn entity_type(&self) -> ShortlistType {
        match self {
            EntityRef::Player(_) => ShortlistType::Player,
            EntityRef::Coach(_) => ShortlistType::Coach,
        }
    }

    /// 拆为数据库列形式 (player_id, coach_id)
    pub fn as_columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            EntityRef::Player(id) => (Some(id.as_str()), None),
            EntityRef::Coach(id) => (None, Some(id.as_str())),
        }
    }
}
