// ==========================================
// 球探招募管理平台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、读取时派生的纯函数
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod activity_log;
pub mod coach;
pub mod player;
pub mod report;
pub mod shortlist;
pub mod types;
pub mod user;

// 重导出核心类型
pub use activity_log::ActivityLog;
pub use coach::Coach;
pub use player::Player;
pub use report::{Report, ReportFileMeta};
pub use shortlist::{ContactRecord, Shortlist, ShortlistAggregates, ShortlistItem};
pub use types::{
    EntityRef, ItemStatus, ReportStatus, ReportType, ShortlistPriority, ShortlistStatus,
    ShortlistType, UserRole,
};
pub use user::{User, UserUpdateRequest};
