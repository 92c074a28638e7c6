// ==========================================
// 球探招募管理平台 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 球员/教练目录、候选名单策展与报告生命周期的
//           决策支持核心（传输层与文件渲染由外层负责）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 认证与授权层 - RBAC 与身份解析
pub mod auth;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    EntityRef, ItemStatus, ReportStatus, ReportType, ShortlistPriority, ShortlistStatus,
    ShortlistType, UserRole,
};

// 领域实体
pub use domain::{
    ActivityLog, Coach, ContactRecord, Player, Report, ReportFileMeta, Shortlist,
    ShortlistAggregates, ShortlistItem, User,
};

// 引擎
pub use engine::SimilarityEngine;

// 认证与授权
pub use auth::{authorize, IdentityProvider, IdentityResolver, ProviderIdentity};

// API
pub use api::{AuthApi, CoachApi, PlayerApi, ReportApi, ShortlistApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "球探招募管理平台";
