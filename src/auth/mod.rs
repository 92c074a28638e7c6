// ==========================================
// 球探招募管理平台 - 认证与授权层
// ==========================================
// 职责: RBAC 权限判定、身份解析
// ==========================================

pub mod identity;
pub mod permissions;

// 重导出核心类型
pub use identity::{IdentityProvider, IdentityResolver, ProviderError, ProviderIdentity};
pub use permissions::{authorize, require, Action, Resource};
