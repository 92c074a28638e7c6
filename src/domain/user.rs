// ==========================================
// 球探招募管理平台 - 用户领域模型
// ==========================================
// 对齐: users 表
// 说明: 用户由外部身份服务首次登录时自动落库，
//       此后除资料字段与 is_active 外不可变
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::UserRole;

// ==========================================
// User - 平台用户
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    // ===== 身份 =====
    pub user_id: String,              // 用户ID
    pub external_id: String,          // 外部身份服务ID（唯一）
    pub email: String,                // 邮箱（唯一）

    // ===== 资料 =====
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,

    // ===== 角色与组织 =====
    pub role: UserRole,               // 角色，权限完全由此派生
    pub organization_id: Option<String>,
    pub organization_name: Option<String>,

    // ===== 偏好 =====
    pub preferences_json: Option<String>, // 用户偏好 (JSON)
    pub timezone: String,
    pub language: String,

    // ===== 状态 =====
    pub is_active: bool,              // 停用后拒绝所有请求
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 展示用全名，资料缺失时回退到邮箱
    pub fn full_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(f), Some(l)) => format!("{} {}", f, l),
            (Some(f), None) => f.to_string(),
            (None, Some(l)) => l.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

// ==========================================
// UserUpdateRequest - 资料更新请求
// ==========================================
/// 仅允许更新资料字段，身份与角色字段不在此列
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub preferences_json: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
}
