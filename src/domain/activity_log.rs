// ==========================================
// 球探招募管理平台 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪
// 对齐: activity_log 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActivityLog - 平台操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub log_id: String,                // 日志ID
    pub user_id: Option<String>,       // 操作人（系统操作可为 None）
    pub action: String,                // 动作，如 player_created / shortlist_item_status_changed
    pub resource_type: String,         // player / coach / shortlist / report / user
    pub resource_id: Option<String>,   // 资源ID
    pub resource_name: Option<String>, // 资源的可读名称
    pub details_json: Option<JsonValue>, // 附加上下文 (JSON)
    pub created_at: DateTime<Utc>,     // 记录时间
}

impl ActivityLog {
    /// 创建一条操作日志
    ///
    /// # 参数
    /// - user_id: 操作人（系统操作传 None）
    /// - action: 动作标识
    /// - resource_type: 资源类型
    /// - resource_id: 资源ID
    pub fn record(
        user_id: Option<String>,
        action: &str,
        resource_type: &str,
        resource_id: Option<String>,
    ) -> Self {
        Self {
            log_id: uuid::Uuid::new_v4().to_string(),
            user_id,
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id,
            resource_name: None,
            details_json: None,
            created_at: Utc::now(),
        }
    }

    /// 设置资源可读名称
    pub fn with_resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = Some(name.into());
        self
    }

    /// 设置附加上下文 (转换为JSON)
    pub fn with_details<T: Serialize>(mut self, details: &T) -> Self {
        self.details_json = serde_json::to_value(details).ok();
        self
    }
}
