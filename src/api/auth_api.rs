// ==========================================
// 球探招募管理平台 - 认证 API
// ==========================================
// 职责: 当前用户信息查询与资料维护
// 说明: 凭证校验与首次登录落库由 IdentityResolver 完成
// ==========================================

use std::sync::Arc;

use tracing::warn;

use crate::api::error::ApiResult;
use crate::auth::identity::IdentityResolver;
use crate::domain::activity_log::ActivityLog;
use crate::domain::user::{User, UserUpdateRequest};
use crate::repository::activity_log_repo::ActivityLogRepository;
use crate::repository::user_repo::UserRepository;

// ==========================================
// AuthApi - 认证 API
// ==========================================
pub struct AuthApi {
    resolver: Arc<IdentityResolver>,
    user_repo: Arc<UserRepository>,
    activity_log_repo: Arc<ActivityLogRepository>,
}

impl AuthApi {
    pub fn new(
        resolver: Arc<IdentityResolver>,
        user_repo: Arc<UserRepository>,
        activity_log_repo: Arc<ActivityLogRepository>,
    ) -> Self {
        Self {
            resolver,
            user_repo,
            activity_log_repo,
        }
    }

    /// 当前用户信息（首次登录会自动落库）
    pub async fn me(&self, credential: &str) -> ApiResult<User> {
        self.resolver.current_user(credential).await
    }

    /// 更新当前用户资料（仅资料字段，角色与身份字段不可变）
    pub async fn update_me(
        &self,
        credential: &str,
        req: UserUpdateRequest,
    ) -> ApiResult<User> {
        let mut user = self.resolver.current_user(credential).await?;

        if req.first_name.is_some() {
            user.first_name = req.first_name;
        }
        if req.last_name.is_some() {
            user.last_name = req.last_name;
        }
        if req.avatar_url.is_some() {
            user.avatar_url = req.avatar_url;
        }
        if req.preferences_json.is_some() {
            user.preferences_json = req.preferences_json;
        }
        if let Some(timezone) = req.timezone {
            user.timezone = timezone;
        }
        if let Some(language) = req.language {
            user.language = language;
        }

        self.user_repo.update_profile(&user)?;

        let log = ActivityLog::record(
            Some(user.user_id.clone()),
            "user_profile_updated",
            "user",
            Some(user.user_id.clone()),
        );
        if let Err(e) = self.activity_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }

        Ok(user)
    }
}
