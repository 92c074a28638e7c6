// ==========================================
// 球探招募管理平台 - 身份解析器
// ==========================================
// 职责: 将不透明凭证解析为本地用户，首次登录自动落库
// 边界: 身份提供方是唯一的瞬态故障边界；本核心不做自动重试，
//       对外只报 AuthenticationError，不暴露提供方内部异常
// ==========================================

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::settings::SettingsManager;
use crate::domain::types::UserRole;
use crate::domain::user::User;
use crate::repository::error::RepositoryError;
use crate::repository::user_repo::UserRepository;

// ==========================================
// ProviderIdentity - 身份提供方返回的身份信息
// ==========================================
#[derive(Debug, Clone)]
pub struct ProviderIdentity {
    pub external_id: String,           // 提供方用户标识
    pub email: String,                 // 主邮箱
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

// ==========================================
// ProviderError - 身份提供方错误
// ==========================================
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("凭证无效: {0}")]
    InvalidCredential(String),

    #[error("身份服务不可用: {0}")]
    ServiceUnavailable(String),
}

// ==========================================
// IdentityProvider Trait
// ==========================================
// 用途: 外部身份服务的接口边界
// 实现者: 生产环境对接真实身份服务；测试使用内存桩
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// 将不透明凭证解析为提供方身份信息
    ///
    /// # 返回
    /// - Ok(ProviderIdentity): 凭证有效
    /// - Err(ProviderError): 凭证无效或服务故障
    async fn resolve(&self, credential: &str) -> Result<ProviderIdentity, ProviderError>;
}

// ==========================================
// IdentityResolver - 身份解析器
// ==========================================

/// 身份解析器
///
/// 职责：
/// 1. 通过身份提供方校验凭证
/// 2. 按 external_id 查找本地用户，首次登录自动落库
/// 3. 拦截已停用账号
pub struct IdentityResolver {
    user_repo: Arc<UserRepository>,
    settings: Arc<SettingsManager>,
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityResolver {
    pub fn new(
        user_repo: Arc<UserRepository>,
        settings: Arc<SettingsManager>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            user_repo,
            settings,
            provider,
        }
    }

    /// 解析当前请求的用户
    ///
    /// # 参数
    /// - credential: 不透明凭证（由传输层透传）
    ///
    /// # 返回
    /// - Ok(User): 本地用户记录
    /// - Err(ApiError::AuthenticationError): 凭证无效或提供方故障
    /// - Err(ApiError::AuthorizationError): 账号已停用
    pub async fn current_user(&self, credential: &str) -> ApiResult<User> {
        let identity = match self.provider.resolve(credential).await {
            Ok(identity) => identity,
            Err(ProviderError::InvalidCredential(reason)) => {
                warn!(reason = %reason, "凭证校验失败");
                return Err(ApiError::AuthenticationError("凭证无效".to_string()));
            }
            Err(ProviderError::ServiceUnavailable(reason)) => {
                // 瞬态故障边界: 只记录，不重试，不透出提供方细节
                warn!(reason = %reason, "身份服务调用失败");
                return Err(ApiError::AuthenticationError(
                    "身份服务暂不可用".to_string(),
                ));
            }
        };

        if identity.external_id.trim().is_empty() {
            return Err(ApiError::AuthenticationError(
                "身份信息缺少用户标识".to_string(),
            ));
        }
        if identity.email.trim().is_empty() {
            return Err(ApiError::AuthenticationError(
                "身份信息缺少主邮箱".to_string(),
            ));
        }

        let user = match self.user_repo.find_by_external_id(&identity.external_id)? {
            Some(user) => user,
            None => self.provision_user(&identity)?,
        };

        // 停用账号拦截
        if !user.is_active {
            return Err(ApiError::AuthorizationError);
        }

        // 登录时间戳失败不影响主流程
        if let Err(e) = self.user_repo.touch_last_login(&user.user_id) {
            warn!(user_id = %user.user_id, error = %e, "更新最近登录时间失败");
        }

        Ok(user)
    }

    /// 首次登录自动落库
    ///
    /// # 说明
    /// - 角色: 邮箱在超级管理员名单中 -> admin，否则取默认角色配置
    /// - external_id 的唯一约束是并发重复落库的最终防线：
    ///   撞到唯一约束时改为重读已存在的记录
    fn provision_user(&self, identity: &ProviderIdentity) -> ApiResult<User> {
        let role = if self
            .settings
            .super_admin_emails()?
            .iter()
            .any(|email| email.eq_ignore_ascii_case(&identity.email))
        {
            UserRole::Admin
        } else {
            self.settings.default_role()?
        };

        let user = User {
            user_id: uuid::Uuid::new_v4().to_string(),
            external_id: identity.external_id.clone(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            avatar_url: identity.avatar_url.clone(),
            role,
            organization_id: None,
            organization_name: None,
            preferences_json: None,
            timezone: "UTC".to_string(),
            language: "en".to_string(),
            is_active: true,
            last_login_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        match self.user_repo.insert(&user) {
            Ok(()) => {
                info!(user_id = %user.user_id, email = %user.email, role = %user.role, "首次登录，创建本地用户");
                Ok(user)
            }
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                // 并发请求已先行落库
                self.user_repo
                    .find_by_external_id(&identity.external_id)?
                    .ok_or_else(|| {
                        ApiError::InternalError("用户落库冲突后未找到记录".to_string())
                    })
            }
            Err(e) => Err(e.into()),
        }
    }
}
