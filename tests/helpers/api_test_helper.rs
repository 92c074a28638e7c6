// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助设施
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use tempfile::NamedTempFile;

use scout_hub::api::{AuthApi, CoachApi, PlayerApi, ReportApi, ShortlistApi};
use scout_hub::auth::identity::{
    IdentityProvider, IdentityResolver, ProviderError, ProviderIdentity,
};
use scout_hub::config::settings::SettingsManager;
use scout_hub::domain::types::UserRole;
use scout_hub::domain::user::User;
use scout_hub::engine::similarity::SimilarityEngine;
use scout_hub::repository::{
    ActivityLogRepository, CoachRepository, PlayerRepository, ReportRepository,
    ShortlistRepository, UserRepository,
};

// ==========================================
// StubIdentityProvider - 测试用身份提供方
// ==========================================

/// 内存身份提供方桩
///
/// 凭证格式约定:
/// - "token:{external_id}:{email}" -> 解析成功
/// - "invalid" -> InvalidCredential
/// - 其他 -> ServiceUnavailable（模拟提供方故障）
pub struct StubIdentityProvider;

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn resolve(&self, credential: &str) -> Result<ProviderIdentity, ProviderError> {
        if credential == "invalid" {
            return Err(ProviderError::InvalidCredential("bad token".to_string()));
        }

        let parts: Vec<&str> = credential.splitn(3, ':').collect();
        match parts.as_slice() {
            ["token", external_id, email] => Ok(ProviderIdentity {
                external_id: external_id.to_string(),
                email: email.to_string(),
                first_name: Some("Test".to_string()),
                last_name: Some("User".to_string()),
                avatar_url: None,
            }),
            _ => Err(ProviderError::ServiceUnavailable(
                "stub provider outage".to_string(),
            )),
        }
    }
}

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例和必要的依赖（共享同一临时数据库连接）
pub struct ApiTestEnv {
    pub db_path: String,
    pub player_api: Arc<PlayerApi>,
    pub coach_api: Arc<CoachApi>,
    pub shortlist_api: Arc<ShortlistApi>,
    pub report_api: Arc<ReportApi>,
    pub auth_api: Arc<AuthApi>,
    pub resolver: Arc<IdentityResolver>,

    // Repository层（用于测试数据准备）
    pub user_repo: Arc<UserRepository>,
    pub player_repo: Arc<PlayerRepository>,
    pub coach_repo: Arc<CoachRepository>,
    pub shortlist_repo: Arc<ShortlistRepository>,
    pub report_repo: Arc<ReportRepository>,
    pub activity_log_repo: Arc<ActivityLogRepository>,
    pub settings: Arc<SettingsManager>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    ///
    /// # 说明
    /// - 使用临时数据库文件并初始化 schema
    /// - 所有 Repository 共享同一连接
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) =
            test_helpers::create_test_db().map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = scout_hub::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================

        let user_repo = Arc::new(UserRepository::from_connection(conn.clone()));
        let player_repo = Arc::new(PlayerRepository::from_connection(conn.clone()));
        let coach_repo = Arc::new(CoachRepository::from_connection(conn.clone()));
        let shortlist_repo = Arc::new(ShortlistRepository::from_connection(conn.clone()));
        let report_repo = Arc::new(ReportRepository::from_connection(conn.clone()));
        let activity_log_repo = Arc::new(ActivityLogRepository::from_connection(conn.clone()));
        let settings = Arc::new(SettingsManager::from_connection(conn.clone()));

        // ==========================================
        // 初始化Engine与API层
        // ==========================================

        let similarity_engine = Arc::new(SimilarityEngine::new());

        let player_api = Arc::new(PlayerApi::new(
            player_repo.clone(),
            activity_log_repo.clone(),
            similarity_engine.clone(),
            settings.clone(),
        ));
        let coach_api = Arc::new(CoachApi::new(
            coach_repo.clone(),
            activity_log_repo.clone(),
            similarity_engine.clone(),
            settings.clone(),
        ));
        let shortlist_api = Arc::new(ShortlistApi::new(
            shortlist_repo.clone(),
            player_repo.clone(),
            coach_repo.clone(),
            activity_log_repo.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(
            report_repo.clone(),
            activity_log_repo.clone(),
            settings.clone(),
        ));

        let resolver = Arc::new(IdentityResolver::new(
            user_repo.clone(),
            settings.clone(),
            Arc::new(StubIdentityProvider),
        ));
        let auth_api = Arc::new(AuthApi::new(
            resolver.clone(),
            user_repo.clone(),
            activity_log_repo.clone(),
        ));

        Ok(Self {
            db_path,
            player_api,
            coach_api,
            shortlist_api,
            report_api,
            auth_api,
            resolver,
            user_repo,
            player_repo,
            coach_repo,
            shortlist_repo,
            report_repo,
            activity_log_repo,
            settings,
            _temp_file: temp_file,
        })
    }

    /// 插入指定角色的测试用户
    pub fn create_user(&self, role: UserRole) -> User {
        let id = uuid::Uuid::new_v4().to_string();
        let user = User {
            user_id: id.clone(),
            external_id: format!("ext_{}", id),
            email: format!("{}@test.example", id),
            first_name: None,
            last_name: None,
            avatar_url: None,
            role,
            organization_id: None,
            organization_name: None,
            preferences_json: None,
            timezone: "UTC".to_string(),
            language: "en".to_string(),
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.user_repo.insert(&user).expect("插入测试用户失败");
        user
    }

    /// 插入已停用的测试用户
    pub fn create_inactive_user(&self, role: UserRole) -> User {
        let mut user = self.create_user(role);
        user.is_active = false;
        // 直接改库（用户停用没有专门的仓储方法，测试直连）
        let conn = scout_hub::db::open_sqlite_connection(&self.db_path).unwrap();
        conn.execute(
            "UPDATE users SET is_active = 0 WHERE user_id = ?1",
            rusqlite::params![user.user_id],
        )
        .unwrap();
        user
    }
}

/// 直接执行SQL（测试数据微调）
pub fn execute_sql(env: &ApiTestEnv, sql: &str) {
    let conn = Connection::open(&env.db_path).unwrap();
    conn.execute_batch(sql).unwrap();
}
