// ==========================================
// 球探招募管理平台 - API层错误类型
// ==========================================
// 职责: 定义API层错误分类，转换Repository错误为用户友好的错误消息
// 分类对应传输层语义: 400 / 404 / 409 / 410 / 403 / 401
// 这些错误是领域规则的预期结果: 不自动重试，也不静默吞掉
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 领域规则错误
    // ==========================================
    /// 输入不合法（缺失/多余的实体引用、非法枚举值等），对应 400
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    /// 记录不存在或已软删除，对应 404
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 重复记录或状态不允许该操作，对应 409
    #[error("冲突: {0}")]
    Conflict(String),

    /// 资源已过期，与 NotFound 区分，对应 410
    #[error("资源已过期: {0}")]
    Gone(String),

    // ==========================================
    // 认证与授权错误
    // ==========================================
    /// 授权拒绝，对应 403
    /// 消息固定，不暴露具体哪一级检查失败
    #[error("无权限执行该操作")]
    AuthorizationError,

    /// 身份认证失败（含身份提供方故障），对应 401
    /// 不暴露提供方内部异常细节
    #[error("身份认证失败: {0}")]
    AuthenticationError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为领域语义错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            // 唯一约束是重复写入的最终防线，语义上等同于冲突
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("记录已存在: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("引用的记录不存在: {}", msg))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
