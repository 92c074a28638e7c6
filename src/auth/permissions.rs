// ==========================================
// 球探招募管理平台 - RBAC 权限引擎
// ==========================================
// 职责: 决定 (角色, 资源, 动作) 三元组是否被允许
// 红线: 纯函数，无 I/O，权限表为数据而非分支代码，
//       进程启动后只读，可独立穷举测试
// ==========================================

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::UserRole;

/// 通配符，可出现在资源级或动作级
pub const WILDCARD: &str = "*";

// ==========================================
// 资源与动作
// ==========================================

/// 受权限保护的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Player,
    Coach,
    Shortlist,
    Report,
    Analytics,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Player => "player",
            Resource::Coach => "coach",
            Resource::Shortlist => "shortlist",
            Resource::Report => "report",
            Resource::Analytics => "analytics",
        }
    }
}

/// 受权限保护的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

// ==========================================
// 权限表
// ==========================================
// 形态: 角色 -> 资源 -> 动作集合
// 管理员持有角色级通配符 (* -> *)，无条件放行

type PermissionTable = HashMap<UserRole, HashMap<&'static str, &'static [&'static str]>>;

static PERMISSION_TABLE: OnceLock<PermissionTable> = OnceLock::new();

/// 构造静态权限表（进程内只执行一次）
fn build_permission_table() -> PermissionTable {
    const ALL: &[&str] = &[WILDCARD];
    const CRUD: &[&str] = &["create", "read", "update", "delete"];
    const CRD: &[&str] = &["create", "read", "delete"];
    const CRU: &[&str] = &["create", "read", "update"];
    const CR: &[&str] = &["create", "read"];
    const R: &[&str] = &["read"];
    const RU: &[&str] = &["read", "update"];

    let mut table: PermissionTable = HashMap::new();

    // 管理员: 角色级通配符
    let mut admin = HashMap::new();
    admin.insert(WILDCARD, ALL);
    table.insert(UserRole::Admin, admin);

    // 分析师: 目录与名单全权限，报告不可改（只能重新生成）
    let mut analyst = HashMap::new();
    analyst.insert("player", CRUD);
    analyst.insert("coach", CRUD);
    analyst.insert("shortlist", CRUD);
    analyst.insert("report", CRD);
    analyst.insert("analytics", R);
    table.insert(UserRole::Analyst, analyst);

    // 教练: 只读目录，可维护自己的名单与报告
    let mut coach = HashMap::new();
    coach.insert("player", R);
    coach.insert("coach", R);
    coach.insert("shortlist", CRU);
    coach.insert("report", CR);
    table.insert(UserRole::Coach, coach);

    // 球探: 可补充球员考察信息，无教练目录权限
    let mut scout = HashMap::new();
    scout.insert("player", RU);
    scout.insert("shortlist", CRU);
    scout.insert("report", CR);
    table.insert(UserRole::Scout, scout);

    table
}

fn permission_table() -> &'static PermissionTable {
    PERMISSION_TABLE.get_or_init(build_permission_table)
}

// ==========================================
// 授权判定
// ==========================================

/// 判定 (角色, 资源, 动作) 是否被允许
///
/// # 查找顺序
/// 1. 角色不在表中 -> 拒绝
/// 2. 角色持有 `*` 资源项 -> 允许
/// 3. 查找具体资源；缺失 -> 拒绝
/// 4. 动作在集合中，或集合含 `*` -> 允许；否则拒绝
///
/// 纯函数: 结果仅由参数与静态表决定
pub fn authorize(role: UserRole, resource: Resource, action: Action) -> bool {
    let table = permission_table();

    let role_perms = match table.get(&role) {
        Some(perms) => perms,
        None => return false,
    };

    if role_perms.contains_key(WILDCARD) {
        return true;
    }

    let actions = match role_perms.get(resource.as_str()) {
        Some(actions) => actions,
        None => return false,
    };

    actions.contains(&action.as_str()) || actions.contains(&WILDCARD)
}

/// 授权检查，拒绝时返回 AuthorizationError
///
/// # 说明
/// 错误消息固定为“无权限执行该操作”，不暴露具体哪一级检查失败
pub fn require(role: UserRole, resource: Resource, action: Action) -> ApiResult<()> {
    if authorize(role, resource, action) {
        Ok(())
    } else {
        Err(ApiError::AuthorizationError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: &[UserRole] = &[
        UserRole::Admin,
        UserRole::Analyst,
        UserRole::Coach,
        UserRole::Scout,
    ];
    const ALL_RESOURCES: &[Resource] = &[
        Resource::Player,
        Resource::Coach,
        Resource::Shortlist,
        Resource::Report,
        Resource::Analytics,
    ];
    const ALL_ACTIONS: &[Action] = &[Action::Create, Action::Read, Action::Update, Action::Delete];

    #[test]
    fn test_admin_全部放行() {
        for &resource in ALL_RESOURCES {
            for &action in ALL_ACTIONS {
                assert!(
                    authorize(UserRole::Admin, resource, action),
                    "admin 应被允许 {:?} {:?}",
                    action,
                    resource
                );
            }
        }
    }

    #[test]
    fn test_无资源条目的角色全部拒绝() {
        // scout 没有 coach 目录权限
        for &action in ALL_ACTIONS {
            assert!(!authorize(UserRole::Scout, Resource::Coach, action));
        }
        // coach 没有 analytics 权限
        for &action in ALL_ACTIONS {
            assert!(!authorize(UserRole::Coach, Resource::Analytics, action));
        }
    }

    #[test]
    fn test_analyst_权限表() {
        assert!(authorize(UserRole::Analyst, Resource::Player, Action::Delete));
        assert!(authorize(UserRole::Analyst, Resource::Shortlist, Action::Delete));
        assert!(authorize(UserRole::Analyst, Resource::Report, Action::Delete));
        // 报告不可 update
        assert!(!authorize(UserRole::Analyst, Resource::Report, Action::Update));
        assert!(authorize(UserRole::Analyst, Resource::Analytics, Action::Read));
        assert!(!authorize(UserRole::Analyst, Resource::Analytics, Action::Create));
    }

    #[test]
    fn test_coach_权限表() {
        assert!(authorize(UserRole::Coach, Resource::Player, Action::Read));
        assert!(!authorize(UserRole::Coach, Resource::Player, Action::Update));
        assert!(!authorize(UserRole::Coach, Resource::Player, Action::Delete));
        assert!(authorize(UserRole::Coach, Resource::Shortlist, Action::Update));
        // 名单不可 delete
        assert!(!authorize(UserRole::Coach, Resource::Shortlist, Action::Delete));
        assert!(authorize(UserRole::Coach, Resource::Report, Action::Create));
        assert!(!authorize(UserRole::Coach, Resource::Report, Action::Delete));
    }

    #[test]
    fn test_scout_权限表() {
        // 球探可补充球员信息
        assert!(authorize(UserRole::Scout, Resource::Player, Action::Read));
        assert!(authorize(UserRole::Scout, Resource::Player, Action::Update));
        assert!(!authorize(UserRole::Scout, Resource::Player, Action::Create));
        assert!(!authorize(UserRole::Scout, Resource::Player, Action::Delete));
        assert!(authorize(UserRole::Scout, Resource::Shortlist, Action::Create));
        assert!(!authorize(UserRole::Scout, Resource::Shortlist, Action::Delete));
    }

    #[test]
    fn test_require_拒绝时消息固定() {
        let err = require(UserRole::Scout, Resource::Coach, Action::Read).unwrap_err();
        assert_eq!(err.to_string(), "无权限执行该操作");

        assert!(require(UserRole::Scout, Resource::Player, Action::Read).is_ok());
    }

    #[test]
    fn test_判定为纯函数_结果可重复() {
        for &role in ALL_ROLES {
            for &resource in ALL_RESOURCES {
                for &action in ALL_ACTIONS {
                    let first = authorize(role, resource, action);
                    let second = authorize(role, resource, action);
                    assert_eq!(first, second);
                }
            }
        }
    }
}
