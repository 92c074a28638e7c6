// ==========================================
// CoachApi 集成测试
// ==========================================
// 测试范围:
// 1. 目录查询: 过滤、分页
// 2. 目录维护: 创建（去重）、更新、软删除
// 3. 相似推荐: 同角色 + 同阵型
// 4. RBAC 拦截（球探无教练目录权限）
// ==========================================

mod helpers;

use helpers::api_test_helper::ApiTestEnv;
use helpers::test_data_builder::CoachBuilder;

use scout_hub::api::types::PageRequest;
use scout_hub::api::{ApiError, CoachCreateRequest, CoachUpdateRequest};
use scout_hub::domain::types::UserRole;
use scout_hub::repository::CoachFilter;

fn create_request(name: &str, club: &str) -> CoachCreateRequest {
    CoachCreateRequest {
        name: name.to_string(),
        current_club: Some(club.to_string()),
        current_role: Some("head_coach".to_string()),
        preferred_formation: Some("4-3-3".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_list_coaches_过滤() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    env.coach_repo
        .insert(&CoachBuilder::new("c1", "Rossi").role("head_coach").formation("4-3-3").build())
        .unwrap();
    env.coach_repo
        .insert(&CoachBuilder::new("c2", "Bianchi").role("assistant").formation("4-4-2").build())
        .unwrap();
    env.coach_repo
        .insert(&CoachBuilder::new("c3", "Verdi").role("head_coach").inactive().build())
        .unwrap();

    let filter = CoachFilter {
        current_role: Some("head_coach".to_string()),
        ..Default::default()
    };
    let page = env
        .coach_api
        .list_coaches(&filter, "name", false, PageRequest::default(), &user)
        .unwrap();

    // 软删除的 c3 不可见
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].coach_id, "c1");

    let filter = CoachFilter {
        formation: Some("4-4-2".to_string()),
        ..Default::default()
    };
    let page = env
        .coach_api
        .list_coaches(&filter, "name", false, PageRequest::default(), &user)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].coach_id, "c2");
}

#[test]
fn test_create_coach_同俱乐部同名冲突() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    env.coach_api
        .create_coach(create_request("Rossi", "FC A"), &user)
        .expect("首次创建失败");

    let result = env
        .coach_api
        .create_coach(create_request("Rossi", "FC A"), &user);
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    // 不同俱乐部同名可以创建
    assert!(env
        .coach_api
        .create_coach(create_request("Rossi", "FC B"), &user)
        .is_ok());
}

#[test]
fn test_update_与软删除() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let coach = env
        .coach_api
        .create_coach(create_request("Rossi", "FC A"), &user)
        .unwrap();

    let req = CoachUpdateRequest {
        years_experience: Some(12),
        coaching_level: Some("elite".to_string()),
        ..Default::default()
    };
    let updated = env.coach_api.update_coach(&coach.coach_id, req, &user).unwrap();
    assert_eq!(updated.years_experience, Some(12));
    assert_eq!(updated.coaching_level.as_deref(), Some("elite"));

    env.coach_api.delete_coach(&coach.coach_id, &user).unwrap();
    let result = env.coach_api.get_coach(&coach.coach_id, &user);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_rbac_球探无教练目录权限() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let scout = env.create_user(UserRole::Scout);

    // 球探角色对 coach 资源没有任何条目 -> 读也拒绝
    let result = env.coach_api.list_coaches(
        &CoachFilter::default(),
        "name",
        false,
        PageRequest::default(),
        &scout,
    );
    assert!(matches!(result, Err(ApiError::AuthorizationError)));

    let result = env.coach_api.create_coach(create_request("Rossi", "FC A"), &scout);
    assert!(matches!(result, Err(ApiError::AuthorizationError)));
}

#[test]
fn test_find_similar_coaches_同角色同阵型() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    env.coach_repo
        .insert(&CoachBuilder::new("target", "Target").role("head_coach").formation("4-3-3").build())
        .unwrap();
    env.coach_repo
        .insert(&CoachBuilder::new("c1", "Match1").role("head_coach").formation("4-3-3").build())
        .unwrap();
    env.coach_repo
        .insert(&CoachBuilder::new("c2", "WrongRole").role("assistant").formation("4-3-3").build())
        .unwrap();
    env.coach_repo
        .insert(&CoachBuilder::new("c3", "WrongShape").role("head_coach").formation("3-5-2").build())
        .unwrap();
    env.coach_repo
        .insert(&CoachBuilder::new("c4", "Match2").role("head_coach").formation("4-3-3").build())
        .unwrap();

    let similar = env
        .coach_api
        .find_similar_coaches("target", Some(10), &user)
        .unwrap();

    let ids: Vec<_> = similar.iter().map(|c| c.coach_id.as_str()).collect();
    // 目录插入顺序，无额外排序
    assert_eq!(ids, vec!["c1", "c4"]);

    // limit 截断
    let similar = env
        .coach_api
        .find_similar_coaches("target", Some(1), &user)
        .unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].coach_id, "c1");
}
