// ==========================================
// PlayerApi 集成测试
// ==========================================
// 测试范围:
// 1. 目录查询: 过滤、排序、分页
// 2. 目录维护: 创建（去重）、更新、软删除
// 3. 相似推荐: 窗口过滤与排序
// 4. RBAC 拦截
// ==========================================

mod helpers;

use helpers::api_test_helper::ApiTestEnv;
use helpers::test_data_builder::PlayerBuilder;

use scout_hub::api::types::PageRequest;
use scout_hub::api::{ApiError, PlayerCreateRequest, PlayerUpdateRequest};
use scout_hub::domain::types::UserRole;
use scout_hub::repository::PlayerFilter;

fn create_request(name: &str, club: &str, position: &str) -> PlayerCreateRequest {
    PlayerCreateRequest {
        name: name.to_string(),
        position: position.to_string(),
        current_club: Some(club.to_string()),
        ..Default::default()
    }
}

// ==========================================
// 查询接口
// ==========================================

#[test]
fn test_list_players_过滤与软删除隐藏() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    env.player_repo
        .insert(&PlayerBuilder::new("p1", "Silva").position("ST").club("FC A").build())
        .unwrap();
    env.player_repo
        .insert(&PlayerBuilder::new("p2", "Costa").position("GK").club("FC A").build())
        .unwrap();
    env.player_repo
        .insert(&PlayerBuilder::new("p3", "Santos").position("ST").club("FC B").inactive().build())
        .unwrap();

    // 位置过滤，软删除的 p3 不可见
    let filter = PlayerFilter {
        position: Some("ST".to_string()),
        ..Default::default()
    };
    let page = env
        .player_api
        .list_players(&filter, "name", false, PageRequest::default(), &user)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].player_id, "p1");

    // 俱乐部过滤
    let filter = PlayerFilter {
        club: Some("FC A".to_string()),
        ..Default::default()
    };
    let page = env
        .player_api
        .list_players(&filter, "name", false, PageRequest::default(), &user)
        .unwrap();
    assert_eq!(page.total, 2);
}

#[test]
fn test_list_players_身价区间与排序() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    for (id, name, value) in [
        ("p1", "A", 5_000_000),
        ("p2", "B", 20_000_000),
        ("p3", "C", 10_000_000),
    ] {
        env.player_repo
            .insert(&PlayerBuilder::new(id, name).market_value(value).build())
            .unwrap();
    }

    let filter = PlayerFilter {
        min_value: Some(6_000_000),
        ..Default::default()
    };
    let page = env
        .player_api
        .list_players(&filter, "market_value", true, PageRequest::default(), &user)
        .unwrap();

    let ids: Vec<_> = page.items.iter().map(|p| p.player_id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p3"]);
}

#[test]
fn test_list_players_分页元数据() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    for i in 1..=25 {
        env.player_repo
            .insert(&PlayerBuilder::new(&format!("p{:02}", i), &format!("Player{:02}", i)).build())
            .unwrap();
    }

    let page = env
        .player_api
        .list_players(
            &PlayerFilter::default(),
            "name",
            false,
            PageRequest::new(10, 20),
            &user,
        )
        .unwrap();

    assert_eq!(page.total, 25);
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.page, 3);
    assert_eq!(page.total_pages, 3);
}

#[test]
fn test_get_player_不存在或已删除() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let result = env.player_api.get_player("missing", &user);
    assert!(matches!(result, Err(ApiError::NotFound(_))));

    env.player_repo
        .insert(&PlayerBuilder::new("p1", "Silva").inactive().build())
        .unwrap();
    let result = env.player_api.get_player("p1", &user);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

// ==========================================
// 维护接口
// ==========================================

#[test]
fn test_create_player_同俱乐部同名冲突() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    env.player_api
        .create_player(create_request("Silva", "FC A", "ST"), &user)
        .expect("首次创建失败");

    // 同名同俱乐部冲突
    let result = env
        .player_api
        .create_player(create_request("Silva", "FC A", "CM"), &user);
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    // 同名不同俱乐部可以创建
    assert!(env
        .player_api
        .create_player(create_request("Silva", "FC B", "ST"), &user)
        .is_ok());
}

#[test]
fn test_create_player_软删除后允许重建() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let player = env
        .player_api
        .create_player(create_request("Silva", "FC A", "ST"), &user)
        .unwrap();
    env.player_api
        .delete_player(&player.player_id, &user)
        .unwrap();

    // 软删除释放唯一约束（部分唯一索引只约束在档行）
    assert!(env
        .player_api
        .create_player(create_request("Silva", "FC A", "ST"), &user)
        .is_ok());
}

#[test]
fn test_create_player_必填字段校验() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let result = env
        .player_api
        .create_player(create_request("  ", "FC A", "ST"), &user);
    assert!(matches!(result, Err(ApiError::ValidationError(_))));

    let result = env
        .player_api
        .create_player(create_request("Silva", "FC A", " "), &user);
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

#[test]
fn test_update_player_字段更新() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let player = env
        .player_api
        .create_player(create_request("Silva", "FC A", "ST"), &user)
        .unwrap();

    let req = PlayerUpdateRequest {
        market_value_eur: Some(30_000_000),
        overall_rating: Some(85),
        ..Default::default()
    };
    let updated = env
        .player_api
        .update_player(&player.player_id, req, &user)
        .unwrap();

    assert_eq!(updated.market_value_eur, Some(30_000_000));
    assert_eq!(updated.overall_rating, Some(85));
    // 未提供的字段不变
    assert_eq!(updated.name, "Silva");
    assert_eq!(updated.position, "ST");
}

#[test]
fn test_delete_player_软删除() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let player = env
        .player_api
        .create_player(create_request("Silva", "FC A", "ST"), &user)
        .unwrap();
    env.player_api
        .delete_player(&player.player_id, &user)
        .unwrap();

    // 默认查询不可见，但记录仍在（软删除）
    assert!(env
        .player_repo
        .find_active_by_id(&player.player_id)
        .unwrap()
        .is_none());
    assert!(env
        .player_repo
        .find_by_id(&player.player_id)
        .unwrap()
        .is_some());
}

// ==========================================
// RBAC 拦截
// ==========================================

#[test]
fn test_rbac_教练角色只读目录() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let coach_user = env.create_user(UserRole::Coach);

    // 读取允许
    assert!(env
        .player_api
        .list_players(
            &PlayerFilter::default(),
            "name",
            false,
            PageRequest::default(),
            &coach_user
        )
        .is_ok());

    // 创建/删除拒绝，且不落库
    let result = env
        .player_api
        .create_player(create_request("Silva", "FC A", "ST"), &coach_user);
    assert!(matches!(result, Err(ApiError::AuthorizationError)));

    let result = env.player_api.delete_player("p1", &coach_user);
    assert!(matches!(result, Err(ApiError::AuthorizationError)));
}

#[test]
fn test_rbac_球探可更新球员但不可创建() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let analyst = env.create_user(UserRole::Analyst);
    let scout = env.create_user(UserRole::Scout);

    let player = env
        .player_api
        .create_player(create_request("Silva", "FC A", "ST"), &analyst)
        .unwrap();

    let result = env
        .player_api
        .create_player(create_request("Costa", "FC A", "GK"), &scout);
    assert!(matches!(result, Err(ApiError::AuthorizationError)));

    let req = PlayerUpdateRequest {
        scouting_notes: Some("快速反击意识突出".to_string()),
        ..Default::default()
    };
    assert!(env
        .player_api
        .update_player(&player.player_id, req, &scout)
        .is_ok());
}

// ==========================================
// 相似推荐
// ==========================================

#[test]
fn test_find_similar_players_窗口与排序() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    // 目标: ST, 2000年生, 身价 10M
    env.player_repo
        .insert(
            &PlayerBuilder::new("target", "Target")
                .position("ST")
                .born(2000, 6, 1)
                .market_value(10_000_000)
                .build(),
        )
        .unwrap();

    // 候选: 同位置同年龄段，身价差从小到大
    env.player_repo
        .insert(
            &PlayerBuilder::new("far", "Far")
                .position("ST")
                .born(2001, 1, 1)
                .market_value(14_000_000)
                .build(),
        )
        .unwrap();
    env.player_repo
        .insert(
            &PlayerBuilder::new("near", "Near")
                .position("ST")
                .born(1999, 3, 1)
                .market_value(11_000_000)
                .build(),
        )
        .unwrap();
    // 窗口外: 位置不同 / 年龄差过大 / 身价超出 1.5x / 已软删除
    env.player_repo
        .insert(
            &PlayerBuilder::new("gk", "Keeper")
                .position("GK")
                .born(2000, 1, 1)
                .market_value(10_000_000)
                .build(),
        )
        .unwrap();
    env.player_repo
        .insert(
            &PlayerBuilder::new("old", "Veteran")
                .position("ST")
                .born(1990, 1, 1)
                .market_value(10_000_000)
                .build(),
        )
        .unwrap();
    env.player_repo
        .insert(
            &PlayerBuilder::new("rich", "Star")
                .position("ST")
                .born(2000, 2, 1)
                .market_value(40_000_000)
                .build(),
        )
        .unwrap();
    env.player_repo
        .insert(
            &PlayerBuilder::new("gone", "Gone")
                .position("ST")
                .born(2000, 2, 1)
                .market_value(10_000_000)
                .inactive()
                .build(),
        )
        .unwrap();

    let similar = env
        .player_api
        .find_similar_players("target", Some(10), &user)
        .unwrap();

    let ids: Vec<_> = similar.iter().map(|p| p.player_id.as_str()).collect();
    // 身价差升序: near(1M) < far(4M)；窗口外与软删除的全部缺席
    assert_eq!(ids, vec!["near", "far"]);
}

#[test]
fn test_find_similar_players_目标缺字段时跳过过滤() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    // 目标无出生日期无身价 -> 只按位置过滤
    env.player_repo
        .insert(&PlayerBuilder::new("target", "Target").position("CM").build())
        .unwrap();
    env.player_repo
        .insert(
            &PlayerBuilder::new("p1", "A")
                .position("CM")
                .born(1985, 1, 1)
                .market_value(500_000)
                .build(),
        )
        .unwrap();
    env.player_repo
        .insert(&PlayerBuilder::new("p2", "B").position("CM").build())
        .unwrap();

    let similar = env
        .player_api
        .find_similar_players("target", None, &user)
        .unwrap();
    assert_eq!(similar.len(), 2);

    // 目标不存在 -> NotFound
    let result = env.player_api.find_similar_players("missing", None, &user);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_stats_summary() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    env.player_repo
        .insert(
            &PlayerBuilder::new("p1", "A")
                .position("ST")
                .nationality("BR")
                .market_value(10_000_000)
                .build(),
        )
        .unwrap();
    env.player_repo
        .insert(
            &PlayerBuilder::new("p2", "B")
                .position("ST")
                .nationality("AR")
                .market_value(20_000_000)
                .build(),
        )
        .unwrap();
    env.player_repo
        .insert(&PlayerBuilder::new("p3", "C").position("GK").nationality("BR").build())
        .unwrap();

    let stats = env.player_api.stats_summary(&user).unwrap();
    assert_eq!(stats.total_players, 3);
    assert_eq!(stats.total_nationalities, 2);
    assert_eq!(stats.total_positions, 2);
    assert_eq!(stats.max_market_value_eur, Some(20_000_000));
    assert_eq!(stats.position_breakdown[0].position, "ST");
    assert_eq!(stats.position_breakdown[0].count, 2);
}
