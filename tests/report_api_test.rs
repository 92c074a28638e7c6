// ==========================================
// ReportApi 集成测试
// ==========================================
// 测试范围:
// 1. 状态机: pending -> generating -> completed | failed，非法迁移报 Conflict
// 2. 过期: 读取时派生，expired 报 Gone（与 NotFound 区分）
// 3. 下载: 仅 completed 且未过期可下载，计数单调递增
// ==========================================

mod helpers;

use chrono::{Duration, Utc};
use helpers::api_test_helper::ApiTestEnv;

use scout_hub::api::types::PageRequest;
use scout_hub::api::{ApiError, ReportCreateRequest};
use scout_hub::domain::report::ReportFileMeta;
use scout_hub::domain::types::{ReportStatus, ReportType, UserRole};
use scout_hub::repository::ReportFilter;

fn create_request(title: &str) -> ReportCreateRequest {
    ReportCreateRequest {
        title: title.to_string(),
        report_type: ReportType::PlayerScout,
        parameters_json: r#"{"player_id":"p1"}"#.to_string(),
        filters_json: None,
    }
}

fn file_meta() -> ReportFileMeta {
    ReportFileMeta {
        file_path: "/reports/r1.pdf".to_string(),
        file_name: "r1.pdf".to_string(),
        file_size: 204_800,
        file_format: "pdf".to_string(),
        page_count: Some(12),
    }
}

/// 直接改写过期时间（模拟时间流逝）
fn set_expires_at(env: &ApiTestEnv, report_id: &str, when: chrono::DateTime<Utc>) {
    let conn = scout_hub::db::open_sqlite_connection(&env.db_path).unwrap();
    conn.execute(
        "UPDATE reports SET expires_at = ?1 WHERE report_id = ?2",
        rusqlite::params![when, report_id],
    )
    .unwrap();
}

// ==========================================
// 创建
// ==========================================

#[test]
fn test_create_report_初始状态与过期时间() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let report = env
        .report_api
        .create_report(create_request("前锋考察"), &user)
        .expect("创建报告失败");

    assert_eq!(report.status, ReportStatus::Pending);
    assert_eq!(report.download_count, 0);
    assert_eq!(report.generated_by, user.user_id);

    // 默认保留期 30 天
    let days = (report.expires_at - report.created_at).num_days();
    assert_eq!(days, 30);
}

#[test]
fn test_create_report_保留期取配置() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    env.settings
        .set_value(scout_hub::config::settings::KEY_REPORT_RETENTION_DAYS, "7")
        .unwrap();

    let report = env
        .report_api
        .create_report(create_request("短期报告"), &user)
        .unwrap();
    assert_eq!((report.expires_at - report.created_at).num_days(), 7);
}

#[test]
fn test_create_report_参数校验() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let mut req = create_request("坏参数");
    req.parameters_json = "not json".to_string();
    let result = env.report_api.create_report(req, &user);
    assert!(matches!(result, Err(ApiError::ValidationError(_))));

    let mut req = create_request("");
    req.title = "  ".to_string();
    let result = env.report_api.create_report(req, &user);
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
}

// ==========================================
// 状态机
// ==========================================

#[test]
fn test_生命周期_happy_path() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let report = env
        .report_api
        .create_report(create_request("前锋考察"), &user)
        .unwrap();

    let report = env.report_api.mark_generating(&report.report_id).unwrap();
    assert_eq!(report.status, ReportStatus::Generating);

    let report = env
        .report_api
        .mark_completed(&report.report_id, file_meta())
        .unwrap();
    assert_eq!(report.status, ReportStatus::Completed);
    assert_eq!(report.file_name.as_deref(), Some("r1.pdf"));
    assert!(report.generated_at.is_some());

    // 下载计数单调递增
    let info = env
        .report_api
        .record_download(&report.report_id, &user)
        .unwrap();
    assert_eq!(info.download_count, 1);
    let info = env
        .report_api
        .record_download(&report.report_id, &user)
        .unwrap();
    assert_eq!(info.download_count, 2);
    assert_eq!(info.file_name, "r1.pdf");
}

#[test]
fn test_非法状态迁移报conflict() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let report = env
        .report_api
        .create_report(create_request("报告"), &user)
        .unwrap();

    // pending 不能直接 completed
    let result = env.report_api.mark_completed(&report.report_id, file_meta());
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    env.report_api.mark_generating(&report.report_id).unwrap();

    // generating 不能重复领取
    let result = env.report_api.mark_generating(&report.report_id);
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    env.report_api
        .mark_completed(&report.report_id, file_meta())
        .unwrap();

    // completed 是终态
    let result = env.report_api.mark_generating(&report.report_id);
    assert!(matches!(result, Err(ApiError::Conflict(_))));
    let result = env.report_api.mark_failed(&report.report_id, "late failure");
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[test]
fn test_mark_failed_记录原因与重试计数() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    // worker 可以拒绝从未开始的任务（pending -> failed）
    let report = env
        .report_api
        .create_report(create_request("报告"), &user)
        .unwrap();
    let report = env
        .report_api
        .mark_failed(&report.report_id, "渲染模板缺失")
        .unwrap();
    assert_eq!(report.status, ReportStatus::Failed);
    assert_eq!(report.error_message.as_deref(), Some("渲染模板缺失"));
    assert_eq!(report.retry_count, 1);
}

// ==========================================
// 下载与过期
// ==========================================

#[test]
fn test_download_非completed状态报conflict() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let report = env
        .report_api
        .create_report(create_request("报告"), &user)
        .unwrap();

    let result = env.report_api.record_download(&report.report_id, &user);
    assert!(matches!(result, Err(ApiError::Conflict(_))));

    env.report_api.mark_generating(&report.report_id).unwrap();
    let result = env.report_api.record_download(&report.report_id, &user);
    assert!(matches!(result, Err(ApiError::Conflict(_))));
}

#[test]
fn test_completed但已过期_下载报gone() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let report = env
        .report_api
        .create_report(create_request("过期报告"), &user)
        .unwrap();
    env.report_api.mark_generating(&report.report_id).unwrap();
    env.report_api
        .mark_completed(&report.report_id, file_meta())
        .unwrap();

    // 过期时间拨到 31 天前
    set_expires_at(&env, &report.report_id, Utc::now() - Duration::days(31));

    let stored = env
        .report_repo
        .find_by_id(&report.report_id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ReportStatus::Completed);
    assert!(stored.is_expired_at(Utc::now()));
    assert_eq!(stored.display_status(Utc::now()), ReportStatus::Expired);

    // 状态仍是 completed，但过期优先报 Gone
    let result = env.report_api.record_download(&report.report_id, &user);
    assert!(matches!(result, Err(ApiError::Gone(_))));

    // 详情查询同样报 Gone（与 NotFound 区分）
    let result = env.report_api.get_report(&report.report_id, &user);
    assert!(matches!(result, Err(ApiError::Gone(_))));
}

// ==========================================
// 查询与删除
// ==========================================

#[test]
fn test_list_reports_过滤与排序() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let user = env.create_user(UserRole::Analyst);

    let r1 = env
        .report_api
        .create_report(create_request("第一份"), &user)
        .unwrap();
    let _r2 = env
        .report_api
        .create_report(create_request("第二份"), &user)
        .unwrap();
    env.report_api.mark_generating(&r1.report_id).unwrap();

    let filter = ReportFilter {
        status: Some(ReportStatus::Generating),
        ..Default::default()
    };
    let page = env
        .report_api
        .list_reports(&filter, PageRequest::default(), &user)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].report_id, r1.report_id);

    let page = env
        .report_api
        .list_reports(&ReportFilter::default(), PageRequest::default(), &user)
        .unwrap();
    assert_eq!(page.total, 2);
}

#[test]
fn test_delete_report_归属约束() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let owner = env.create_user(UserRole::Analyst);
    let other = env.create_user(UserRole::Analyst);

    let report = env
        .report_api
        .create_report(create_request("私有报告"), &owner)
        .unwrap();

    // 非所有者删除被拒（角色有 delete 权限但归属不符）
    let result = env.report_api.delete_report(&report.report_id, &other);
    assert!(matches!(result, Err(ApiError::AuthorizationError)));

    env.report_api
        .delete_report(&report.report_id, &owner)
        .expect("所有者删除失败");

    let result = env.report_api.get_report(&report.report_id, &owner);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_rbac_教练不可删除报告() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let coach_user = env.create_user(UserRole::Coach);

    let report = env
        .report_api
        .create_report(create_request("教练的报告"), &coach_user)
        .unwrap();

    // coach 角色没有 report delete 权限，即使是所有者
    let result = env.report_api.delete_report(&report.report_id, &coach_user);
    assert!(matches!(result, Err(ApiError::AuthorizationError)));
}
