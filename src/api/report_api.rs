// ==========================================
// 球探招募管理平台 - 报告 API（生命周期跟踪器）
// ==========================================
// 职责: 报告状态机 pending -> generating -> completed | failed
// 说明: 实际渲染由外部 worker 执行并回报结果；
//       expired 为读取时派生状态（completed 且过期），不落库
// 红线: 非法状态迁移一律 Conflict；过期资源一律 Gone
// ==========================================

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::types::{PageRequest, Paginated};
use crate::auth::permissions::{self, Action, Resource};
use crate::config::settings::SettingsManager;
use crate::domain::activity_log::ActivityLog;
use crate::domain::report::{Report, ReportFileMeta};
use crate::domain::types::{ReportStatus, ReportType, UserRole};
use crate::domain::user::User;
use crate::repository::activity_log_repo::ActivityLogRepository;
use crate::repository::report_repo::{ReportFilter, ReportRepository};

// ==========================================
// 请求/响应 DTO
// ==========================================

/// 报告创建请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCreateRequest {
    pub title: String,
    pub report_type: ReportType,
    pub parameters_json: String,       // 报告参数 (JSON)
    pub filters_json: Option<String>,  // 应用的过滤条件 (JSON)
}

/// 下载回执
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInfo {
    pub file_path: String,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub download_count: i64,
}

// ==========================================
// ReportApi - 报告 API
// ==========================================
pub struct ReportApi {
    report_repo: Arc<ReportRepository>,
    activity_log_repo: Arc<ActivityLogRepository>,
    settings: Arc<SettingsManager>,
}

impl ReportApi {
    pub fn new(
        report_repo: Arc<ReportRepository>,
        activity_log_repo: Arc<ActivityLogRepository>,
        settings: Arc<SettingsManager>,
    ) -> Self {
        Self {
            report_repo,
            activity_log_repo,
            settings,
        }
    }

    fn log_activity(&self, log: ActivityLog) {
        if let Err(e) = self.activity_log_repo.insert(&log) {
            warn!(error = %e, "记录操作日志失败");
        }
    }

    fn find_report(&self, report_id: &str) -> ApiResult<Report> {
        self.report_repo
            .find_by_id(report_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Report(id={})不存在", report_id)))
    }

    /// 报告写操作仅限生成者或管理员
    fn ensure_owner(report: &Report, current_user: &User) -> ApiResult<()> {
        if current_user.role == UserRole::Admin || report.generated_by == current_user.user_id {
            Ok(())
        } else {
            Err(ApiError::AuthorizationError)
        }
    }

    /// 非法状态迁移统一报 Conflict
    fn reject_transition(report: &Report, target: ReportStatus) -> ApiError {
        ApiError::Conflict(format!(
            "报告状态不允许该操作: current={}, target={}",
            report.status, target
        ))
    }

    // ==========================================
    // 生命周期操作
    // ==========================================

    /// 创建报告（初始状态 pending，过期时间 = 创建时间 + 保留天数）
    pub fn create_report(
        &self,
        req: ReportCreateRequest,
        current_user: &User,
    ) -> ApiResult<Report> {
        permissions::require(current_user.role, Resource::Report, Action::Create)?;

        if req.title.trim().is_empty() {
            return Err(ApiError::ValidationError("报告标题不能为空".to_string()));
        }
        if serde_json::from_str::<serde_json::Value>(&req.parameters_json).is_err() {
            return Err(ApiError::ValidationError(
                "parameters_json 不是合法的JSON".to_string(),
            ));
        }

        let now = Utc::now();
        let retention_days = self.settings.report_retention_days()?;
        let report = Report {
            report_id: uuid::Uuid::new_v4().to_string(),
            title: req.title,
            report_type: req.report_type,
            parameters_json: req.parameters_json,
            filters_json: req.filters_json,
            status: ReportStatus::Pending,
            file_path: None,
            file_name: None,
            file_size: None,
            file_format: "pdf".to_string(),
            page_count: None,
            generated_by: current_user.user_id.clone(),
            generated_at: None,
            expires_at: now + Duration::days(retention_days),
            download_count: 0,
            last_downloaded_at: None,
            error_message: None,
            retry_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.report_repo.insert(&report)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "report_created",
                "report",
                Some(report.report_id.clone()),
            )
            .with_resource_name(report.title.clone()),
        );

        Ok(report)
    }

    /// 外部 worker 领取任务: pending -> generating
    pub fn mark_generating(&self, report_id: &str) -> ApiResult<Report> {
        let mut report = self.find_report(report_id)?;

        if !report.can_transition_to(ReportStatus::Generating) {
            return Err(Self::reject_transition(&report, ReportStatus::Generating));
        }

        report.status = ReportStatus::Generating;
        report.updated_at = Utc::now();
        self.report_repo.update(&report)?;

        info!(report_id = %report_id, "报告开始生成");
        Ok(report)
    }

    /// 外部 worker 回报完成: generating -> completed，回填文件元数据
    pub fn mark_completed(&self, report_id: &str, file_meta: ReportFileMeta) -> ApiResult<Report> {
        let mut report = self.find_report(report_id)?;

        if !report.can_transition_to(ReportStatus::Completed) {
            return Err(Self::reject_transition(&report, ReportStatus::Completed));
        }

        let now = Utc::now();
        report.status = ReportStatus::Completed;
        report.file_path = Some(file_meta.file_path);
        report.file_name = Some(file_meta.file_name);
        report.file_size = Some(file_meta.file_size);
        report.file_format = file_meta.file_format;
        report.page_count = file_meta.page_count;
        report.generated_at = Some(now);
        report.updated_at = now;
        self.report_repo.update(&report)?;

        info!(report_id = %report_id, "报告生成完成");
        Ok(report)
    }

    /// 外部 worker 回报失败: pending | generating -> failed
    ///
    /// pending 也可直接失败（worker 可拒绝从未开始的任务）
    pub fn mark_failed(&self, report_id: &str, error_message: &str) -> ApiResult<Report> {
        let mut report = self.find_report(report_id)?;

        if !report.can_transition_to(ReportStatus::Failed) {
            return Err(Self::reject_transition(&report, ReportStatus::Failed));
        }

        report.status = ReportStatus::Failed;
        report.error_message = Some(error_message.to_string());
        report.retry_count += 1;
        report.updated_at = Utc::now();
        self.report_repo.update(&report)?;

        warn!(report_id = %report_id, error = %error_message, "报告生成失败");
        Ok(report)
    }

    /// 记录一次下载
    ///
    /// # 错误
    /// - Conflict: 状态不是 completed
    /// - Gone: 报告已过期（即使状态是 completed）
    pub fn record_download(&self, report_id: &str, current_user: &User) -> ApiResult<DownloadInfo> {
        permissions::require(current_user.role, Resource::Report, Action::Read)?;

        let mut report = self.find_report(report_id)?;

        if report.status != ReportStatus::Completed {
            return Err(ApiError::Conflict(format!(
                "报告尚不可下载: status={}",
                report.status
            )));
        }

        let now = Utc::now();
        if report.is_expired_at(now) {
            return Err(ApiError::Gone(format!("Report(id={})已过期", report_id)));
        }

        report.download_count += 1;
        report.last_downloaded_at = Some(now);
        report.updated_at = now;
        self.report_repo.update(&report)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "report_downloaded",
                "report",
                Some(report.report_id.clone()),
            )
            .with_details(&serde_json::json!({ "download_count": report.download_count })),
        );

        Ok(DownloadInfo {
            file_path: report.file_path.clone().unwrap_or_default(),
            file_name: report.file_name.clone().unwrap_or_default(),
            file_size: report.file_size,
            download_count: report.download_count,
        })
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 查询报告详情（过期报告报 Gone，与 NotFound 区分）
    pub fn get_report(&self, report_id: &str, current_user: &User) -> ApiResult<Report> {
        permissions::require(current_user.role, Resource::Report, Action::Read)?;

        let report = self.find_report(report_id)?;
        if report.is_expired_at(Utc::now()) {
            return Err(ApiError::Gone(format!("Report(id={})已过期", report_id)));
        }
        Ok(report)
    }

    /// 查询报告列表（新报告在前，分页）
    pub fn list_reports(
        &self,
        filter: &ReportFilter,
        page: PageRequest,
        current_user: &User,
    ) -> ApiResult<Paginated<Report>> {
        permissions::require(current_user.role, Resource::Report, Action::Read)?;

        let page = page.clamped();
        let total = self.report_repo.count(filter)?;
        let reports = self.report_repo.list(filter, page.limit, page.offset)?;

        Ok(Paginated::new(reports, page, total))
    }

    /// 删除报告（硬删除，生命周期终点之一）
    pub fn delete_report(&self, report_id: &str, current_user: &User) -> ApiResult<()> {
        permissions::require(current_user.role, Resource::Report, Action::Delete)?;

        let report = self.find_report(report_id)?;
        Self::ensure_owner(&report, current_user)?;

        self.report_repo.delete(report_id)?;

        self.log_activity(
            ActivityLog::record(
                Some(current_user.user_id.clone()),
                "report_deleted",
                "report",
                Some(report_id.to_string()),
            )
            .with_resource_name(report.title),
        );

        Ok(())
    }
}
