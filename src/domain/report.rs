// ==========================================
// 球探招募管理平台 - 报告领域模型
// ==========================================
// 对齐: reports 表
// 状态机: pending -> generating -> completed | failed
// expired 为读取时派生状态（completed 且 expires_at 已过），不落库
// 实际渲染由外部 worker 完成，本模型只跟踪状态
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{ReportStatus, ReportType};

// ==========================================
// Report - 生成的报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,             // 报告ID
    pub title: String,                 // 标题
    pub report_type: ReportType,

    // ===== 生成配置 =====
    pub parameters_json: String,       // 报告参数 (JSON，必填)
    pub filters_json: Option<String>,  // 应用的过滤条件 (JSON)

    // ===== 生成状态 =====
    pub status: ReportStatus,

    // ===== 文件信息（completed 后填充） =====
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,        // 字节
    pub file_format: String,           // pdf / xlsx / csv
    pub page_count: Option<i64>,

    // ===== 归属与生命周期 =====
    pub generated_by: String,          // 所有者
    pub generated_at: Option<DateTime<Utc>>, // 完成时间
    pub expires_at: DateTime<Utc>,     // 创建时设定（创建时间+保留期）
    pub download_count: i64,           // 单调递增
    pub last_downloaded_at: Option<DateTime<Utc>>,

    // ===== 失败信息 =====
    pub error_message: Option<String>,
    pub retry_count: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// ReportFileMeta - 完成时回填的文件元数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFileMeta {
    pub file_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_format: String,
    pub page_count: Option<i64>,
}

impl Report {
    /// 给定时刻是否已过期（读取时派生）
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// 展示用状态: completed 且已过期时显示为 expired
    pub fn display_status(&self, now: DateTime<Utc>) -> ReportStatus {
        if self.status == ReportStatus::Completed && self.is_expired_at(now) {
            ReportStatus::Expired
        } else {
            self.status
        }
    }

    /// 状态迁移是否合法
    ///
    /// # 迁移表
    /// - pending -> generating | failed
    /// - generating -> completed | failed
    /// - completed / failed: 无出边（expired 为派生状态，不经由迁移）
    pub fn can_transition_to(&self, target: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self.status, target),
            (Pending, Generating) | (Pending, Failed) | (Generating, Completed) | (Generating, Failed)
        )
    }

    /// 文件大小展示文本
    pub fn file_size_display(&self) -> String {
        const KB: i64 = 1024;
        const MB: i64 = 1024 * KB;
        const GB: i64 = 1024 * MB;
        match self.file_size {
            Some(size) if size >= GB => format!("{:.1} GB", size as f64 / GB as f64),
            Some(size) if size >= MB => format!("{:.1} MB", size as f64 / MB as f64),
            Some(size) if size >= KB => format!("{:.1} KB", size as f64 / KB as f64),
            Some(size) => format!("{} bytes", size),
            None => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_report(status: ReportStatus, expires_at: DateTime<Utc>) -> Report {
        Report {
            report_id: "r1".to_string(),
            title: "前锋考察报告".to_string(),
            report_type: ReportType::PlayerScout,
            parameters_json: "{}".to_string(),
            filters_json: None,
            status,
            file_path: None,
            file_name: None,
            file_size: None,
            file_format: "pdf".to_string(),
            page_count: None,
            generated_by: "u1".to_string(),
            generated_at: None,
            expires_at,
            download_count: 0,
            last_downloaded_at: None,
            error_message: None,
            retry_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_expired_at() {
        let now = Utc::now();
        let report = sample_report(ReportStatus::Completed, now - Duration::days(31));
        assert!(report.is_expired_at(now));

        let report = sample_report(ReportStatus::Completed, now + Duration::days(1));
        assert!(!report.is_expired_at(now));
    }

    #[test]
    fn test_display_status_过期派生() {
        let now = Utc::now();

        // completed 且过期 -> expired
        let report = sample_report(ReportStatus::Completed, now - Duration::days(1));
        assert_eq!(report.display_status(now), ReportStatus::Expired);

        // 非 completed 不派生 expired
        let report = sample_report(ReportStatus::Failed, now - Duration::days(1));
        assert_eq!(report.display_status(now), ReportStatus::Failed);
    }

    #[test]
    fn test_迁移表() {
        let now = Utc::now();
        let pending = sample_report(ReportStatus::Pending, now);
        assert!(pending.can_transition_to(ReportStatus::Generating));
        assert!(pending.can_transition_to(ReportStatus::Failed));
        assert!(!pending.can_transition_to(ReportStatus::Completed));

        let generating = sample_report(ReportStatus::Generating, now);
        assert!(generating.can_transition_to(ReportStatus::Completed));
        assert!(generating.can_transition_to(ReportStatus::Failed));
        assert!(!generating.can_transition_to(ReportStatus::Pending));

        let completed = sample_report(ReportStatus::Completed, now);
        assert!(!completed.can_transition_to(ReportStatus::Generating));
        assert!(!completed.can_transition_to(ReportStatus::Failed));
    }

    #[test]
    fn test_file_size_display() {
        let now = Utc::now();
        let mut report = sample_report(ReportStatus::Completed, now);
        assert_eq!(report.file_size_display(), "N/A");

        report.file_size = Some(512);
        assert_eq!(report.file_size_display(), "512 bytes");

        report.file_size = Some(2 * 1024 * 1024);
        assert_eq!(report.file_size_display(), "2.0 MB");
    }
}
