// ==========================================
// 球探招募管理平台 - 报告仓储
// ==========================================
// 职责: 管理 reports 表的数据访问
// 说明: 报告文件本体由外部存储负责，这里只存元数据与状态
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row};

use crate::db::open_sqlite_connection;
use crate::domain::report::Report;
use crate::domain::types::{ReportStatus, ReportType};
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// ReportFilter - 报告查询过滤条件
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
    pub generated_by: Option<String>,
}

fn column_error(msg: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::<dyn std::error::Error + Send + Sync>::from(msg.to_string()),
    )
}

// ==========================================
// ReportRepository - 报告仓储
// ==========================================
pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    const COLUMNS: &'static str = r#"
        report_id, title, report_type, parameters_json, filters_json, status,
        file_path, file_name, file_size, file_format, page_count,
        generated_by, generated_at, expires_at, download_count,
        last_downloaded_at, error_message, retry_count, created_at, updated_at
    "#;

    fn row_to_report(row: &Row<'_>) -> rusqlite::Result<Report> {
        let report_type: String = row.get(2)?;
        let status: String = row.get(5)?;
        Ok(Report {
            report_id: row.get(0)?,
            title: row.get(1)?,
            report_type: ReportType::from_str(&report_type)
                .ok_or_else(|| column_error("非法的 report_type 列值"))?,
            parameters_json: row.get(3)?,
            filters_json: row.get(4)?,
            status: ReportStatus::from_str(&status)
                .ok_or_else(|| column_error("非法的 status 列值"))?,
            file_path: row.get(6)?,
            file_name: row.get(7)?,
            file_size: row.get(8)?,
            file_format: row.get(9)?,
            page_count: row.get(10)?,
            generated_by: row.get(11)?,
            generated_at: row.get(12)?,
            expires_at: row.get(13)?,
            download_count: row.get(14)?,
            last_downloaded_at: row.get(15)?,
            error_message: row.get(16)?,
            retry_count: row.get(17)?,
            created_at: row.get(18)?,
            updated_at: row.get(19)?,
        })
    }

    /// 插入报告
    pub fn insert(&self, report: &Report) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO reports (
                report_id, title, report_type, parameters_json, filters_json, status,
                file_path, file_name, file_size, file_format, page_count,
                generated_by, generated_at, expires_at, download_count,
                last_downloaded_at, error_message, retry_count, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
            )
            "#,
            params![
                report.report_id,
                report.title,
                report.report_type.as_str(),
                report.parameters_json,
                report.filters_json,
                report.status.as_str(),
                report.file_path,
                report.file_name,
                report.file_size,
                report.file_format,
                report.page_count,
                report.generated_by,
                report.generated_at,
                report.expires_at,
                report.download_count,
                report.last_downloaded_at,
                report.error_message,
                report.retry_count,
                report.created_at,
                report.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询
    pub fn find_by_id(&self, report_id: &str) -> RepositoryResult<Option<Report>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM reports WHERE report_id = ?1", Self::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        match stmt.query_row(params![report_id], Self::row_to_report) {
            Ok(report) => Ok(Some(report)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 过滤/分页查询（新报告在前）
    pub fn list(
        &self,
        filter: &ReportFilter,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<Report>> {
        let (where_clause, mut values) = Self::build_filter(filter);

        values.push(Box::new(limit));
        let limit_idx = values.len();
        values.push(Box::new(offset));
        let offset_idx = values.len();

        let sql = format!(
            "SELECT {} FROM reports WHERE {} ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            Self::COLUMNS,
            where_clause,
            limit_idx,
            offset_idx,
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt.query_map(&param_refs[..], Self::row_to_report)?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?);
        }
        Ok(reports)
    }

    /// 满足过滤条件的总数
    pub fn count(&self, filter: &ReportFilter) -> RepositoryResult<i64> {
        let (where_clause, values) = Self::build_filter(filter);
        let sql = format!("SELECT COUNT(*) FROM reports WHERE {}", where_clause);

        let conn = self.get_conn()?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let count = conn.query_row(&sql, &param_refs[..], |row| row.get(0))?;
        Ok(count)
    }

    fn build_filter(filter: &ReportFilter) -> (String, Vec<Box<dyn ToSql>>) {
        let mut conditions = vec!["1 = 1".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(report_type) = filter.report_type {
            values.push(Box::new(report_type.as_str()));
            conditions.push(format!("report_type = ?{}", values.len()));
        }
        if let Some(status) = filter.status {
            values.push(Box::new(status.as_str()));
            conditions.push(format!("status = ?{}", values.len()));
        }
        if let Some(ref generated_by) = filter.generated_by {
            values.push(Box::new(generated_by.clone()));
            conditions.push(format!("generated_by = ?{}", values.len()));
        }

        (conditions.join(" AND "), values)
    }

    /// 整行更新（状态迁移、文件回填、下载计数）
    pub fn update(&self, report: &Report) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE reports SET
                status = ?2, file_path = ?3, file_name = ?4, file_size = ?5,
                file_format = ?6, page_count = ?7, generated_at = ?8,
                download_count = ?9, last_downloaded_at = ?10,
                error_message = ?11, retry_count = ?12, updated_at = ?13
            WHERE report_id = ?1
            "#,
            params![
                report.report_id,
                report.status.as_str(),
                report.file_path,
                report.file_name,
                report.file_size,
                report.file_format,
                report.page_count,
                report.generated_at,
                report.download_count,
                report.last_downloaded_at,
                report.error_message,
                report.retry_count,
                report.updated_at,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Report".to_string(),
                id: report.report_id.clone(),
            });
        }
        Ok(())
    }

    /// 硬删除报告（显式删除是报告生命周期的终点之一）
    pub fn delete(&self, report_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM reports WHERE report_id = ?1", params![report_id])?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Report".to_string(),
                id: report_id.to_string(),
            });
        }
        Ok(())
    }
}
