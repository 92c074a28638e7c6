// ==========================================
// 球探招募管理平台 - 教练领域模型
// ==========================================
// 对齐: coaches 表
// 软删除语义与球员一致
// ==========================================

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Coach - 教练主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coach {
    pub coach_id: String,              // 教练ID
    pub name: String,                  // 常用名（必填）
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,

    // ===== 职业信息 =====
    pub current_club: Option<String>,
    pub current_role: Option<String>,  // head_coach / assistant / youth_coach
    pub coaching_level: Option<String>, // amateur / semi_pro / professional / elite
    pub years_experience: Option<i64>,

    // ===== 合同与薪资 =====
    pub contract_expires: Option<NaiveDate>,
    pub estimated_salary_eur: Option<i64>, // 年薪（欧元）

    // ===== 战术信息 =====
    pub preferred_formation: Option<String>, // 4-3-3 / 4-2-3-1 / ...
    pub leadership_style: Option<String>,

    // ===== 考察信息 =====
    pub scouting_notes: Option<String>,
    pub overall_rating: Option<i64>,   // 0-100 综合评分
    pub availability_status: String,   // available / under_contract / ...

    // ===== 系统字段 =====
    pub created_by: Option<String>,
    pub is_active: bool,               // 软删除标记
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coach {
    /// 给定基准日的年龄（读取时派生）
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.date_of_birth.map(|dob| {
            let mut age = today.year() - dob.year();
            if (today.month(), today.day()) < (dob.month(), dob.day()) {
                age -= 1;
            }
            age
        })
    }

    /// 展示名，优先全名
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }
}
