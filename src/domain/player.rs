// ==========================================
// 球探招募管理平台 - 球员领域模型
// ==========================================
// 对齐: players 表
// 说明: 球员为长期参考数据，只做软删除（is_active=false），
//       软删除后从所有默认查询中消失
// ==========================================

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Player - 球员主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,             // 球员ID
    pub name: String,                  // 常用名（必填）
    pub full_name: Option<String>,     // 全名
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub second_nationality: Option<String>,

    // ===== 身体条件 =====
    pub height_cm: Option<i64>,
    pub weight_kg: Option<i64>,
    pub preferred_foot: Option<String>, // left / right / both

    // ===== 职业信息 =====
    pub current_club: Option<String>,
    pub position: String,              // 场上位置（必填）
    pub shirt_number: Option<i64>,

    // ===== 合同与身价 =====
    pub contract_expires: Option<NaiveDate>,
    pub market_value_eur: Option<i64>, // 市场身价（欧元）
    pub weekly_wage_eur: Option<i64>,  // 周薪（欧元）
    pub agent_name: Option<String>,

    // ===== 考察信息 =====
    pub scouting_notes: Option<String>,
    pub overall_rating: Option<i64>,   // 0-100 综合评分
    pub potential_rating: Option<i64>, // 0-100 潜力评分
    pub availability_status: String,   // available / transfer_listed / ...

    // ===== 系统字段 =====
    pub created_by: Option<String>,    // 创建人
    pub is_active: bool,               // 软删除标记
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// 给定基准日的年龄（读取时派生，不落库）
    ///
    /// # 返回
    /// - Some(i32): 出生日期存在时的周岁
    /// - None: 出生日期缺失
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

    /// 身价展示文本（€1.5M / €800K / €500）
    pub fn market_value_display(&self) -> String {
        match self.market_value_eur {
            Some(v) if v >= 1_000_000 => format!("€{:.1}M", v as f64 / 1_000_000.0),
            Some(v) if v >= 1_000 => format!("€{:.0}K", v as f64 / 1_000.0),
            Some(v) => format!("€{}", v),
            None => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_player(dob: Option<NaiveDate>) -> Player {
        Player {
            player_id: "p1".to_string(),
            name: "Test Player".to_string(),
            full_name: None,
            date_of_birth: dob,
            nationality: None,
            second_nationality: None,
            height_cm: None,
            weight_kg: None,
            preferred_foot: None,
            current_club: None,
            position: "ST".to_string(),
            shirt_number: None,
            contract_expires: None,
            market_value_eur: None,
            weekly_wage_eur: None,
            agent_name: None,
            scouting_notes: None,
            overall_rating: None,
            potential_rating: None,
            availability_status: "available".to_string(),
            created_by: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_age_生日未到按未满周岁() {
        let dob = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        let player = sample_player(Some(dob));

        // 生日前一天 25 岁，生日当天 26 岁
        let before = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        let on_day = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(player.age_on(before), Some(25));
        assert_eq!(player.age_on(on_day), Some(26));
    }

    #[test]
    fn test_age_出生日期缺失() {
        let player = sample_player(None);
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(player.age_on(today), None);
    }

    #[test]
    fn test_market_value_display() {
        let mut player = sample_player(None);
        assert_eq!(player.market_value_display(), "N/A");

        player.market_value_eur = Some(25_500_000);
        assert_eq!(player.market_value_display(), "€25.5M");

        player.market_value_eur = Some(800_000);
        assert_eq!(player.market_value_display(), "€800K");

        player.market_value_eur = Some(500);
        assert_eq!(player.market_value_display(), "€500");
    }
}
