// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, Utc};

use scout_hub::domain::coach::Coach;
use scout_hub::domain::player::Player;

// ==========================================
// Player 构建器
// ==========================================

pub struct PlayerBuilder {
    player_id: String,
    name: String,
    position: String,
    current_club: Option<String>,
    nationality: Option<String>,
    date_of_birth: Option<NaiveDate>,
    market_value_eur: Option<i64>,
    overall_rating: Option<i64>,
    is_active: bool,
}

impl PlayerBuilder {
    pub fn new(player_id: &str, name: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            name: name.to_string(),
            position: "ST".to_string(),
            current_club: None,
            nationality: None,
            date_of_birth: None,
            market_value_eur: None,
            overall_rating: None,
            is_active: true,
        }
    }

    pub fn position(mut self, position: &str) -> Self {
        self.position = position.to_string();
        self
    }

    pub fn club(mut self, club: &str) -> Self {
        self.current_club = Some(club.to_string());
        self
    }

    pub fn nationality(mut self, nationality: &str) -> Self {
        self.nationality = Some(nationality.to_string());
        self
    }

    pub fn born(mut self, year: i32, month: u32, day: u32) -> Self {
        self.date_of_birth = NaiveDate::from_ymd_opt(year, month, day);
        self
    }

    pub fn market_value(mut self, value: i64) -> Self {
        self.market_value_eur = Some(value);
        self
    }

    pub fn rating(mut self, rating: i64) -> Self {
        self.overall_rating = Some(rating);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> Player {
        Player {
            player_id: self.player_id,
            name: self.name,
            full_name: None,
            date_of_birth: self.date_of_birth,
            nationality: self.nationality,
            second_nationality: None,
            height_cm: None,
            weight_kg: None,
            preferred_foot: None,
            current_club: self.current_club,
            position: self.position,
            shirt_number: None,
            contract_expires: None,
            market_value_eur: self.market_value_eur,
            weekly_wage_eur: None,
            agent_name: None,
            scouting_notes: None,
            overall_rating: self.overall_rating,
            potential_rating: None,
            availability_status: "available".to_string(),
            created_by: None,
            is_active: self.is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

// ==========================================
// Coach 构建器
// ==========================================

pub struct CoachBuilder {
    coach_id: String,
    name: String,
    current_club: Option<String>,
    current_role: Option<String>,
    preferred_formation: Option<String>,
    is_active: bool,
}

impl CoachBuilder {
    pub fn new(coach_id: &str, name: &str) -> Self {
        Self {
            coach_id: coach_id.to_string(),
            name: name.to_string(),
            current_club: None,
            current_role: Some("head_coach".to_string()),
            preferred_formation: Some("4-3-3".to_string()),
            is_active: true,
        }
    }

    pub fn club(mut self, club: &str) -> Self {
        self.current_club = Some(club.to_string());
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.current_role = Some(role.to_string());
        self
    }

    pub fn formation(mut self, formation: &str) -> Self {
        self.preferred_formation = Some(formation.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn build(self) -> Coach {
        Coach {
            coach_id: self.coach_id,
            name: self.name,
            full_name: None,
            date_of_birth: None,
            nationality: None,
            current_club: self.current_club,
            current_role: self.current_role,
            coaching_level: None,
            years_experience: None,
            contract_expires: None,
            estimated_salary_eur: None,
            preferred_formation: self.preferred_formation,
            leadership_style: None,
            scouting_notes: None,
            overall_rating: None,
            availability_status: "available".to_string(),
            created_by: None,
            is_active: self.is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
