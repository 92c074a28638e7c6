// ==========================================
// 球探招募管理平台 - 相似度匹配引擎
// ==========================================
// 职责: 基于领域规则的确定性相似排序（非机器学习）
// 红线: 纯函数，候选池由调用方按目录插入顺序提供
// ==========================================

use chrono::NaiveDate;

use crate::domain::coach::Coach;
use crate::domain::player::Player;

/// 球员年龄窗口（±年）
pub const AGE_WINDOW_YEARS: i32 = 3;

/// 球员身价窗口下限倍率
pub const VALUE_WINDOW_LOWER: f64 = 0.5;

/// 球员身价窗口上限倍率
pub const VALUE_WINDOW_UPPER: f64 = 1.5;

// ==========================================
// SimilarityEngine - 相似度匹配引擎
// ==========================================

/// 相似度匹配引擎
///
/// 规则（球员）：
/// 1. 排除目标自身与已软删除的球员
/// 2. 只保留同场上位置
/// 3. 目标有出生日期时，年龄差超过 3 年的剔除
/// 4. 目标有身价时，身价落在 [0.5x, 1.5x] 之外的剔除
/// 5. 按与目标身价的绝对差升序，平局保持目录插入顺序
///
/// 目标缺失某个对比字段时整体跳过该级过滤，而不是清空候选。
pub struct SimilarityEngine;

impl SimilarityEngine {
    pub fn new() -> Self {
        Self
    }

    /// 查找相似球员
    ///
    /// # 参数
    /// - target: 目标球员
    /// - pool: 候选池（目录插入顺序）
    /// - limit: 返回数量上限
    /// - today: 年龄计算基准日
    ///
    /// # 返回
    /// - 相似球员列表（不含目标自身，不含已软删除球员）
    pub fn find_similar_players(
        &self,
        target: &Player,
        pool: &[Player],
        limit: usize,
        today: NaiveDate,
    ) -> Vec<Player> {
        let target_age = target.age_on(today);

        let mut candidates: Vec<Player> = pool
            .iter()
            .filter(|p| p.player_id != target.player_id)
            .filter(|p| p.is_active)
            .filter(|p| p.position == target.position)
            .filter(|p| {
                // 年龄窗口: 目标无出生日期时跳过本级过滤；
                // 目标有而候选无时按窗口外处理（与存储层 NULL 语义一致）
                match target_age {
                    None => true,
                    Some(t_age) => match p.age_on(today) {
                        Some(c_age) => (c_age - t_age).abs() <= AGE_WINDOW_YEARS,
                        None => false,
                    },
                }
            })
            .filter(|p| {
                // 身价窗口: [0.5x, 1.5x]
                match target.market_value_eur {
                    None => true,
                    Some(t_value) => match p.market_value_eur {
                        Some(c_value) => {
                            let lower = t_value as f64 * VALUE_WINDOW_LOWER;
                            let upper = t_value as f64 * VALUE_WINDOW_UPPER;
                            c_value as f64 >= lower && c_value as f64 <= upper
                        }
                        None => false,
                    },
                }
            })
            .cloned()
            .collect();

        // 按身价差升序；稳定排序保证平局保持插入顺序。
        // 目标无身价时不排序，直接保持插入顺序。
        if let Some(t_value) = target.market_value_eur {
            candidates.sort_by_key(|p| {
                // 候选无身价的分支在窗口过滤后不可达，兜底排最后
                p.market_value_eur
                    .map(|v| (v - t_value).abs())
                    .unwrap_or(i64::MAX)
            });
        }

        candidates.truncate(limit);
        candidates
    }

    /// 查找相似教练
    ///
    /// # 规则
    /// - 排除目标自身与已软删除的教练
    /// - 同执教角色且同惯用阵型（双方皆缺失视为相同）
    /// - 不做进一步排序，保持目录插入顺序
    pub fn find_similar_coaches(&self, target: &Coach, pool: &[Coach], limit: usize) -> Vec<Coach> {
        let mut candidates: Vec<Coach> = pool
            .iter()
            .filter(|c| c.coach_id != target.coach_id)
            .filter(|c| c.is_active)
            .filter(|c| c.current_role == target.current_role)
            .filter(|c| c.preferred_formation == target.preferred_formation)
            .cloned()
            .collect();

        candidates.truncate(limit);
        candidates
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}
