// ==========================================
// 球探招募管理平台 - 引擎层
// ==========================================
// 职责: 业务规则计算（纯函数，不做数据访问）
// ==========================================

pub mod similarity;

// 重导出核心类型
pub use similarity::SimilarityEngine;
