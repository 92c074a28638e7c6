// ==========================================
// 球探招募管理平台 - API 层通用 DTO
// ==========================================
// 职责: 分页请求/响应的统一形态
// ==========================================

use serde::{Deserialize, Serialize};

/// 单页条数上限
pub const MAX_PAGE_SIZE: i64 = 100;

/// 单页条数默认值
pub const DEFAULT_PAGE_SIZE: i64 = 20;

// ==========================================
// PageRequest - 分页请求
// ==========================================
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: i64,  // 单页条数
    pub offset: i64, // 跳过条数
}

impl PageRequest {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// 钳制到合法区间: limit ∈ [1, 100]，offset >= 0
    pub fn clamped(&self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.max(0),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

// ==========================================
// Paginated - 分页响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,        // 当前页（从1开始）
    pub per_page: i64,    // 单页条数
    pub total: i64,       // 总条数
    pub total_pages: i64, // 总页数
}

impl<T> Paginated<T> {
    /// 由查询结果与总数组装分页响应
    pub fn new(items: Vec<T>, page_req: PageRequest, total: i64) -> Self {
        let page_req = page_req.clamped();
        let total_pages = (total + page_req.limit - 1) / page_req.limit;
        let page = page_req.offset / page_req.limit + 1;
        Self {
            items,
            page,
            per_page: page_req.limit,
            total,
            total_pages,
        }
    }
}
