use serde::{Deserialize, Serialize};

/// 分页请求（页码从1开始）
///
/// 构造时保证 `page >= 1`、`per_page >= 1`；上限由各入口通过 [`PerPageBounds`] 约束。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// 以0为起点的页下标
    pub fn page_index(&self) -> u64 {
        self.page - 1
    }
}

/// 每页条数的默认值与上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerPageBounds {
    pub default: u64,
    pub max: u64,
}

impl PerPageBounds {
    pub const POSTS: PerPageBounds = PerPageBounds { default: 10, max: 50 };
    pub const COMMENTS: PerPageBounds = PerPageBounds { default: 20, max: 100 };
    pub const USERS: PerPageBounds = PerPageBounds { default: 20, max: 100 };

    /// 将调用方提供的分页参数约束到合法范围
    pub fn clamp(&self, page: Option<u64>, per_page: Option<u64>) -> PageRequest {
        let per_page = per_page.unwrap_or(self.default).min(self.max);
        PageRequest::new(page.unwrap_or(1), per_page)
    }
}

/// 分页结果
///
/// 页码越界时 `items` 为空，但 `total`/`pages` 仍反映完整结果集。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
    pub per_page: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let pages = total.div_ceil(request.per_page);
        Self {
            items,
            total,
            pages,
            current_page: request.page,
            per_page: request.per_page,
            has_next: request.page < pages,
            has_prev: request.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_floor() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 1);
        assert_eq!(request.page_index(), 0);

        let request = PageRequest::new(3, 10);
        assert_eq!(request.page_index(), 2);
    }

    #[test]
    fn test_bounds_clamp() {
        let request = PerPageBounds::POSTS.clamp(None, Some(500));
        assert_eq!(request.per_page, 50);
        assert_eq!(request.page, 1);

        let request = PerPageBounds::COMMENTS.clamp(Some(2), None);
        assert_eq!(request.per_page, 20);
        assert_eq!(request.page, 2);

        let request = PerPageBounds::USERS.clamp(Some(1), Some(1000));
        assert_eq!(request.per_page, 100);
    }

    #[test]
    fn test_page_out_of_range() {
        let page: Page<i32> = Page::new(Vec::new(), 3, PageRequest::new(100, 2));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.pages, 2);
        assert_eq!(page.current_page, 100);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_page_navigation_flags() {
        let page = Page::new(vec![1, 2], 5, PageRequest::new(1, 2));
        assert_eq!(page.pages, 3);
        assert!(page.has_next);
        assert!(!page.has_prev);

        let empty: Page<i32> = Page::new(Vec::new(), 0, PageRequest::new(1, 10));
        assert_eq!(empty.pages, 0);
        assert!(!empty.has_next);
    }
}
