use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> AppResult<Self> {
        if page == 0 {
            return Err(AppError::InvalidInput("page must be at least 1".to_string()));
        }
        if per_page == 0 || per_page > MAX_PAGE_SIZE {
            return Err(AppError::InvalidInput(format!(
                "per_page must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    pub fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

/// One page of an ordered result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub current_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Wraps a slice that was already cut by the store (LIMIT/OFFSET)
    pub fn from_slice(items: Vec<T>, total_items: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_items,
            current_page: request.page(),
            total_pages: total_pages(total_items, request.per_page()),
        }
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::from_slice(Vec::new(), 0, request)
    }
}

/// `ceil(total_items / page_size)`
pub fn total_pages(total_items: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(per_page as u64) as u32
}

/// Cuts the requested page out of an in-memory ordered list
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total_items = items.len() as u64;
    let page_items = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.limit() as usize)
        .collect();
    Page::from_slice(page_items, total_items, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_page_request_validation() {
        assert_err!(PageRequest::new(0, 10));
        assert_err!(PageRequest::new(1, 0));
        assert_err!(PageRequest::new(1, MAX_PAGE_SIZE + 1));
        assert_ok!(PageRequest::new(3, 25));
        assert_ok!(PageRequest::new(1, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest::new(3, 10).unwrap();
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[test]
    fn test_paginate_middle_page() {
        let page = paginate((1..=25).collect::<Vec<_>>(), PageRequest::new(2, 10).unwrap());
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let page = paginate((1..=25).collect::<Vec<_>>(), PageRequest::new(3, 10).unwrap());
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_paginate_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(5, 10).unwrap());
        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 5);
        assert_eq!(page.total_pages, 1);
    }
}
