use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// `?page=&per_page=` query parameters. Out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub pages: i64,
    pub current_page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: PageParams) -> Self {
        let per_page = params.per_page();
        let per_page_i64 = i64::from(per_page);
        Self {
            items,
            total,
            pages: (total + per_page_i64 - 1) / per_page_i64,
            current_page: params.page(),
            per_page,
        }
    }

    /// Paginates an already filtered, already ordered result set.
    pub fn from_vec(all: Vec<T>, params: PageParams) -> Self {
        let total = all.len() as i64;
        let items = all
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.per_page() as usize)
            .collect();
        Self::new(items, total, params)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            pages: self.pages,
            current_page: self.current_page,
            per_page: self.per_page,
        }
    }
}
