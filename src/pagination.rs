//! Page-of-results retrieval shared by every feed.
//!
//! Page numbers are 1-based. A missing or malformed page number means the
//! first page, numbers below one clamp to the first page and numbers past
//! the end clamp to the last one. An empty collection still has one (empty)
//! page.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: i64,
}

/// Where a page sits inside a collection of `count` entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<i64>,
    pub previous_page_number: Option<i64>,
}

/// Parses the raw `page` query value. Anything that is not an integer is page 1.
/// Integers too large for `i64` saturate, so they still clamp to the last
/// (or first) page.
pub fn parse_page_number(raw: Option<&str>) -> i64 {
    let value = match raw {
        Some(value) => value.trim(),
        None => return 1,
    };
    if let Ok(number) = value.parse::<i64>() {
        return number;
    }
    let (negative, digits) = match value.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 1;
    }
    if negative {
        i64::MIN
    } else {
        i64::MAX
    }
}

impl Paginator {
    /// Page sizes below one are treated as one.
    pub fn new(page_size: i64) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn num_pages(&self, count: i64) -> i64 {
        if count <= 0 {
            1
        } else {
            (count + self.page_size - 1) / self.page_size
        }
    }

    pub fn window(&self, count: i64, requested: i64) -> PageWindow {
        let count = count.max(0);
        let num_pages = self.num_pages(count);
        let number = requested.clamp(1, num_pages);
        PageWindow {
            number,
            num_pages,
            count,
            offset: (number - 1) * self.page_size,
            limit: self.page_size,
        }
    }

    /// Slices an in-memory collection.
    pub fn page<T>(&self, items: Vec<T>, requested: Option<&str>) -> Page<T> {
        let window = self.window(items.len() as i64, parse_page_number(requested));
        let items = items
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect();
        Page::new(items, window)
    }
}

impl<T> Page<T> {
    /// Wraps items already fetched for `window`, e.g. by a LIMIT/OFFSET query.
    pub fn new(object_list: Vec<T>, window: PageWindow) -> Self {
        let has_next = window.number < window.num_pages;
        let has_previous = window.number > 1;
        Self {
            object_list,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(window.number + 1),
            previous_page_number: has_previous.then_some(window.number - 1),
        }
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
        }
    }
}
