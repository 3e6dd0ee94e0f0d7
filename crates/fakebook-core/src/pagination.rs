//! Cursor pagination keyed on creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound for any page.
pub const MAX_PAGE_SIZE: u16 = 100;
/// Default page size for post feeds.
pub const DEFAULT_POST_PAGE_SIZE: u16 = 10;
/// Default page size for comment listings.
pub const DEFAULT_COMMENT_PAGE_SIZE: u16 = 5;

/// Page request: items strictly older than `before`, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub before: Option<DateTime<Utc>>,
    pub limit: u16,
}

impl PageRequest {
    /// Build a request, falling back to `default_limit` and clamping to `1..=MAX_PAGE_SIZE`.
    pub fn new(before: Option<DateTime<Utc>>, limit: Option<u16>, default_limit: u16) -> Self {
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        Self { before, limit }
    }

    pub fn posts(before: Option<DateTime<Utc>>, limit: Option<u16>) -> Self {
        Self::new(before, limit, DEFAULT_POST_PAGE_SIZE)
    }

    pub fn comments(before: Option<DateTime<Utc>>, limit: Option<u16>) -> Self {
        Self::new(before, limit, DEFAULT_COMMENT_PAGE_SIZE)
    }

    /// Whether an item created at `created_at` falls inside this page window.
    pub fn admits(&self, created_at: DateTime<Utc>) -> bool {
        self.before.is_none_or(|before| created_at < before)
    }
}

/// One page of items plus the cursor for the next one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next: Option<DateTime<Utc>>,
}

impl<T> CursorPage<T> {
    /// Build a page from newest-first items; the cursor is the oldest timestamp.
    pub fn from_items(items: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Self {
        let next = items.last().map(created_at);
        Self { items, next }
    }

    /// Replace items while keeping the cursor computed from the source rows.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> CursorPage<U> {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            next: self.next,
        }
    }

    pub fn with_items<U>(self, items: Vec<U>) -> CursorPage<U> {
        CursorPage {
            items,
            next: self.next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(PageRequest::posts(None, None).limit, 10);
        assert_eq!(PageRequest::comments(None, None).limit, 5);
        assert_eq!(PageRequest::posts(None, Some(0)).limit, 1);
        assert_eq!(PageRequest::posts(None, Some(5000)).limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_before_is_exclusive() {
        let now = Utc::now();
        let page = PageRequest::posts(Some(now), None);

        assert!(page.admits(now - TimeDelta::seconds(1)));
        assert!(!page.admits(now));
        assert!(PageRequest::posts(None, None).admits(now));
    }

    #[test]
    fn test_next_cursor_is_oldest_item() {
        let now = Utc::now();
        let older = now - TimeDelta::minutes(5);
        let page = CursorPage::from_items(vec![now, older], |t| *t);

        assert_eq!(page.next, Some(older));

        let empty: CursorPage<DateTime<Utc>> = CursorPage::from_items(vec![], |t| *t);
        assert_eq!(empty.next, None);
    }
}
