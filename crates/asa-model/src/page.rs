use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult};

/// Cursor-based page request.
///
/// Cursors are opaque to callers; they are produced by [`PageInfo::end_cursor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Requested page size. `None` means "server default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Cursor returned by a previous page. `None` starts from the beginning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl PageRequest {
    /// First page of the given size.
    pub fn first(size: usize) -> Self {
        Self {
            size: Some(size),
            cursor: None,
        }
    }

    /// Continue after `cursor`.
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Decode the cursor into an item offset.
    pub fn offset(&self) -> ModelResult<usize> {
        match self.cursor.as_deref() {
            None | Some("") => Ok(0),
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| ModelError::InvalidCursor(c.to_string())),
        }
    }
}

/// Position of a page within the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub start_cursor: String,
    pub end_cursor: String,
    pub has_next_page: bool,
}

/// One page of results plus the size of the full set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_count: usize,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Cut a page of at most `size` items starting at `offset` out of `all`.
    ///
    /// An offset past the end yields an empty page.
    pub fn slice(all: Vec<T>, offset: usize, size: usize) -> Self {
        let total_count = all.len();
        let start = offset.min(total_count);
        let end = start.saturating_add(size).min(total_count);

        let data: Vec<T> = all.into_iter().skip(start).take(end - start).collect();

        Self {
            data,
            total_count,
            page_info: PageInfo {
                start_cursor: start.to_string(),
                end_cursor: end.to_string(),
                has_next_page: end < total_count,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_defaults_to_zero() {
        assert_eq!(PageRequest::default().offset().unwrap(), 0);
        assert_eq!(PageRequest::first(10).after("").offset().unwrap(), 0);
    }

    #[test]
    fn offset_rejects_garbage() {
        let err = PageRequest::first(10).after("abc").offset().unwrap_err();
        assert!(matches!(err, ModelError::InvalidCursor(c) if c == "abc"));
    }

    #[test]
    fn slice_walks_through_all_items() {
        let items: Vec<u32> = (0..5).collect();

        let p1 = Page::slice(items.clone(), 0, 2);
        assert_eq!(p1.data, vec![0, 1]);
        assert_eq!(p1.total_count, 5);
        assert!(p1.page_info.has_next_page);

        let next = PageRequest::first(2).after(p1.page_info.end_cursor.clone());
        let p2 = Page::slice(items.clone(), next.offset().unwrap(), 2);
        assert_eq!(p2.data, vec![2, 3]);

        let p3 = Page::slice(items, 4, 2);
        assert_eq!(p3.data, vec![4]);
        assert!(!p3.page_info.has_next_page);
    }

    #[test]
    fn slice_past_end_is_empty() {
        let page = Page::slice(vec![1, 2], 10, 5);
        assert!(page.data.is_empty());
        assert_eq!(page.total_count, 2);
        assert!(!page.page_info.has_next_page);
    }
}
