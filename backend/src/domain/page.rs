//! Pagination types for ordered range reads

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub num_items: u32,
    /// Opaque cursor returned by the previous page
    #[serde(default)]
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn first(num_items: u32) -> Self {
        Self { num_items, cursor: None }
    }

    /// Offset encoded in the cursor; unknown cursors restart from the beginning
    pub fn offset(&self) -> usize {
        self.cursor
            .as_deref()
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: Vec<T>,
    pub continue_cursor: Option<String>,
    pub is_done: bool,
}

impl<T> Page<T> {
    /// Slice an already ordered collection
    pub fn from_ordered(items: Vec<T>, request: &PageRequest) -> Self {
        let offset = request.offset();
        let take = request.num_items.max(1) as usize;
        let total = items.len();
        let page: Vec<T> = items.into_iter().skip(offset).take(take).collect();
        let end = offset + page.len();
        let is_done = end >= total;
        Self {
            page,
            continue_cursor: if is_done { None } else { Some(end.to_string()) },
            is_done,
        }
    }

    /// Without a request the whole collection is one finished page
    pub fn paginate(items: Vec<T>, request: Option<&PageRequest>) -> Self {
        match request {
            Some(request) => Self::from_ordered(items, request),
            None => Self {
                page: items,
                continue_cursor: None,
                is_done: true,
            },
        }
    }
}
