//! List Query State
//!
//! Owns the page cursor, search term and filter values for one screen, the
//! last successful page of rows, and the fetch status. Every change schedules
//! one refresh; each issued refresh carries a sequence number and only the
//! newest one may be applied (last-request-wins).

use crate::api::ApiResult;
use serde_json::Value;
use std::collections::BTreeMap;

/// Rows per page
pub const PAGE_SIZE: u32 = 10;

/// What the list endpoint is asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search_term: String,
    /// Query parameter name → value; empty values are not sent
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search_term: String::new(),
            filters: BTreeMap::new(),
        }
    }

    pub fn filter(&self, key: &str) -> &str {
        self.filters.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn has_criteria(&self) -> bool {
        !self.search_term.is_empty() || self.filters.values().any(|v| !v.is_empty())
    }
}

/// One page of rows plus totals
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListResult {
    pub rows: Vec<Value>,
    pub total_count: u64,
    pub total_pages: u32,
}

impl ListResult {
    /// Parse `{data: [...], pagination: {pages, total}}`.
    ///
    /// A bare array is accepted as a single page. Missing totals are derived
    /// from the row count and page size.
    pub fn from_response(body: &Value, page_size: u32) -> Option<Self> {
        let (rows, pagination) = match body {
            Value::Array(rows) => (rows.clone(), None),
            Value::Object(map) => {
                let rows = map.get("data")?.as_array()?.clone();
                (rows, map.get("pagination"))
            },
            _ => return None,
        };

        let total_count = pagination
            .and_then(|p| p.get("total"))
            .and_then(Value::as_u64)
            .unwrap_or(rows.len() as u64);

        let derived = total_count.div_ceil(page_size.max(1) as u64) as u32;
        let total_pages = pagination
            .and_then(|p| p.get("pages"))
            .and_then(Value::as_u64)
            .map(|p| p as u32)
            .unwrap_or(derived);

        // A non-empty result always has at least one page
        let total_pages = if total_count > 0 { total_pages.max(1) } else { total_pages };

        Some(Self {
            rows,
            total_count,
            total_pages,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0 && self.rows.is_empty()
    }
}

/// Loading flag and last error of one async activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsyncStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl AsyncStatus {
    pub fn start(&mut self) {
        self.loading = true;
    }

    pub fn succeed(&mut self) {
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// An issued list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTicket {
    pub seq: u64,
    pub query: ListQuery,
}

/// Result of handing a response to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// A newer request was issued; the response was dropped
    Stale,
}

/// Query, last good result and status for one screen
#[derive(Debug, Clone)]
pub struct ListState {
    query: ListQuery,
    result: Option<ListResult>,
    pub status: AsyncStatus,
    issued: u64,
    scheduled: bool,
}

impl ListState {
    /// New state; the initial fetch is already scheduled
    pub fn new(page_size: u32) -> Self {
        Self {
            query: ListQuery::new(page_size),
            result: None,
            status: AsyncStatus::default(),
            issued: 0,
            scheduled: true,
        }
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn result(&self) -> Option<&ListResult> {
        self.result.as_ref()
    }

    pub fn rows(&self) -> &[Value] {
        self.result.as_ref().map(|r| r.rows.as_slice()).unwrap_or(&[])
    }

    pub fn total_pages(&self) -> u32 {
        self.result.as_ref().map(|r| r.total_pages).unwrap_or(0)
    }

    pub fn total_count(&self) -> u64 {
        self.result.as_ref().map(|r| r.total_count).unwrap_or(0)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn last_issued(&self) -> u64 {
        self.issued
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Change the search term; resets to page 1
    pub fn set_search_term(&mut self, term: &str) -> bool {
        if self.query.search_term == term {
            return false;
        }
        self.query.search_term = term.to_string();
        self.query.page = 1;
        self.scheduled = true;
        true
    }

    /// Change one filter; resets to page 1
    pub fn set_filter(&mut self, key: &str, value: &str) -> bool {
        if self.query.filter(key) == value {
            return false;
        }
        if value.is_empty() {
            self.query.filters.remove(key);
        } else {
            self.query.filters.insert(key.to_string(), value.to_string());
        }
        self.query.page = 1;
        self.scheduled = true;
        true
    }

    /// Drop search and filters
    pub fn clear_criteria(&mut self) -> bool {
        if !self.query.has_criteria() {
            return false;
        }
        self.query.search_term.clear();
        self.query.filters.clear();
        self.query.page = 1;
        self.scheduled = true;
        true
    }

    /// Move to page `n`; ignored outside `1..=total_pages` of the last result
    pub fn set_page(&mut self, n: u32) -> bool {
        let upper = if self.result.is_some() { self.total_pages() } else { 1 };
        if n < 1 || n > upper || n == self.query.page {
            return false;
        }
        self.query.page = n;
        self.scheduled = true;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.query.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.query.page.saturating_sub(1))
    }

    /// Schedule a refetch of the current query
    pub fn invalidate(&mut self) {
        self.scheduled = true;
    }

    // =========================================================================
    // Request lifecycle
    // =========================================================================

    /// Take the scheduled refresh, if any. Repeated changes between two calls
    /// coalesce into one request.
    pub fn take_scheduled(&mut self) -> Option<ListTicket> {
        if !self.scheduled {
            return None;
        }
        Some(self.begin())
    }

    /// Issue a request for the current query. Rows stay visible meanwhile.
    pub fn begin(&mut self) -> ListTicket {
        self.scheduled = false;
        self.issued += 1;
        self.status.start();
        ListTicket {
            seq: self.issued,
            query: self.query.clone(),
        }
    }

    /// Apply a response; only the newest issued request is accepted.
    ///
    /// On failure the previous rows are kept and `fallback` is shown unless
    /// the server sent its own message.
    pub fn apply(&mut self, seq: u64, response: ApiResult<ListResult>, fallback: &str) -> Applied {
        if seq != self.issued {
            tracing::debug!("dropping stale list response {} (latest {})", seq, self.issued);
            return Applied::Stale;
        }

        match response {
            Ok(result) => {
                self.result = Some(result);
                self.status.succeed();
            },
            Err(e) => {
                tracing::warn!("list request {} failed: {}", seq, e);
                self.status.fail(e.user_message(fallback));
            },
        }
        Applied::Applied
    }
}
