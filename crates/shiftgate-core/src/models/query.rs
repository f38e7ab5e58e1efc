use serde::{Deserialize, Serialize};

use super::{Shift, ShiftStatus, WorkerId};

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const MAX_PAGE_LIMIT: usize = 200;
/// Largest offset a SQL backend can bind as a signed 64-bit value
pub const MAX_PAGE_OFFSET: usize = i64::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter and paging for shift history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftQuery {
    pub worker_id: Option<WorkerId>,
    pub status: Option<ShiftStatus>,
    pub order: SortOrder,
    pub offset: usize,
    pub limit: usize,
}

impl Default for ShiftQuery {
    fn default() -> Self {
        Self {
            worker_id: None,
            status: None,
            order: SortOrder::Desc,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ShiftQuery {
    pub fn for_worker(mut self, worker_id: WorkerId) -> Self {
        self.worker_id = Some(worker_id);
        self
    }

    pub fn with_status(mut self, status: ShiftStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Set paging; a zero limit falls back to the default, large limits and
    /// offsets are capped
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset.min(MAX_PAGE_OFFSET);
        self.limit = match limit {
            0 => DEFAULT_PAGE_LIMIT,
            n => n.min(MAX_PAGE_LIMIT),
        };
        self
    }

    pub fn matches(&self, shift: &Shift) -> bool {
        self.worker_id.as_ref().is_none_or(|w| &shift.worker_id == w)
            && self.status.is_none_or(|s| shift.status == s)
    }
}

/// One page of shift history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftPage {
    pub items: Vec<Shift>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}
