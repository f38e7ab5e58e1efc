pub mod coordinate;
pub mod query;
pub mod shift;
pub mod site;
pub mod worker;

pub use coordinate::Coordinate;
pub use query::{
    ShiftPage, ShiftQuery, SortOrder, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MAX_PAGE_OFFSET,
};
pub use shift::{ClockEvent, Shift, ShiftId, ShiftStatus};
pub use site::{RadiusPolicy, Site, SiteDraft, SiteId};
pub use worker::{Role, SyncOutcome, Worker, WorkerId, WorkerProfile};
