mod activity;
mod attendance;
mod health;
mod shifts;
mod sites;
mod workers;

pub use activity::{get_roster, get_stats};
pub use attendance::{clock_in, clock_out};
pub use health::health_check;
pub use shifts::list_shifts;
pub use sites::{get_site, list_sites, put_site};
pub use workers::sync_worker;
