//! Read-only projections over recorded shifts.
//!
//! Every projection takes `now` from the caller, so results depend only on
//! stored shifts and the supplied instant. Days are UTC days and weeks start
//! on Monday.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::Serialize;
use shiftgate_core::error::Result;
use shiftgate_core::models::{Shift, Worker, WorkerId};
use shiftgate_store::ports::{ShiftStore, WorkerStore};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    pub id: WorkerId,
    pub name: String,
}

impl From<&Worker> for WorkerSummary {
    fn from(worker: &Worker) -> Self {
        Self { id: worker.id.clone(), name: worker.name.clone() }
    }
}

/// One row of the "currently working" roster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub worker: WorkerSummary,
    pub shift: Shift,
    pub clock_in_at: DateTime<Utc>,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStats {
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub avg_hours_per_day: f64,
    pub clock_ins_today: usize,
    pub total_hours_this_week: f64,
}

pub struct ActivityAggregator {
    shifts: Arc<dyn ShiftStore>,
    workers: Arc<dyn WorkerStore>,
}

impl ActivityAggregator {
    pub fn new(shifts: Arc<dyn ShiftStore>, workers: Arc<dyn WorkerStore>) -> Self {
        Self { shifts, workers }
    }

    pub async fn currently_active_count(&self) -> Result<usize> {
        Ok(self.shifts.list_active_shifts().await?.len())
    }

    /// Minutes on the clock as of `now`; the final duration once completed
    pub fn active_duration_minutes(shift: &Shift, now: DateTime<Utc>) -> i64 {
        shift.minutes_as_of(now)
    }

    pub async fn completed_shifts_since(
        &self,
        worker_id: &WorkerId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Shift>> {
        self.shifts.completed_shifts_since(worker_id, since).await
    }

    /// Sum of completed durations; active shifts contribute nothing
    pub fn total_minutes(shifts: &[Shift]) -> i64 {
        shifts.iter().filter_map(Shift::duration_minutes).sum()
    }

    /// Workers currently clocked in, longest-running shift first
    pub async fn roster(&self, now: DateTime<Utc>) -> Result<Vec<RosterEntry>> {
        let active = self.shifts.list_active_shifts().await?;
        let names = self.worker_summaries().await?;

        Ok(active
            .into_iter()
            .map(|shift| {
                let worker = names.get(&shift.worker_id).cloned().unwrap_or_else(|| WorkerSummary {
                    id: shift.worker_id.clone(),
                    name: shift.worker_id.to_string(),
                });
                RosterEntry {
                    worker,
                    clock_in_at: shift.clock_in.at,
                    duration_minutes: Self::active_duration_minutes(&shift, now),
                    shift,
                }
            })
            .collect())
    }

    /// Per-worker dashboard figures for the current day and week
    pub async fn worker_stats(&self, now: DateTime<Utc>) -> Result<Vec<WorkerStats>> {
        let today = start_of_day(now);
        let week = start_of_week(now);

        let mut by_worker: HashMap<WorkerId, Vec<Shift>> = HashMap::new();
        for shift in self.shifts.shifts_clocked_in_since(week).await? {
            by_worker.entry(shift.worker_id.clone()).or_default().push(shift);
        }

        let workers = self.workers.list_workers().await?;
        Ok(workers
            .into_iter()
            .map(|worker| {
                let shifts = by_worker.remove(&worker.id).unwrap_or_default();
                let minutes: i64 = shifts.iter().map(|s| s.minutes_as_of(now)).sum();
                let days: BTreeSet<_> = shifts.iter().map(|s| s.clock_in.at.date_naive()).collect();
                let avg_minutes = if days.is_empty() { 0 } else { minutes / days.len() as i64 };

                WorkerStats {
                    worker_id: worker.id,
                    worker_name: worker.name,
                    avg_hours_per_day: hours(avg_minutes),
                    clock_ins_today: shifts.iter().filter(|s| s.clock_in.at >= today).count(),
                    total_hours_this_week: hours(minutes),
                }
            })
            .collect())
    }

    async fn worker_summaries(&self) -> Result<HashMap<WorkerId, WorkerSummary>> {
        Ok(self
            .workers
            .list_workers()
            .await?
            .iter()
            .map(|w| (w.id.clone(), WorkerSummary::from(w)))
            .collect())
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(now) - Duration::days(now.weekday().num_days_from_monday() as i64)
}

/// Hours rounded to two decimals
fn hours(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use shiftgate_core::models::{ClockEvent, Coordinate, Role, SiteId, WorkerProfile};
    use shiftgate_store::memory::{MemoryShiftStore, MemoryWorkerStore};

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        // 2026-03-02 is a Monday
        Utc.with_ymd_and_hms(2026, 3, day, h, m, 0).unwrap()
    }

    fn here() -> Coordinate {
        Coordinate::new(37.7749, -122.4194)
    }

    fn shift(worker: &str, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Shift {
        let mut shift = Shift::open(WorkerId::new(worker), SiteId::new(), ClockEvent::new(from, here(), None));
        if let Some(to) = to {
            shift.complete(ClockEvent::new(to, here(), None)).unwrap();
        }
        shift
    }

    async fn record(store: &MemoryShiftStore, shift: &Shift) {
        let mut open = shift.clone();
        open.status = shiftgate_core::models::ShiftStatus::Active;
        open.clock_out = None;
        store.insert_active_shift(&open).await.unwrap();
        if !shift.is_active() {
            store.complete_shift(shift).await.unwrap();
        }
    }

    async fn aggregator(shifts: &[Shift]) -> ActivityAggregator {
        let shift_store = MemoryShiftStore::new();
        for s in shifts {
            record(&shift_store, s).await;
        }

        let workers = MemoryWorkerStore::new();
        for (id, name) in [("w1", "Ana Reyes"), ("w2", "Ben Okafor")] {
            let profile = WorkerProfile {
                id: WorkerId::new(id),
                name: name.into(),
                email: format!("{}@example.org", id),
                role: Role::CareWorker,
            };
            workers.sync_worker(&profile, at(1, 0, 0)).await.unwrap();
        }

        ActivityAggregator::new(Arc::new(shift_store), Arc::new(workers))
    }

    #[tokio::test]
    async fn test_worker_stats_for_current_week() {
        let agg = aggregator(&[
            // Previous week, excluded
            shift("w1", at(1, 10, 0), Some(at(1, 12, 0))),
            shift("w1", at(2, 8, 0), Some(at(2, 16, 0))),
            shift("w1", at(3, 9, 0), Some(at(3, 13, 30))),
            shift("w1", at(4, 8, 0), None),
        ])
        .await;

        let stats = agg.worker_stats(at(4, 12, 0)).await.unwrap();
        assert_eq!(stats.len(), 2);

        let ana = &stats[0];
        assert_eq!(ana.worker_name, "Ana Reyes");
        assert_eq!(ana.clock_ins_today, 1);
        assert_eq!(ana.total_hours_this_week, 16.5);
        assert_eq!(ana.avg_hours_per_day, 5.5);

        let ben = &stats[1];
        assert_eq!(ben.clock_ins_today, 0);
        assert_eq!(ben.total_hours_this_week, 0.0);
        assert_eq!(ben.avg_hours_per_day, 0.0);
    }

    #[tokio::test]
    async fn test_roster_lists_active_shifts_oldest_first() {
        let agg = aggregator(&[
            shift("w2", at(4, 9, 0), None),
            shift("w1", at(4, 7, 30), None),
            shift("ghost", at(4, 10, 0), Some(at(4, 11, 0))),
        ])
        .await;

        let roster = agg.roster(at(4, 12, 0)).await.unwrap();
        assert_eq!(agg.currently_active_count().await.unwrap(), 2);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].worker.name, "Ana Reyes");
        assert_eq!(roster[0].duration_minutes, 270);
        assert_eq!(roster[1].worker.name, "Ben Okafor");
        assert_eq!(roster[1].clock_in_at, at(4, 9, 0));
    }

    #[tokio::test]
    async fn test_completed_shifts_since() {
        let agg = aggregator(&[
            shift("w1", at(2, 8, 0), Some(at(2, 16, 0))),
            shift("w1", at(3, 8, 0), Some(at(3, 9, 15))),
            shift("w1", at(4, 8, 0), None),
        ])
        .await;

        let recent = agg.completed_shifts_since(&WorkerId::new("w1"), at(3, 0, 0)).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(ActivityAggregator::total_minutes(&recent), 75);
    }

    #[test]
    fn test_active_duration_uses_supplied_now() {
        let open = shift("w1", at(2, 8, 0), None);
        assert_eq!(ActivityAggregator::active_duration_minutes(&open, at(2, 9, 59)), 119);

        let done = shift("w1", at(2, 8, 0), Some(at(2, 9, 0)));
        assert_eq!(ActivityAggregator::active_duration_minutes(&done, at(2, 23, 0)), 60);
    }

    proptest! {
        #[test]
        fn prop_total_minutes_ignores_active_shifts(
            spans in prop::collection::vec((0i64..10_000, 0i64..720, any::<bool>()), 0..20)
        ) {
            let base = at(2, 0, 0);
            let mut expected = 0;
            let shifts: Vec<Shift> = spans
                .iter()
                .map(|&(start, len, completed)| {
                    let from = base + Duration::minutes(start);
                    if completed {
                        expected += len;
                        shift("w1", from, Some(from + Duration::minutes(len)))
                    } else {
                        shift("w1", from, None)
                    }
                })
                .collect();

            prop_assert_eq!(ActivityAggregator::total_minutes(&shifts), expected);
        }
    }
}
