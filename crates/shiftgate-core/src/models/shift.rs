//! Shift records and the ACTIVE -> COMPLETED transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Coordinate, SiteId, WorkerId};
use crate::error::{Result, ShiftgateError};

/// Unique identifier for a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(pub Uuid);

impl ShiftId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShiftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    Active,
    Completed,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Active => "ACTIVE",
            ShiftStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for ShiftStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(ShiftStatus::Active),
            "COMPLETED" => Ok(ShiftStatus::Completed),
            other => Err(format!("unknown shift status '{}'", other)),
        }
    }
}

/// One end of a shift: when, where, and an optional note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockEvent {
    pub at: DateTime<Utc>,
    pub location: Coordinate,
    pub note: Option<String>,
}

impl ClockEvent {
    /// Blank notes are stored as absent
    pub fn new(at: DateTime<Utc>, location: Coordinate, note: Option<String>) -> Self {
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Self { at, location, note }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: ShiftId,
    pub worker_id: WorkerId,
    pub site_id: SiteId,
    pub status: ShiftStatus,
    pub clock_in: ClockEvent,
    pub clock_out: Option<ClockEvent>,
}

impl Shift {
    /// Start a new ACTIVE shift
    pub fn open(worker_id: WorkerId, site_id: SiteId, clock_in: ClockEvent) -> Self {
        Self {
            id: ShiftId::new(),
            worker_id,
            site_id,
            status: ShiftStatus::Active,
            clock_in,
            clock_out: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ShiftStatus::Active
    }

    /// Close the shift. COMPLETED is terminal.
    ///
    /// A clock-out timestamp earlier than the clock-in (clock skew between
    /// request handlers) is clamped to the clock-in time.
    pub fn complete(&mut self, mut clock_out: ClockEvent) -> Result<()> {
        if self.status == ShiftStatus::Completed {
            return Err(ShiftgateError::InvalidShiftTransition {
                shift_id: self.id.to_string(),
                reason: "shift is already completed".to_string(),
            });
        }

        if clock_out.at < self.clock_in.at {
            clock_out.at = self.clock_in.at;
        }

        self.clock_out = Some(clock_out);
        self.status = ShiftStatus::Completed;
        Ok(())
    }

    /// Whole minutes between clock-in and clock-out, present once completed
    pub fn duration_minutes(&self) -> Option<i64> {
        self.clock_out.as_ref().map(|out| (out.at - self.clock_in.at).num_minutes())
    }

    /// Minutes worked as of `now`: the final duration for completed shifts,
    /// elapsed time for active ones (never negative)
    pub fn minutes_as_of(&self, now: DateTime<Utc>) -> i64 {
        match self.duration_minutes() {
            Some(minutes) => minutes,
            None => (now - self.clock_in.at).num_minutes().max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn open_shift() -> Shift {
        Shift::open(
            WorkerId::new("auth0|w1"),
            SiteId::new(),
            ClockEvent::new(at(8, 0), Coordinate::new(37.7749, -122.4194), Some("  ".into())),
        )
    }

    #[test]
    fn test_open_shift_is_active_without_clock_out() {
        let shift = open_shift();
        assert!(shift.is_active());
        assert!(shift.clock_out.is_none());
        assert!(shift.clock_in.note.is_none());
        assert_eq!(shift.duration_minutes(), None);
    }

    #[test]
    fn test_complete_sets_duration() {
        let mut shift = open_shift();
        shift
            .complete(ClockEvent::new(at(16, 30), Coordinate::new(37.7755, -122.42), Some("done".into())))
            .unwrap();

        assert_eq!(shift.status, ShiftStatus::Completed);
        assert_eq!(shift.duration_minutes(), Some(510));
        assert_eq!(shift.clock_out.as_ref().unwrap().note.as_deref(), Some("done"));
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut shift = open_shift();
        let out = ClockEvent::new(at(9, 0), Coordinate::new(37.7749, -122.4194), None);
        shift.complete(out.clone()).unwrap();

        assert!(matches!(
            shift.complete(out),
            Err(ShiftgateError::InvalidShiftTransition { .. })
        ));
        assert_eq!(shift.duration_minutes(), Some(60));
    }

    #[test]
    fn test_clock_out_before_clock_in_is_clamped() {
        let mut shift = open_shift();
        shift
            .complete(ClockEvent::new(at(7, 59), Coordinate::new(37.7749, -122.4194), None))
            .unwrap();
        assert_eq!(shift.clock_out.as_ref().unwrap().at, shift.clock_in.at);
        assert_eq!(shift.duration_minutes(), Some(0));
    }

    #[test]
    fn test_minutes_as_of_for_active_shift() {
        let shift = open_shift();
        assert_eq!(shift.minutes_as_of(at(8, 0) + Duration::minutes(95)), 95);
        assert_eq!(shift.minutes_as_of(at(7, 0)), 0);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("active".parse::<ShiftStatus>().unwrap(), ShiftStatus::Active);
        assert_eq!(ShiftStatus::Completed.as_str(), "COMPLETED");
        assert!("paused".parse::<ShiftStatus>().is_err());
    }
}
