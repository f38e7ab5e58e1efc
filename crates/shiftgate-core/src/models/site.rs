use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Coordinate;
use crate::error::{Result, ShiftgateError};

/// Unique identifier for a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteId(pub Uuid);

impl SiteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SiteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SiteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SiteId)
    }
}

/// Bounds on a site's admission radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusPolicy {
    pub min_meters: f64,
    pub max_meters: f64,
}

impl Default for RadiusPolicy {
    fn default() -> Self {
        Self { min_meters: 100.0, max_meters: 10_000.0 }
    }
}

impl RadiusPolicy {
    pub fn check(&self, radius_meters: f64) -> Result<()> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(ShiftgateError::InvalidSite {
                reason: format!("radius must be a positive number of meters, got {}", radius_meters),
            });
        }
        if radius_meters < self.min_meters || radius_meters > self.max_meters {
            return Err(ShiftgateError::InvalidSite {
                reason: format!(
                    "radius {}m is outside the allowed range {}m-{}m",
                    radius_meters, self.min_meters, self.max_meters
                ),
            });
        }
        Ok(())
    }
}

/// A physical work location with a circular admission boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    pub address: String,
    pub location: Coordinate,
    pub radius_meters: f64,
    pub updated_at: DateTime<Utc>,
}

/// Site fields supplied by a manager when configuring a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDraft {
    pub name: String,
    pub address: String,
    pub location: Coordinate,
    pub radius_meters: f64,
}

impl SiteDraft {
    /// Validate the draft and turn it into a site with the given identity
    pub fn into_site(self, id: SiteId, policy: &RadiusPolicy, now: DateTime<Utc>) -> Result<Site> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ShiftgateError::InvalidSite { reason: "name cannot be empty".to_string() });
        }
        self.location.validate().map_err(|e| ShiftgateError::InvalidSite { reason: e.to_string() })?;
        policy.check(self.radius_meters)?;

        Ok(Site {
            id,
            name: name.to_string(),
            address: self.address.trim().to_string(),
            location: self.location,
            radius_meters: self.radius_meters,
            updated_at: now,
        })
    }
}
