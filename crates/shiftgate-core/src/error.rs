//! Error types for shiftgate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShiftgateError {
    // Location acquisition errors
    #[error("Location unavailable: {reason}")]
    LocationUnavailable { reason: String },

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Invalid coordinate ({latitude}, {longitude}): {reason}")]
    InvalidCoordinate {
        latitude: f64,
        longitude: f64,
        reason: String,
    },

    // Geofence errors
    #[error("{distance_meters:.0}m away, allowed {allowed_radius_meters:.0}m")]
    GeofenceViolation {
        distance_meters: f64,
        allowed_radius_meters: f64,
    },

    // Ledger errors
    #[error("Worker {worker_id} already has an active shift")]
    ShiftAlreadyActive { worker_id: String },

    #[error("Worker {worker_id} has no active shift")]
    NoActiveShift { worker_id: String },

    #[error("Shift {shift_id} cannot change state: {reason}")]
    InvalidShiftTransition { shift_id: String, reason: String },

    // Site errors
    #[error("No site is configured for clock-in")]
    SiteNotConfigured,

    #[error("{available} sites are configured; a site must be selected")]
    SiteSelectionRequired { available: usize },

    #[error("Site not found: {id}")]
    SiteNotFound { id: String },

    #[error("Invalid site: {reason}")]
    InvalidSite { reason: String },

    // Worker errors
    #[error("Worker not found: {id}")]
    WorkerNotFound { id: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShiftgateError {
    /// Whether this is an expected condition the caller can act on, as opposed
    /// to an internal fault.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            ShiftgateError::ConfigMissing { .. }
                | ShiftgateError::ConfigInvalid { .. }
                | ShiftgateError::Storage(_)
                | ShiftgateError::Io(_)
                | ShiftgateError::InvalidShiftTransition { .. }
        )
    }

    /// Short machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            ShiftgateError::LocationUnavailable { .. } => "LocationUnavailable",
            ShiftgateError::PermissionDenied => "PermissionDenied",
            ShiftgateError::InvalidCoordinate { .. } => "InvalidCoordinate",
            ShiftgateError::GeofenceViolation { .. } => "GeofenceViolation",
            ShiftgateError::ShiftAlreadyActive { .. } => "ShiftAlreadyActive",
            ShiftgateError::NoActiveShift { .. } => "NoActiveShift",
            ShiftgateError::InvalidShiftTransition { .. } => "InvalidShiftTransition",
            ShiftgateError::SiteNotConfigured => "SiteNotConfigured",
            ShiftgateError::SiteSelectionRequired { .. } => "SiteSelectionRequired",
            ShiftgateError::SiteNotFound { .. } => "SiteNotFound",
            ShiftgateError::InvalidSite { .. } => "InvalidSite",
            ShiftgateError::WorkerNotFound { .. } => "WorkerNotFound",
            ShiftgateError::ConfigMissing { .. } => "ConfigMissing",
            ShiftgateError::ConfigInvalid { .. } => "ConfigInvalid",
            ShiftgateError::Storage(_) => "Storage",
            ShiftgateError::Io(_) => "Io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ShiftgateError>;
