//! Core data types for treasure spots.

use chrono::{DateTime, Utc};
use geo::Point;

use crate::identifiers::*;

/// Activation radius handed to spots created without an explicit one.
pub const DEFAULT_ACTIVATION_RADIUS_M: f64 = 20.0;

// ============================================================================
// Data Structures
// ============================================================================

/// An administrator-defined point of interest with an attached task.
///
/// Spots are never edited in place; the admin deletes and recreates them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TreasureSpot {
    pub id: SpotIdentifier,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub task: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub created_at: DateTime<Utc>,
}

impl TreasureSpot {
    /// Location as a `geo::Point` (x = longitude, y = latitude)
    pub fn location(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }

    pub fn task_id(&self) -> TaskIdentifier {
        self.id.task()
    }
}

/// Admin input for a new spot, before an identifier is assigned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SpotDraft {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub task: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Falls back to [`DEFAULT_ACTIVATION_RADIUS_M`]
    #[cfg_attr(feature = "serde", serde(default))]
    pub radius: Option<f64>,
}

impl SpotDraft {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            task: String::new(),
            latitude,
            longitude,
            radius: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn radius_or_default(&self) -> f64 {
        self.radius.unwrap_or(DEFAULT_ACTIVATION_RADIUS_M)
    }

    /// Check the spot invariants without consuming the draft.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SpotError::EmptyName);
        }

        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SpotError::InvalidLatitude(self.latitude));
        }

        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SpotError::InvalidLongitude(self.longitude));
        }

        let radius = self.radius_or_default();
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SpotError::InvalidRadius(radius));
        }

        Ok(())
    }

    /// Validate and stamp the draft with an identifier and creation time.
    pub fn into_spot(self, id: SpotIdentifier, created_at: DateTime<Utc>) -> Result<TreasureSpot> {
        self.validate()?;
        let radius = self.radius_or_default();

        Ok(TreasureSpot {
            id,
            name: self.name.trim().to_owned(),
            description: self.description,
            task: self.task,
            latitude: self.latitude,
            longitude: self.longitude,
            radius,
            created_at,
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpotError {
    #[error("Spot name is required")]
    EmptyName,

    #[error("Latitude must be within [-90, 90], got {0}")]
    InvalidLatitude(f64),

    #[error("Longitude must be within [-180, 180], got {0}")]
    InvalidLongitude(f64),

    #[error("Activation radius must be positive, got {0}")]
    InvalidRadius(f64),
}

pub type Result<T> = std::result::Result<T, SpotError>;
