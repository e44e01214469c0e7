//! Core traits for spot catalogues.
//!
//! Implementations can be in-memory, database-backed, or remote.

use std::sync::Arc;

use crate::identifiers::*;
use crate::models::types::*;

/// Provider of all treasure spots with id lookup
pub trait SpotProvider: Send + Sync {
    // ---- Lookups ----
    fn get_spot(&self, id: &SpotIdentifier) -> Option<Arc<TreasureSpot>>;

    // ---- Collections ----

    /// All spots in insertion order
    fn all_spots(&self) -> Vec<Arc<TreasureSpot>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
