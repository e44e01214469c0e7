//! In-memory spot registry.
//!
//! Keeps spots in insertion order (which decides task presentation) next to
//! an id lookup map.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::identifiers::*;
use crate::models::{traits::*, types::*};

/// Ordered spot list with id lookup
///
/// This type is cheap to clone since all spots are stored in `Arc`s.
#[derive(Clone, Default)]
pub struct SpotRegistry {
    spots: Vec<Arc<TreasureSpot>>,
    spot_map: HashMap<SpotIdentifier, Arc<TreasureSpot>>,
}

impl SpotRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list, keeping the first spot for duplicate ids
    pub fn from_spots(spots: impl IntoIterator<Item = TreasureSpot>) -> Self {
        let mut spot_map = HashMap::new();
        let mut ordered = Vec::new();

        for spot in spots {
            if spot_map.contains_key(&spot.id) {
                continue;
            }
            let spot = Arc::new(spot);
            spot_map.insert(spot.id.clone(), Arc::clone(&spot));
            ordered.push(spot);
        }

        Self {
            spots: ordered,
            spot_map,
        }
    }

    /// Append a spot. Returns `false` if the identifier is already taken.
    pub fn insert(&mut self, spot: TreasureSpot) -> bool {
        if self.spot_map.contains_key(&spot.id) {
            return false;
        }

        let spot = Arc::new(spot);
        self.spot_map.insert(spot.id.clone(), Arc::clone(&spot));
        self.spots.push(spot);
        true
    }

    /// Remove a spot by identifier; `None` if it was not present
    pub fn remove(&mut self, id: &SpotIdentifier) -> Option<Arc<TreasureSpot>> {
        let removed = self.spot_map.remove(id)?;
        self.spots.retain(|spot| &spot.id != id);
        Some(removed)
    }

    pub fn contains(&self, id: &SpotIdentifier) -> bool {
        self.spot_map.contains_key(id)
    }
}

impl fmt::Debug for SpotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.spots.iter()).finish()
    }
}

impl PartialEq for SpotRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.spots == other.spots
    }
}

impl SpotProvider for SpotRegistry {
    fn get_spot(&self, id: &SpotIdentifier) -> Option<Arc<TreasureSpot>> {
        self.spot_map.get(id).cloned()
    }

    fn all_spots(&self) -> Vec<Arc<TreasureSpot>> {
        self.spots.clone()
    }

    fn len(&self) -> usize {
        self.spots.len()
    }
}
