//! Per-spot proximity state, diffed on every position tick.

use std::collections::HashMap;
use std::sync::Arc;

use yessplora_spots::{SpotIdentifier, TreasureSpot};

use crate::hunt::proximity::{SpotReading, SpotStatus, evaluate};
use crate::hunt::state::LocationSample;

#[derive(Clone, Debug)]
pub enum ProximityEvent {
    /// The spot just became active. Emitted once per crossing.
    Entered(Arc<TreasureSpot>),
    /// The spot was active and no longer is.
    Vacated {
        spot: Arc<TreasureSpot>,
        now: SpotStatus,
    },
    /// Any other status change (far <-> nearby, unknown -> far, ...)
    StatusChanged {
        spot: Arc<TreasureSpot>,
        from: SpotStatus,
        to: SpotStatus,
    },
}

#[derive(Debug)]
pub struct TickReport {
    /// Every spot's reading, in list order
    pub readings: Vec<SpotReading>,
    /// Transitions in list order
    pub events: Vec<ProximityEvent>,
}

impl TickReport {
    pub fn entered(&self) -> impl Iterator<Item = &Arc<TreasureSpot>> {
        self.events.iter().filter_map(|event| match event {
            ProximityEvent::Entered(spot) => Some(spot),
            _ => None,
        })
    }

    pub fn vacated(&self) -> impl Iterator<Item = &Arc<TreasureSpot>> {
        self.events.iter().filter_map(|event| match event {
            ProximityEvent::Vacated { spot, .. } => Some(spot),
            _ => None,
        })
    }
}

/// Remembers the last classification of each spot so transitions can be
/// detected edge-triggered rather than level-triggered.
#[derive(Debug)]
pub struct ProximityTracker {
    nearby_radius_m: f64,
    statuses: HashMap<SpotIdentifier, SpotStatus>,
}

impl ProximityTracker {
    pub fn new(nearby_radius_m: f64) -> Self {
        Self {
            nearby_radius_m,
            statuses: HashMap::new(),
        }
    }

    pub fn status(&self, id: &SpotIdentifier) -> SpotStatus {
        self.statuses.get(id).copied().unwrap_or(SpotStatus::Unknown)
    }

    /// Re-evaluate every spot and report what changed since the last tick.
    /// Spots missing from `spots` are forgotten.
    pub fn tick(&mut self, sample: &LocationSample, spots: &[Arc<TreasureSpot>]) -> TickReport {
        let readings = evaluate(Some(sample), spots, self.nearby_radius_m);

        let mut previous = std::mem::take(&mut self.statuses);
        let mut events = Vec::new();

        for reading in &readings {
            let from = previous
                .remove(&reading.spot.id)
                .unwrap_or(SpotStatus::Unknown);
            let to = reading.status;
            self.statuses.insert(reading.spot.id.clone(), to);

            if from == to {
                continue;
            }

            let spot = Arc::clone(&reading.spot);
            let event = match (from, to) {
                (_, SpotStatus::Active) => ProximityEvent::Entered(spot),
                (SpotStatus::Active, now) => ProximityEvent::Vacated { spot, now },
                (from, to) => ProximityEvent::StatusChanged { spot, from, to },
            };
            tracing::debug!(spot = %reading.spot.id, %from, %to, "spot status changed");
            events.push(event);
        }

        TickReport { readings, events }
    }

    /// Forget everything, e.g. after a game reset
    pub fn clear(&mut self) {
        self.statuses.clear();
    }
}
