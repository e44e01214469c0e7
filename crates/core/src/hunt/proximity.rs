//! Stateless distance evaluation between a position fix and the spot list.

use std::sync::Arc;

use yessplora_spots::{TreasureSpot, haversine_distance};

use crate::hunt::state::LocationSample;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SpotStatus {
    /// No position fix yet
    Unknown,
    Far,
    Nearby,
    /// Within the spot's activation radius
    Active,
}

/// Classify a distance against a spot's activation radius and the shared
/// "nearby" ring. Both bounds are inclusive.
pub fn classify(distance_m: f64, radius_m: f64, nearby_radius_m: f64) -> SpotStatus {
    if distance_m <= radius_m {
        SpotStatus::Active
    } else if distance_m <= nearby_radius_m {
        SpotStatus::Nearby
    } else {
        SpotStatus::Far
    }
}

#[derive(Clone, Debug)]
pub struct SpotReading {
    pub spot: Arc<TreasureSpot>,
    pub distance_m: f64,
    pub status: SpotStatus,
}

/// One reading per spot, in list order. Empty when there is no fix.
pub fn evaluate(
    sample: Option<&LocationSample>,
    spots: &[Arc<TreasureSpot>],
    nearby_radius_m: f64,
) -> Vec<SpotReading> {
    let Some(sample) = sample else {
        return Vec::new();
    };

    let here = sample.location();
    spots
        .iter()
        .map(|spot| {
            let distance_m = haversine_distance(here, spot.location());
            SpotReading {
                spot: Arc::clone(spot),
                distance_m,
                status: classify(distance_m, spot.radius, nearby_radius_m),
            }
        })
        .collect()
}

/// Spots whose activation radius contains the fix, in list order. The first
/// entry is the one a caller should present.
pub fn active_spots(
    sample: Option<&LocationSample>,
    spots: &[Arc<TreasureSpot>],
    nearby_radius_m: f64,
) -> Vec<Arc<TreasureSpot>> {
    evaluate(sample, spots, nearby_radius_m)
        .into_iter()
        .filter(|reading| reading.status == SpotStatus::Active)
        .map(|reading| reading.spot)
        .collect()
}

/// Human-friendly distance: whole meters below 1 km, one decimal of km above.
pub fn format_distance(distance_m: f64) -> String {
    if distance_m < 1000.0 {
        format!("{}m", distance_m.round() as i64)
    } else {
        format!("{:.1}km", distance_m / 1000.0)
    }
}
