//! # yessplora-spots
//!
//! Treasure spot catalogue for the YESSplora hunt.
//!
//! ## Features
//!
//! - **Validated spots**: coordinates and activation radius are checked on creation
//! - **Distances**: Haversine on a fixed 6,371 km sphere
//! - **Stable ordering**: spots keep their insertion order, which decides task presentation
//!
//! ## Example
//!
//! ```
//! use yessplora_spots::prelude::*;
//! use chrono::Utc;
//! use geo::Point;
//!
//! let gate = SpotDraft::new("Gate", 11.2588, 75.7804)
//!     .into_spot(SpotIdentifier::new("1"), Utc::now())
//!     .unwrap();
//!
//! let mut registry = SpotRegistry::new();
//! registry.insert(gate);
//!
//! // Distance from the participant to every spot
//! let here = Point::new(75.7804, 11.2589);
//! let distances: Vec<f64> = registry
//!     .all_spots()
//!     .iter()
//!     .map(|spot| haversine_distance(here, spot.location()))
//!     .collect();
//! assert!(distances[0] < 20.0);
//! ```

pub mod identifiers;
pub mod models;
pub mod provider;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{traits::*, types::*};
    pub use crate::provider::registry::SpotRegistry;
    pub use crate::spatial::queries::haversine_distance;
}

pub use prelude::*;
