//! Distance calculations.

pub mod queries;

pub use queries::{haversine_distance, EARTH_RADIUS_M};
