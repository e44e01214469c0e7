//! Treasure spot models, types, and traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::SpotProvider;
pub use types::{Result, SpotDraft, SpotError, TreasureSpot, DEFAULT_ACTIVATION_RADIUS_M};
