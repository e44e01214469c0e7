//! Spot catalogue providers.

pub mod registry;

pub use registry::SpotRegistry;
