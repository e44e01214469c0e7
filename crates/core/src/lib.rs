pub mod backend;
pub mod config;
pub mod hunt;
pub mod persist;

// Re-export the spot model from the spots crate
pub use yessplora_api_types as api_types;
pub use yessplora_spots as spots;

pub use config::GameConfig;
pub use hunt::HuntSession;
