//! The hunt engine: state, proximity, tasks and the session tying them together.

pub mod admin;
pub mod location;
pub mod notice;
pub mod permissions;
pub mod proximity;
pub mod registration;
pub mod session;
pub mod state;
pub mod store;
pub mod task;
pub mod tracker;
pub mod tracking;

pub use notice::{Notice, NoticeLevel};
pub use proximity::{SpotReading, SpotStatus};
pub use session::{HuntSession, PositionOutcome, SessionError, TaskCompletion};
pub use state::{GameState, LocationSample};
pub use store::GameStore;
pub use tracking::{TrackingHandle, spawn_tracking};
