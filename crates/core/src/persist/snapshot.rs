use serde::{Deserialize, Serialize};

use yessplora_spots::TaskIdentifier;

use crate::hunt::state::{GameState, GameUpdate, LocationSample, Settings, UserProfile};

/// The persisted subtree: user, game and settings. Admin and permission
/// state are session-only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub user: UserProfile,
    pub game: PersistedGame,
    pub settings: Settings,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedGame {
    pub is_started: bool,
    pub completed_tasks: Vec<TaskIdentifier>,
    pub current_location: Option<LocationSample>,
    /// Written for readers of the raw record; ignored on restore
    pub progress: u8,
}

impl Snapshot {
    pub fn capture(state: &GameState, total_tasks: u32) -> Self {
        Self {
            user: state.user.clone(),
            game: PersistedGame {
                is_started: state.game.is_started,
                completed_tasks: state.game.completed_tasks().to_vec(),
                current_location: state.game.current_location,
                progress: state.game.progress(total_tasks),
            },
            settings: state.settings,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a stored record. Missing fields take their defaults; anything
    /// malformed yields `None` so the caller can fall back to a fresh state.
    pub fn decode(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                tracing::warn!(%error, "discarding malformed game snapshot");
                None
            }
        }
    }

    /// Merge over `state`. Progress is recomputed from the completed set.
    pub fn restore_into(self, state: &mut GameState) {
        state.user = self.user;
        GameUpdate {
            is_started: Some(self.game.is_started),
            completed_tasks: Some(self.game.completed_tasks),
            current_location: Some(self.game.current_location),
        }
        .apply(&mut state.game);
        state.settings = self.settings;
    }
}
