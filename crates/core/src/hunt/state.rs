use chrono::Utc;
use serde::{Deserialize, Serialize};

use yessplora_api_types::ParticipantRecord;
use yessplora_spots::{SpotRegistry, TaskIdentifier, TreasureSpot};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    /// Stored uppercased
    pub ticket_id: String,
    pub is_authenticated: bool,
}

/// One fix from the position feed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters
    pub accuracy: f64,
    /// Capture time, milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, timestamp: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
        }
    }

    /// A sample stamped with the current time
    pub fn now(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self::new(latitude, longitude, accuracy, Utc::now().timestamp_millis())
    }

    pub fn location(&self) -> geo::Point {
        geo::Point::new(self.longitude, self.latitude)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameProgress {
    pub is_started: bool,
    /// Completed task ids in completion order, without duplicates
    completed_tasks: Vec<TaskIdentifier>,
    pub current_location: Option<LocationSample>,
}

impl GameProgress {
    pub fn completed_tasks(&self) -> &[TaskIdentifier] {
        &self.completed_tasks
    }

    pub fn is_completed(&self, task: &TaskIdentifier) -> bool {
        self.completed_tasks.contains(task)
    }

    pub fn completed_count(&self) -> usize {
        self.completed_tasks.len()
    }

    /// Returns `false` if the task was already complete.
    pub(crate) fn insert(&mut self, task: TaskIdentifier) -> bool {
        if self.is_completed(&task) {
            return false;
        }
        self.completed_tasks.push(task);
        true
    }

    pub(crate) fn replace_completed(&mut self, tasks: impl IntoIterator<Item = TaskIdentifier>) {
        self.completed_tasks.clear();
        for task in tasks {
            self.insert(task);
        }
    }

    /// Rounded percentage of `total_tasks`, clamped to 100
    pub fn progress(&self, total_tasks: u32) -> u8 {
        if total_tasks == 0 {
            return 0;
        }
        let ratio = self.completed_tasks.len() as f64 / total_tasks as f64;
        (ratio * 100.0).round().min(100.0) as u8
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PermissionState {
    pub camera: bool,
    pub location: bool,
}

impl PermissionState {
    pub fn all_granted(&self) -> bool {
        self.camera && self.location
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_enabled: true,
            notifications_enabled: true,
        }
    }
}

/// Session-only admin data; never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminState {
    pub is_logged_in: bool,
    pub treasure_spots: SpotRegistry,
    pub participants: Vec<ParticipantRecord>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameState {
    pub user: UserProfile,
    pub game: GameProgress,
    pub admin: AdminState,
    pub permissions: PermissionState,
    pub settings: Settings,
}

// ============================================================================
// Partial updates
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub ticket_id: Option<String>,
    pub is_authenticated: Option<bool>,
}

impl UserUpdate {
    /// Full identity replacement used by registration
    pub fn identity(name: impl Into<String>, ticket_id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ticket_id: Some(ticket_id.into()),
            is_authenticated: Some(true),
        }
    }

    pub(crate) fn apply(self, user: &mut UserProfile) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(ticket_id) = self.ticket_id {
            user.ticket_id = ticket_id;
        }
        if let Some(is_authenticated) = self.is_authenticated {
            user.is_authenticated = is_authenticated;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GameUpdate {
    pub is_started: Option<bool>,
    /// Replaces the completed set; duplicates are dropped
    pub completed_tasks: Option<Vec<TaskIdentifier>>,
    /// `Some(None)` clears the location
    pub current_location: Option<Option<LocationSample>>,
}

impl GameUpdate {
    pub fn started(is_started: bool) -> Self {
        Self {
            is_started: Some(is_started),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, game: &mut GameProgress) {
        if let Some(is_started) = self.is_started {
            game.is_started = is_started;
        }
        if let Some(tasks) = self.completed_tasks {
            game.replace_completed(tasks);
        }
        if let Some(location) = self.current_location {
            game.current_location = location;
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AdminUpdate {
    pub is_logged_in: Option<bool>,
    pub treasure_spots: Option<Vec<TreasureSpot>>,
    pub participants: Option<Vec<ParticipantRecord>>,
}

impl AdminUpdate {
    pub fn logged_in(is_logged_in: bool) -> Self {
        Self {
            is_logged_in: Some(is_logged_in),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, admin: &mut AdminState) {
        if let Some(is_logged_in) = self.is_logged_in {
            admin.is_logged_in = is_logged_in;
        }
        if let Some(spots) = self.treasure_spots {
            admin.treasure_spots = SpotRegistry::from_spots(spots);
        }
        if let Some(participants) = self.participants {
            admin.participants = participants;
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PermissionUpdate {
    pub camera: Option<bool>,
    pub location: Option<bool>,
}

impl PermissionUpdate {
    pub(crate) fn apply(self, permissions: &mut PermissionState) {
        if let Some(camera) = self.camera {
            permissions.camera = camera;
        }
        if let Some(location) = self.location {
            permissions.location = location;
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SettingsUpdate {
    pub sound_enabled: Option<bool>,
    pub vibration_enabled: Option<bool>,
    pub notifications_enabled: Option<bool>,
}

impl SettingsUpdate {
    pub(crate) fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.sound_enabled {
            settings.sound_enabled = v;
        }
        if let Some(v) = self.vibration_enabled {
            settings.vibration_enabled = v;
        }
        if let Some(v) = self.notifications_enabled {
            settings.notifications_enabled = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> TaskIdentifier {
        TaskIdentifier::new(id)
    }

    #[test]
    fn progress_rounds_against_total() {
        let mut game = GameProgress::default();
        assert_eq!(game.progress(9), 0);

        game.insert(task("1"));
        assert_eq!(game.progress(9), 11);

        game.insert(task("2"));
        game.insert(task("3"));
        assert_eq!(game.progress(9), 33);

        game.insert(task("4"));
        game.insert(task("5"));
        assert_eq!(game.progress(9), 56);
    }

    #[test]
    fn duplicate_completion_does_not_count_twice() {
        let mut game = GameProgress::default();
        assert!(game.insert(task("1")));
        assert!(!game.insert(task("1")));
        assert_eq!(game.completed_count(), 1);
        assert_eq!(game.progress(9), 11);
    }

    #[test]
    fn progress_is_clamped() {
        let mut game = GameProgress::default();
        game.replace_completed((0..12).map(|i| task(&i.to_string())));
        assert_eq!(game.progress(9), 100);
        assert_eq!(game.progress(0), 0);
    }

    #[test]
    fn updates_only_touch_named_fields() {
        let mut user = UserProfile {
            name: "Alice".into(),
            ticket_id: "YESS009".into(),
            is_authenticated: true,
        };
        UserUpdate {
            name: Some("Alicia".into()),
            ..UserUpdate::default()
        }
        .apply(&mut user);

        assert_eq!(user.name, "Alicia");
        assert_eq!(user.ticket_id, "YESS009");
        assert!(user.is_authenticated);

        let mut settings = Settings::default();
        SettingsUpdate {
            sound_enabled: Some(false),
            ..SettingsUpdate::default()
        }
        .apply(&mut settings);
        assert!(!settings.sound_enabled);
        assert!(settings.vibration_enabled);
    }

    #[test]
    fn game_update_can_clear_location() {
        let mut game = GameProgress {
            current_location: Some(LocationSample::new(11.0, 75.0, 5.0, 0)),
            ..GameProgress::default()
        };

        GameUpdate::started(true).apply(&mut game);
        assert!(game.current_location.is_some());

        GameUpdate {
            current_location: Some(None),
            ..GameUpdate::default()
        }
        .apply(&mut game);
        assert!(game.current_location.is_none());
        assert!(game.is_started);
    }

    #[test]
    fn game_update_dedups_completed() {
        let mut game = GameProgress::default();
        GameUpdate {
            completed_tasks: Some(vec![task("1"), task("2"), task("1")]),
            ..GameUpdate::default()
        }
        .apply(&mut game);
        assert_eq!(game.completed_tasks(), &[task("1"), task("2")]);
    }
}
