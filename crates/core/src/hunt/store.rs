use chrono::{DateTime, Utc};

use yessplora_spots::{
    SpotDraft, SpotError, SpotIdentifier, SpotProvider, TaskIdentifier, TreasureSpot,
};

use crate::config::GameConfig;
use crate::hunt::state::*;
use crate::persist::{Persister, Snapshot, StateStorage};

/// Notified after every committed mutation.
pub trait StoreObserver: Send {
    fn committed(&mut self, state: &GameState);
}

/// Single source of truth for a participant's hunt.
///
/// Every mutation goes through a named operation, is applied in place, and
/// is then handed to each observer before the call returns.
pub struct GameStore {
    state: GameState,
    total_tasks: u32,
    default_radius_m: f64,
    last_spot_millis: i64,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl GameStore {
    /// A fresh store with no persistence attached
    pub fn new(config: &GameConfig) -> Self {
        Self {
            state: GameState::default(),
            total_tasks: config.total_tasks,
            default_radius_m: config.activation_radius_m,
            last_spot_millis: 0,
            observers: Vec::new(),
        }
    }

    /// Restore from `storage` and keep persisting into it.
    ///
    /// An absent or unreadable snapshot silently yields the default state.
    pub fn restore(config: &GameConfig, storage: Box<dyn StateStorage>) -> Self {
        let mut store = Self::new(config);

        match storage.load(&config.storage_key) {
            Ok(Some(json)) => {
                if let Some(snapshot) = Snapshot::decode(&json) {
                    snapshot.restore_into(&mut store.state);
                    tracing::info!(
                        completed = store.state.game.completed_count(),
                        "restored game snapshot"
                    );
                }
            }
            Ok(None) => tracing::debug!("no saved game snapshot"),
            Err(error) => tracing::warn!(%error, "failed to read game snapshot"),
        }

        store.observe(Box::new(Persister::new(
            storage,
            config.storage_key.clone(),
            config.total_tasks,
        )));
        store
    }

    pub fn observe(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn total_tasks(&self) -> u32 {
        self.total_tasks
    }

    /// Derived progress percentage
    pub fn progress(&self) -> u8 {
        self.state.game.progress(self.total_tasks)
    }

    pub fn set_user(&mut self, update: UserUpdate) {
        update.apply(&mut self.state.user);
        self.commit();
    }

    pub fn set_game_state(&mut self, update: GameUpdate) {
        update.apply(&mut self.state.game);
        self.commit();
    }

    pub fn set_admin_state(&mut self, update: AdminUpdate) {
        update.apply(&mut self.state.admin);
        self.commit();
    }

    pub fn set_permissions(&mut self, update: PermissionUpdate) {
        update.apply(&mut self.state.permissions);
        self.commit();
    }

    pub fn set_settings(&mut self, update: SettingsUpdate) {
        update.apply(&mut self.state.settings);
        self.commit();
    }

    /// Replace the current location; no smoothing or accuracy filtering
    pub fn update_location(&mut self, sample: LocationSample) {
        self.state.game.current_location = Some(sample);
        self.commit();
    }

    /// Mark a task complete. Returns `false` if it already was.
    pub fn complete_task(&mut self, task: TaskIdentifier) -> bool {
        let added = self.state.game.insert(task);
        self.commit();
        added
    }

    pub fn add_treasure_spot(&mut self, draft: SpotDraft) -> Result<TreasureSpot, SpotError> {
        self.add_treasure_spot_at(draft, Utc::now())
    }

    pub(crate) fn add_treasure_spot_at(
        &mut self,
        mut draft: SpotDraft,
        now: DateTime<Utc>,
    ) -> Result<TreasureSpot, SpotError> {
        draft.radius.get_or_insert(self.default_radius_m);
        draft.validate()?;

        let id = self.next_spot_id(now);
        let spot = draft.into_spot(id, now)?;
        self.state.admin.treasure_spots.insert(spot.clone());
        self.commit();

        Ok(spot)
    }

    /// Returns `false` (and changes nothing) if no spot has this id.
    pub fn remove_treasure_spot(&mut self, id: &SpotIdentifier) -> bool {
        let removed = self.state.admin.treasure_spots.remove(id).is_some();
        self.commit();
        removed
    }

    /// Back to a fresh game, keeping who the participant is and the admin's spots.
    pub fn reset_game(&mut self) {
        let user = std::mem::take(&mut self.state.user);
        let admin = std::mem::take(&mut self.state.admin);
        self.state = GameState {
            user,
            admin,
            ..GameState::default()
        };
        self.commit();
    }

    /// Time-based token, bumped past the last one issued so ids never collide.
    fn next_spot_id(&mut self, now: DateTime<Utc>) -> SpotIdentifier {
        let floor = self
            .state
            .admin
            .treasure_spots
            .all_spots()
            .iter()
            .filter_map(|spot| spot.id.as_str().parse::<i64>().ok())
            .max()
            .unwrap_or(0)
            .max(self.last_spot_millis);

        let millis = now.timestamp_millis().max(floor + 1);
        self.last_spot_millis = millis;
        SpotIdentifier::new(millis.to_string())
    }

    fn commit(&mut self) {
        for observer in &mut self.observers {
            observer.committed(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;
    use yessplora_spots::SpotProvider;

    use super::*;
    use crate::persist::MemoryStorage;

    struct CountingObserver(Arc<Mutex<usize>>);

    impl StoreObserver for CountingObserver {
        fn committed(&mut self, _state: &GameState) {
            *self.0.lock().unwrap() += 1;
        }
    }

    fn gate() -> SpotDraft {
        SpotDraft::new("Gate", 11.2588, 75.7804).with_task("Find the banner")
    }

    #[test]
    fn completing_three_tasks_is_a_third() {
        let mut store = GameStore::new(&GameConfig::default());
        for id in ["1", "2", "3"] {
            assert!(store.complete_task(TaskIdentifier::new(id)));
        }
        assert_eq!(store.progress(), 33);
    }

    #[test]
    fn recompleting_is_a_no_op() {
        let mut store = GameStore::new(&GameConfig::default());
        assert!(store.complete_task(TaskIdentifier::new("1")));
        assert!(!store.complete_task(TaskIdentifier::new("1")));
        assert_eq!(store.state().game.completed_count(), 1);
        assert_eq!(store.progress(), 11);
    }

    #[test]
    fn add_then_remove_spot() {
        let mut store = GameStore::new(&GameConfig::default());
        let spot = store.add_treasure_spot(gate()).unwrap();
        assert_eq!(spot.radius, 20.0);
        assert_eq!(store.state().admin.treasure_spots.len(), 1);

        assert!(store.remove_treasure_spot(&spot.id));
        assert!(store.state().admin.treasure_spots.is_empty());
    }

    #[test]
    fn removing_unknown_spot_leaves_list_unchanged() {
        let mut store = GameStore::new(&GameConfig::default());
        store.add_treasure_spot(gate()).unwrap();
        let before = store.state().admin.treasure_spots.clone();

        assert!(!store.remove_treasure_spot(&SpotIdentifier::new("nope")));
        assert_eq!(store.state().admin.treasure_spots, before);
    }

    #[test]
    fn invalid_spot_is_rejected_without_commit() {
        let commits = Arc::new(Mutex::new(0));
        let mut store = GameStore::new(&GameConfig::default());
        store.observe(Box::new(CountingObserver(Arc::clone(&commits))));

        let err = store
            .add_treasure_spot(SpotDraft::new("Nowhere", 120.0, 0.0))
            .unwrap_err();
        assert_eq!(err, SpotError::InvalidLatitude(120.0));
        assert_eq!(*commits.lock().unwrap(), 0);
    }

    #[test]
    fn spot_ids_are_unique_within_a_millisecond() {
        let mut store = GameStore::new(&GameConfig::default());
        let now = Utc.timestamp_millis_opt(1_720_000_000_000).unwrap();

        let a = store.add_treasure_spot_at(gate(), now).unwrap();
        let b = store.add_treasure_spot_at(gate(), now).unwrap();
        assert_eq!(a.id.as_str(), "1720000000000");
        assert_eq!(b.id.as_str(), "1720000000001");
    }

    #[test]
    fn configured_radius_applies_to_new_spots() {
        let config = GameConfig {
            activation_radius_m: 35.0,
            nearby_radius_m: 150.0,
            ..GameConfig::default()
        };
        let mut store = GameStore::new(&config);
        assert_eq!(store.add_treasure_spot(gate()).unwrap().radius, 35.0);
        assert_eq!(
            store.add_treasure_spot(gate().with_radius(5.0)).unwrap().radius,
            5.0
        );
    }

    #[test]
    fn reset_keeps_user_and_spots() {
        let mut store = GameStore::new(&GameConfig::default());
        store.set_user(UserUpdate::identity("Alice", "YESS009"));
        store.set_permissions(PermissionUpdate {
            camera: Some(true),
            location: Some(true),
        });
        store.set_game_state(GameUpdate::started(true));
        store.add_treasure_spot(gate()).unwrap();
        store.complete_task(TaskIdentifier::new("1"));

        store.reset_game();

        let state = store.state();
        assert_eq!(state.user.name, "Alice");
        assert_eq!(state.admin.treasure_spots.len(), 1);
        assert!(!state.game.is_started);
        assert_eq!(state.game.completed_count(), 0);
        assert!(!state.permissions.all_granted());
    }

    #[test]
    fn every_mutation_notifies_observers() {
        let commits = Arc::new(Mutex::new(0));
        let mut store = GameStore::new(&GameConfig::default());
        store.observe(Box::new(CountingObserver(Arc::clone(&commits))));

        store.set_settings(SettingsUpdate::default());
        store.update_location(LocationSample::new(11.0, 75.0, 3.0, 0));
        store.set_admin_state(AdminUpdate::logged_in(true));
        store.remove_treasure_spot(&SpotIdentifier::new("absent"));
        assert_eq!(*commits.lock().unwrap(), 4);
    }

    #[test]
    fn persist_then_reload_round_trip() {
        let config = GameConfig::default();
        let storage = MemoryStorage::new();

        let mut store = GameStore::restore(&config, Box::new(storage.clone()));
        store.complete_task(TaskIdentifier::new("1"));
        store.set_permissions(PermissionUpdate {
            camera: Some(true),
            location: None,
        });

        let reloaded = GameStore::restore(&config, Box::new(storage));
        assert_eq!(
            reloaded.state().game.completed_tasks(),
            &[TaskIdentifier::new("1")]
        );
        assert_eq!(reloaded.progress(), 11);
        // permissions are session-only
        assert!(!reloaded.state().permissions.camera);
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_defaults() {
        let config = GameConfig::default();
        let storage = MemoryStorage::with_entry(config.storage_key.clone(), "{{{");

        let store = GameStore::restore(&config, Box::new(storage));
        assert_eq!(store.state(), &GameState::default());
    }
}
