//! One participant's hunt: the store plus the proximity, task and notice
//! plumbing that reacts to it.

use std::sync::Arc;

use yessplora_api_types::ParticipantRecord;
use yessplora_spots::{SpotDraft, SpotError, SpotIdentifier, SpotProvider, TreasureSpot};

use crate::config::GameConfig;
use crate::hunt::admin::{AdminAuthenticator, StaticCredentials};
use crate::hunt::location::PositionError;
use crate::hunt::notice::Notice;
use crate::hunt::permissions::PermissionOutcome;
use crate::hunt::proximity::{SpotReading, evaluate};
use crate::hunt::registration::{Registration, RegistrationErrors, validate_registration};
use crate::hunt::state::{
    AdminUpdate, GameState, GameUpdate, LocationSample, PermissionUpdate, SettingsUpdate, UserUpdate,
};
use crate::hunt::store::GameStore;
use crate::hunt::task::TaskFlow;
use crate::hunt::tracker::ProximityTracker;
use crate::persist::StateStorage;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Registration(#[from] RegistrationErrors),

    #[error("Please register before starting the hunt")]
    NotRegistered,

    #[error("Please grant all required permissions to continue")]
    PermissionsMissing,

    #[error("Admin login required")]
    AdminRequired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No task is open")]
    NoTaskPresented,

    #[error(transparent)]
    Spot(#[from] SpotError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Result of feeding one position fix through the session.
#[derive(Clone, Debug)]
pub struct PositionOutcome {
    pub readings: Vec<SpotReading>,
    /// Spot whose task was opened by this fix, if any
    pub presented: Option<Arc<TreasureSpot>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskCompletion {
    pub spot: Arc<TreasureSpot>,
    /// `false` when the task had already been completed
    pub newly_completed: bool,
    /// Ordinal of this completion (1-based), used as the sheet task column
    pub task_number: usize,
    pub progress: u8,
}

pub struct HuntSession {
    config: GameConfig,
    store: GameStore,
    tracker: ProximityTracker,
    tasks: TaskFlow,
    authenticator: Box<dyn AdminAuthenticator>,
    notices: Vec<Notice>,
}

impl HuntSession {
    /// In-memory session; nothing survives a restart
    pub fn new(config: GameConfig) -> Self {
        let store = GameStore::new(&config);
        Self::with_store(config, store)
    }

    /// Session restored from (and persisting to) `storage`
    pub fn with_storage(config: GameConfig, storage: Box<dyn StateStorage>) -> Self {
        let store = GameStore::restore(&config, storage);
        Self::with_store(config, store)
    }

    pub fn with_store(config: GameConfig, store: GameStore) -> Self {
        let authenticator = Box::new(StaticCredentials::new(config.admin.clone()));
        Self {
            tracker: ProximityTracker::new(config.nearby_radius_m),
            tasks: TaskFlow::new(),
            config,
            store,
            authenticator,
            notices: Vec::new(),
        }
    }

    pub fn with_authenticator(mut self, authenticator: Box<dyn AdminAuthenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn progress(&self) -> u8 {
        self.store.progress()
    }

    pub fn spots(&self) -> Vec<Arc<TreasureSpot>> {
        self.state().admin.treasure_spots.all_spots()
    }

    /// Distance and status of every spot from the last known position
    pub fn readings(&self) -> Vec<SpotReading> {
        evaluate(
            self.state().game.current_location.as_ref(),
            &self.spots(),
            self.config.nearby_radius_m,
        )
    }

    pub fn presented_task(&self) -> Option<&Arc<TreasureSpot>> {
        self.tasks.presented()
    }

    /// Drain queued user-facing notices, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn notify(&mut self, notice: Notice) {
        tracing::debug!(level = %notice.level, message = %notice.message, "notice");
        self.notices.push(notice);
    }

    // ------------------------------------------------------------------
    // Onboarding
    // ------------------------------------------------------------------

    pub fn register(&mut self, name: &str, ticket_id: &str) -> Result<Registration> {
        let registration = validate_registration(name, ticket_id)?;
        self.store.set_user(UserUpdate::identity(
            registration.name.clone(),
            registration.ticket_id.clone(),
        ));
        tracing::info!(ticket = %registration.ticket_id, "participant registered");
        self.notify(Notice::success(format!("Welcome, {}!", registration.name)));
        Ok(registration)
    }

    /// Record the outcome of the onboarding probes
    pub fn apply_permission_outcome(&mut self, outcome: &PermissionOutcome) {
        let camera = outcome.camera.is_ok();
        let location = outcome.location.is_ok();

        if let Ok(sample) = &outcome.location {
            self.store.update_location(*sample);
        }
        self.set_permissions(camera, location);

        if let Err(error) = &outcome.camera {
            self.notify(Notice::error(error.to_string()));
        }
        if let Err(error) = &outcome.location {
            self.notify(Notice::error(error.to_string()));
        }
    }

    pub fn set_permissions(&mut self, camera: bool, location: bool) {
        self.store.set_permissions(PermissionUpdate {
            camera: Some(camera),
            location: Some(location),
        });
        if self.state().permissions.all_granted() {
            self.notify(Notice::success("All permissions granted!"));
        }
    }

    pub fn start_game(&mut self) -> Result<()> {
        let state = self.state();
        let blocked = if !state.user.is_authenticated {
            Some(SessionError::NotRegistered)
        } else if !state.permissions.all_granted() {
            Some(SessionError::PermissionsMissing)
        } else {
            None
        };
        if let Some(error) = blocked {
            self.notify(Notice::error(error.to_string()));
            return Err(error);
        }
        if self.state().game.is_started {
            return Ok(());
        }

        self.store.set_game_state(GameUpdate::started(true));
        self.tracker.clear();
        tracing::info!("hunt started");
        self.notify(Notice::success("The hunt is on!"));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Hunt loop
    // ------------------------------------------------------------------

    /// Store the fix, update every spot's status, and open a task if the
    /// participant just walked into an unfinished spot.
    ///
    /// Before the game starts the tracker is left untouched, so a spot the
    /// participant already stands in still fires on the first started tick.
    pub fn on_position(&mut self, sample: LocationSample) -> PositionOutcome {
        self.store.update_location(sample);

        if !self.state().game.is_started {
            return PositionOutcome {
                readings: self.readings(),
                presented: None,
            };
        }

        let spots = self.spots();
        let report = self.tracker.tick(&sample, &spots);

        let game = &self.store.state().game;
        let presented = self.tasks.on_tick(&report, |task| game.is_completed(task));

        if let Some(spot) = &presented {
            tracing::info!(spot = %spot.id, "task presented");
            self.notify(Notice::success(format!("Treasure spot detected: {}!", spot.name)));
        }

        PositionOutcome {
            readings: report.readings,
            presented,
        }
    }

    pub fn on_position_error(&mut self, error: &PositionError) {
        tracing::warn!(%error, "location tracking error");
        if matches!(error, PositionError::PermissionDenied) {
            self.store.set_permissions(PermissionUpdate {
                location: Some(false),
                ..PermissionUpdate::default()
            });
        }
        self.notify(Notice::error("Location tracking failed"));
    }

    pub fn complete_presented(&mut self) -> Result<TaskCompletion> {
        let spot = self.tasks.complete().ok_or(SessionError::NoTaskPresented)?;
        let newly_completed = self.store.complete_task(spot.task_id());
        let task_number = self.state().game.completed_count();
        let progress = self.progress();

        if newly_completed {
            tracing::info!(spot = %spot.id, progress, "task completed");
            self.notify(Notice::success("Task completed!"));
        }

        Ok(TaskCompletion {
            spot,
            newly_completed,
            task_number,
            progress,
        })
    }

    pub fn cancel_presented(&mut self) -> Option<Arc<TreasureSpot>> {
        self.tasks.cancel()
    }

    /// A QR payload naming a spot id opens that spot's task directly.
    pub fn scan_qr(&mut self, payload: &str) -> Option<Arc<TreasureSpot>> {
        let id = SpotIdentifier::new(payload.trim());
        let Some(spot) = self.state().admin.treasure_spots.get_spot(&id) else {
            self.notify(Notice::info(format!("QR Code detected: {}", payload.trim())));
            return None;
        };

        if self.state().game.is_completed(&spot.task_id()) {
            self.notify(Notice::info(format!("{} is already completed", spot.name)));
            return None;
        }

        self.tasks.present(Arc::clone(&spot));
        self.notify(Notice::success(format!("Treasure spot detected: {}!", spot.name)));
        Some(spot)
    }

    pub fn set_settings(&mut self, update: SettingsUpdate) {
        self.store.set_settings(update);
    }

    /// Fresh game for the same participant; spots are kept
    pub fn reset_game(&mut self) {
        self.store.reset_game();
        self.tracker.clear();
        self.tasks.clear();
        tracing::info!("game reset");
        self.notify(Notice::info("Game reset"));
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub fn admin_login(&mut self, username: &str, password: &str) -> Result<()> {
        if !self.authenticator.verify(username, password) {
            tracing::warn!("rejected admin login");
            self.notify(Notice::error("Invalid credentials"));
            return Err(SessionError::InvalidCredentials);
        }
        self.store.set_admin_state(AdminUpdate::logged_in(true));
        self.notify(Notice::success("Admin login successful"));
        Ok(())
    }

    pub fn admin_logout(&mut self) {
        self.store.set_admin_state(AdminUpdate::logged_in(false));
    }

    pub fn is_admin(&self) -> bool {
        self.state().admin.is_logged_in
    }

    pub fn add_spot(&mut self, draft: SpotDraft) -> Result<TreasureSpot> {
        self.require_admin()?;
        let spot = self.store.add_treasure_spot(draft)?;
        tracing::info!(spot = %spot.id, name = %spot.name, "treasure spot added");
        self.notify(Notice::success("Treasure spot added successfully!"));
        Ok(spot)
    }

    /// Returns `false` if no spot had this id
    pub fn remove_spot(&mut self, id: &SpotIdentifier) -> Result<bool> {
        self.require_admin()?;
        let removed = self.store.remove_treasure_spot(id);
        if removed {
            self.tasks.dismiss_spot(id);
            tracing::info!(spot = %id, "treasure spot removed");
            self.notify(Notice::success("Treasure spot removed"));
        }
        Ok(removed)
    }

    pub fn set_participants(&mut self, participants: Vec<ParticipantRecord>) {
        self.store.set_admin_state(AdminUpdate {
            participants: Some(participants),
            ..AdminUpdate::default()
        });
    }

    fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(SessionError::AdminRequired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminCredentials;
    use crate::hunt::location::PositionError;
    use crate::hunt::notice::NoticeLevel;
    use crate::hunt::permissions::CameraError;

    const GATE: (f64, f64) = (11.2588, 75.7804);

    fn config() -> GameConfig {
        GameConfig {
            admin: Some(AdminCredentials {
                username: "ops".into(),
                password: "pw".into(),
            }),
            ..GameConfig::default()
        }
    }

    fn ready_session() -> HuntSession {
        let mut session = HuntSession::new(config());
        session.register("Alice", "yess009").unwrap();
        session.set_permissions(true, true);
        session.start_game().unwrap();
        session.admin_login("ops", "pw").unwrap();
        session
            .add_spot(SpotDraft::new("Gate", GATE.0, GATE.1))
            .unwrap();
        session.take_notices();
        session
    }

    fn at(lat: f64, lon: f64) -> LocationSample {
        LocationSample::new(lat, lon, 5.0, 0)
    }

    #[test]
    fn start_requires_registration_and_permissions() {
        let mut session = HuntSession::new(config());
        assert!(matches!(session.start_game(), Err(SessionError::NotRegistered)));

        session.register("Alice", "YESS009").unwrap();
        session.set_permissions(true, false);
        assert!(matches!(session.start_game(), Err(SessionError::PermissionsMissing)));

        session.set_permissions(true, true);
        session.start_game().unwrap();
        assert!(session.state().game.is_started);
    }

    #[test]
    fn registration_uppercases_ticket() {
        let mut session = HuntSession::new(config());
        let registration = session.register(" Alice ", "yess009").unwrap();
        assert_eq!(registration.ticket_id, "YESS009");
        assert!(session.state().user.is_authenticated);

        let err = session.register("A", "!").unwrap_err();
        assert!(matches!(err, SessionError::Registration(_)));
    }

    #[test]
    fn entering_a_spot_presents_its_task_once() {
        let mut session = ready_session();

        let far = session.on_position(at(GATE.0 + 0.01, GATE.1));
        assert!(far.presented.is_none());

        let near = session.on_position(at(GATE.0 + 0.0001, GATE.1));
        assert_eq!(near.presented.unwrap().name, "Gate");
        assert_eq!(
            session.take_notices(),
            vec![Notice::success("Treasure spot detected: Gate!")]
        );

        // Still inside: no new edge, same task stays open
        assert!(session.on_position(at(GATE.0, GATE.1)).presented.is_none());
        assert_eq!(session.presented_task().unwrap().name, "Gate");
    }

    #[test]
    fn not_started_game_never_presents() {
        let mut session = HuntSession::new(config());
        session.admin_login("ops", "pw").unwrap();
        session.add_spot(SpotDraft::new("Gate", GATE.0, GATE.1)).unwrap();

        let outcome = session.on_position(at(GATE.0, GATE.1));
        assert!(outcome.presented.is_none());
        assert_eq!(outcome.readings.len(), 1);
    }

    #[test]
    fn starting_inside_a_spot_presents_it() {
        let mut session = HuntSession::new(config());
        session.register("Alice", "YESS009").unwrap();
        session.set_permissions(true, true);
        session.admin_login("ops", "pw").unwrap();
        session.add_spot(SpotDraft::new("Gate", GATE.0, GATE.1)).unwrap();

        assert!(session.on_position(at(GATE.0, GATE.1)).presented.is_none());
        session.start_game().unwrap();

        let outcome = session.on_position(at(GATE.0, GATE.1));
        assert_eq!(outcome.presented.unwrap().name, "Gate");
        for _ in 0..4 {
            assert!(session.on_position(at(GATE.0, GATE.1)).presented.is_none());
        }
        assert_eq!(session.presented_task().unwrap().name, "Gate");
    }

    #[test]
    fn completing_updates_progress_and_is_not_re_presented() {
        let mut session = ready_session();
        session.on_position(at(GATE.0, GATE.1));

        let completion = session.complete_presented().unwrap();
        assert!(completion.newly_completed);
        assert_eq!(completion.task_number, 1);
        assert_eq!(completion.progress, 11);

        session.on_position(at(GATE.0 + 0.01, GATE.1));
        assert!(session.on_position(at(GATE.0, GATE.1)).presented.is_none());
        assert!(matches!(
            session.complete_presented(),
            Err(SessionError::NoTaskPresented)
        ));
    }

    #[test]
    fn cancelled_task_returns_on_next_entry() {
        let mut session = ready_session();
        session.on_position(at(GATE.0, GATE.1));
        assert!(session.cancel_presented().is_some());

        session.on_position(at(GATE.0 + 0.01, GATE.1));
        let again = session.on_position(at(GATE.0, GATE.1));
        assert!(again.presented.is_some());
    }

    #[test]
    fn qr_opens_known_spot_only() {
        let mut session = ready_session();
        let id = session.spots()[0].id.clone();

        assert!(session.scan_qr("not-a-spot").is_none());
        assert_eq!(session.take_notices()[0].level, NoticeLevel::Info);

        assert!(session.scan_qr(id.as_str()).is_some());
        session.complete_presented().unwrap();
        assert!(session.scan_qr(id.as_str()).is_none());
    }

    #[test]
    fn spot_edits_need_admin() {
        let mut session = HuntSession::new(config());
        let err = session
            .add_spot(SpotDraft::new("Gate", GATE.0, GATE.1))
            .unwrap_err();
        assert!(matches!(err, SessionError::AdminRequired));

        assert!(matches!(
            session.admin_login("ops", "wrong"),
            Err(SessionError::InvalidCredentials)
        ));
        assert!(!session.is_admin());
    }

    #[test]
    fn invalid_spot_is_rejected() {
        let mut session = ready_session();
        let err = session
            .add_spot(SpotDraft::new("Nowhere", 91.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, SessionError::Spot(SpotError::InvalidLatitude(_))));
        assert_eq!(session.spots().len(), 1);
    }

    #[test]
    fn removing_presented_spot_closes_it() {
        let mut session = ready_session();
        session.on_position(at(GATE.0, GATE.1));
        let id = session.presented_task().unwrap().id.clone();

        assert!(session.remove_spot(&id).unwrap());
        assert!(session.presented_task().is_none());
        assert!(!session.remove_spot(&id).unwrap());
    }

    #[test]
    fn permission_outcome_records_each_grant() {
        let mut session = HuntSession::new(config());
        session.apply_permission_outcome(&PermissionOutcome {
            camera: Err(CameraError::Denied),
            location: Ok(at(GATE.0, GATE.1)),
        });

        let permissions = session.state().permissions;
        assert!(!permissions.camera);
        assert!(permissions.location);
        assert!(session.state().game.current_location.is_some());
        assert_eq!(
            session.take_notices(),
            vec![Notice::error("Camera permission denied")]
        );
    }

    #[test]
    fn denied_tracking_revokes_location() {
        let mut session = ready_session();
        session.on_position_error(&PositionError::PermissionDenied);
        assert!(!session.state().permissions.location);
        assert_eq!(
            session.take_notices(),
            vec![Notice::error("Location tracking failed")]
        );
    }

    #[test]
    fn reset_keeps_participant_and_spots() {
        let mut session = ready_session();
        session.on_position(at(GATE.0, GATE.1));
        session.complete_presented().unwrap();

        session.reset_game();
        assert_eq!(session.progress(), 0);
        assert!(!session.state().game.is_started);
        assert!(session.state().user.is_authenticated);
        assert_eq!(session.spots().len(), 1);
        assert!(session.presented_task().is_none());
    }
}
