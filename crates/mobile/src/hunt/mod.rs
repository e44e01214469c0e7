use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::Mutex;
use yessplora_core::api_types::{ParticipantRecord, TaskStatus};
use yessplora_core::backend::{BackendError, MockSheetsBackend, ParticipantBackend, SheetsClient};
use yessplora_core::config::{BackendConfig, ConfigError, GameConfig};
use yessplora_core::hunt::location::{ChannelLocationSource, LocationSource, PositionError};
use yessplora_core::hunt::permissions::{CameraError, PermissionOutcome, probe_location};
use yessplora_core::hunt::{HuntSession, Notice, SessionError, TrackingHandle, spawn_tracking};
use yessplora_core::persist::{SqliteStorage, StorageError};
use yessplora_core::spots::SpotIdentifier;

use crate::admin_server::AdminServer;

mod records;

pub use records::*;

const DATABASE_FILE: &str = "yessplora.db";

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum HuntError {
    #[error("{0}")]
    Session(String),
    #[error("{0}")]
    Backend(String),
    #[error("{0}")]
    Location(String),
    #[error("{0}")]
    Setup(String),
}

impl From<SessionError> for HuntError {
    fn from(error: SessionError) -> Self {
        Self::Session(error.to_string())
    }
}

impl From<BackendError> for HuntError {
    fn from(error: BackendError) -> Self {
        Self::Backend(error.to_string())
    }
}

impl From<PositionError> for HuntError {
    fn from(error: PositionError) -> Self {
        Self::Location(error.to_string())
    }
}

impl From<ConfigError> for HuntError {
    fn from(error: ConfigError) -> Self {
        Self::Setup(error.to_string())
    }
}

impl From<StorageError> for HuntError {
    fn from(error: StorageError) -> Self {
        Self::Setup(error.to_string())
    }
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct PermissionsView {
    pub camera: bool,
    pub location: bool,
}

/// One participant's hunt, driven by the host app.
///
/// The host pushes position fixes in; notices queue up until drained with
/// [`HuntHandle::take_notices`].
#[derive(uniffi::Object)]
pub struct HuntHandle {
    runtime: Runtime,
    session: Arc<Mutex<HuntSession>>,
    location: Arc<ChannelLocationSource>,
    backend: Arc<dyn ParticipantBackend>,
    tracking: std::sync::Mutex<Option<TrackingHandle>>,
    admin_server: std::sync::Mutex<Option<AdminServer>>,
}

#[uniffi::export]
impl HuntHandle {
    /// `storage_dir` holds the saved game; without one nothing survives a
    /// restart. `config_json` overrides any subset of the defaults.
    #[uniffi::constructor]
    pub fn new(storage_dir: Option<String>, config_json: Option<String>) -> Result<Self, HuntError> {
        let config = match config_json {
            Some(json) => GameConfig::from_json_str(&json)?,
            None => GameConfig::default(),
        };
        let runtime = Runtime::new().map_err(|e| HuntError::Setup(e.to_string()))?;
        let backend = select_backend(&config.backend);

        let session = match storage_dir {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                std::fs::create_dir_all(&dir).map_err(|e| HuntError::Setup(e.to_string()))?;
                let storage = SqliteStorage::open(dir.join(DATABASE_FILE))?;
                HuntSession::with_storage(config, Box::new(storage))
            }
            None => HuntSession::new(config),
        };

        Ok(Self {
            runtime,
            session: Arc::new(Mutex::new(session)),
            location: Arc::new(ChannelLocationSource::new()),
            backend,
            tracking: std::sync::Mutex::new(None),
            admin_server: std::sync::Mutex::new(None),
        })
    }

    // ------------------------------------------------------------------
    // Onboarding
    // ------------------------------------------------------------------

    /// Validate and store the participant, then save them to the sheet.
    /// A failed save only raises a notice.
    pub async fn register(&self, name: String, ticket_id: String) -> Result<(), HuntError> {
        let registration = self.session.lock().await.register(&name, &ticket_id)?;

        let record = ParticipantRecord::new(registration.name, registration.ticket_id);
        let backend = Arc::clone(&self.backend);
        let saved = self
            .runtime
            .spawn(async move { backend.save_participant(&record).await })
            .await;

        match saved {
            Ok(Ok(receipt)) => tracing::info!(row = receipt.row_number, "registration saved"),
            Ok(Err(error)) => self.backend_failed(&error).await,
            Err(error) => tracing::error!(%error, "registration save task failed"),
        }
        Ok(())
    }

    /// Probe location once (bounded by the configured timeout) and record
    /// it together with the host's camera answer.
    pub async fn request_permissions(&self, camera_granted: bool) -> PermissionsView {
        let source = Arc::clone(&self.location);
        let timeout = self.session.lock().await.config().probe_timeout();

        let location = self
            .runtime
            .spawn(async move { probe_location(source.as_ref(), timeout).await })
            .await
            .unwrap_or_else(|e| Err(PositionError::Unavailable(e.to_string())));

        let outcome = PermissionOutcome {
            camera: if camera_granted { Ok(()) } else { Err(CameraError::Denied) },
            location,
        };

        let mut session = self.session.lock().await;
        session.apply_permission_outcome(&outcome);
        let permissions = session.state().permissions;
        PermissionsView {
            camera: permissions.camera,
            location: permissions.location,
        }
    }

    pub fn grant_permissions(&self, camera: bool, location: bool) {
        self.session.blocking_lock().set_permissions(camera, location);
    }

    pub fn start_game(&self) -> Result<(), HuntError> {
        Ok(self.session.blocking_lock().start_game()?)
    }

    // ------------------------------------------------------------------
    // Position feed
    // ------------------------------------------------------------------

    pub fn push_position(&self, fix: LocationFix) {
        self.location.publish(Ok(fix.into()));
    }

    pub fn push_position_error(&self, message: String, permission_denied: bool) {
        let error = if permission_denied {
            PositionError::PermissionDenied
        } else {
            PositionError::Unavailable(message)
        };
        self.location.publish(Err(error));
    }

    /// Start feeding pushed fixes into the hunt. Restarting replaces the
    /// previous tracking task.
    pub fn start_tracking(&self) {
        let _guard = self.runtime.enter();
        let handle = spawn_tracking(Arc::clone(&self.session), self.location.watch());
        if let Some(mut previous) = self.tracking_slot().replace(handle) {
            previous.cancel();
        }
    }

    pub fn stop_tracking(&self) {
        if let Some(mut handle) = self.tracking_slot().take() {
            handle.cancel();
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // ------------------------------------------------------------------
    // Hunt
    // ------------------------------------------------------------------

    pub fn spots(&self) -> Vec<SpotView> {
        let session = self.session.blocking_lock();
        let game = &session.state().game;
        let readings = session.readings();

        if readings.is_empty() {
            return session
                .spots()
                .iter()
                .map(|spot| SpotView::from_spot(spot, game.is_completed(&spot.task_id())))
                .collect();
        }

        readings
            .iter()
            .map(|reading| {
                SpotView::from_reading(reading, game.is_completed(&reading.spot.task_id()))
            })
            .collect()
    }

    pub fn presented_task(&self) -> Option<SpotView> {
        let session = self.session.blocking_lock();
        session
            .presented_task()
            .map(|spot| SpotView::from_spot(spot, false))
    }

    /// Complete the open task and mirror it to the sheet. A failed sheet
    /// update only raises a notice.
    pub async fn complete_task(&self) -> Result<TaskResult, HuntError> {
        let (completion, ticket_id) = {
            let mut session = self.session.lock().await;
            let completion = session.complete_presented()?;
            (completion, session.state().user.ticket_id.clone())
        };

        if completion.newly_completed {
            let backend = Arc::clone(&self.backend);
            let task_number = completion.task_number;
            let updated = self
                .runtime
                .spawn(async move {
                    backend
                        .update_task_completion(&ticket_id, task_number, TaskStatus::Completed)
                        .await
                })
                .await;

            match updated {
                Ok(Ok(())) => {}
                Ok(Err(error)) => self.backend_failed(&error).await,
                Err(error) => tracing::error!(%error, "task update failed to run"),
            }
        }

        Ok(TaskResult::from(&completion))
    }

    pub fn cancel_task(&self) -> Option<SpotView> {
        self.session
            .blocking_lock()
            .cancel_presented()
            .map(|spot| SpotView::from_spot(&spot, false))
    }

    pub fn scan_qr(&self, payload: String) -> Option<SpotView> {
        self.session
            .blocking_lock()
            .scan_qr(&payload)
            .map(|spot| SpotView::from_spot(&spot, false))
    }

    pub fn progress(&self) -> u8 {
        self.session.blocking_lock().progress()
    }

    pub fn completed_tasks(&self) -> Vec<String> {
        self.session
            .blocking_lock()
            .state()
            .game
            .completed_tasks()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn last_location(&self) -> Option<LocationFix> {
        self.session
            .blocking_lock()
            .state()
            .game
            .current_location
            .map(LocationFix::from)
    }

    pub fn take_notices(&self) -> Vec<NoticeView> {
        self.session
            .blocking_lock()
            .take_notices()
            .into_iter()
            .map(NoticeView::from)
            .collect()
    }

    pub fn settings(&self) -> SettingsView {
        self.session.blocking_lock().state().settings.into()
    }

    pub fn set_settings(&self, settings: SettingsView) {
        self.session.blocking_lock().set_settings(settings.into());
    }

    pub fn reset_game(&self) {
        self.stop_tracking();
        self.session.blocking_lock().reset_game();
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub fn admin_login(&self, username: String, password: String) -> Result<(), HuntError> {
        Ok(self.session.blocking_lock().admin_login(&username, &password)?)
    }

    pub fn admin_logout(&self) {
        self.session.blocking_lock().admin_logout();
    }

    pub fn add_spot(&self, input: SpotInput) -> Result<SpotView, HuntError> {
        let spot = self.session.blocking_lock().add_spot(input.into())?;
        Ok(SpotView::from_spot(&spot, false))
    }

    pub fn remove_spot(&self, id: String) -> Result<bool, HuntError> {
        Ok(self
            .session
            .blocking_lock()
            .remove_spot(&SpotIdentifier::new(id))?)
    }

    /// Pull every participant row into the admin state
    pub async fn refresh_participants(&self) -> Result<u32, HuntError> {
        let backend = Arc::clone(&self.backend);
        let participants = self
            .runtime
            .spawn(async move { backend.get_participants().await })
            .await
            .map_err(|e| HuntError::Backend(e.to_string()))??;

        let count = participants.len() as u32;
        self.session.lock().await.set_participants(participants);
        Ok(count)
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardRow>, HuntError> {
        let backend = Arc::clone(&self.backend);
        let entries = self
            .runtime
            .spawn(async move { backend.get_leaderboard().await })
            .await
            .map_err(|e| HuntError::Backend(e.to_string()))??;

        Ok(entries.into_iter().map(LeaderboardRow::from).collect())
    }

    /// Start the local admin HTTP server (once) and return its port
    pub fn start_admin_server(&self) -> Result<u16, HuntError> {
        let mut slot = self
            .admin_server
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(server) = slot.as_ref() {
            return Ok(server.port());
        }

        let server = AdminServer::start(Arc::clone(&self.session), Arc::clone(&self.backend))
            .map_err(|e| HuntError::Setup(format!("{e:#}")))?;
        let port = server.port();
        *slot = Some(server);
        Ok(port)
    }
}

impl HuntHandle {
    fn tracking_slot(&self) -> std::sync::MutexGuard<'_, Option<TrackingHandle>> {
        self.tracking
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn backend_failed(&self, error: &BackendError) {
        tracing::warn!(%error, "participant backend call failed");
        self.session
            .lock()
            .await
            .notify(Notice::error("Failed to sync with the participant sheet"));
    }
}

/// The real sheet when fully configured, otherwise the mock
fn select_backend(config: &BackendConfig) -> Arc<dyn ParticipantBackend> {
    if config.api_key.is_some() {
        if config.access_token.is_none() {
            tracing::warn!("no sheets access token; registrations and completions will not sync");
        }
        match SheetsClient::new(config) {
            Ok(client) => return Arc::new(client),
            Err(error) => tracing::warn!(%error, "falling back to mock participant backend"),
        }
    }
    Arc::new(MockSheetsBackend::new(config))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use yessplora_core::hunt::LocationSample;

    use super::*;

    const CONFIG: &str = r#"{
        "admin": { "username": "ops", "password": "pw" },
        "backend": {
            "saveLatencyMs": 0,
            "listLatencyMs": 0,
            "updateLatencyMs": 0,
            "leaderboardLatencyMs": 0
        }
    }"#;

    fn handle() -> HuntHandle {
        HuntHandle::new(None, Some(CONFIG.into())).unwrap()
    }

    fn fix(latitude: f64, longitude: f64) -> LocationFix {
        LocationFix {
            latitude,
            longitude,
            accuracy: 5.0,
            timestamp: 0,
        }
    }

    fn block_on<F: std::future::Future>(handle: &HuntHandle, future: F) -> F::Output {
        handle.runtime.block_on(future)
    }

    fn wait_for(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !done() {
            assert!(Instant::now() < deadline, "condition never held");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn tracked_hunt_end_to_end() {
        let hunt = handle();
        block_on(&hunt, hunt.register("Alice".into(), "yess009".into())).unwrap();
        hunt.grant_permissions(true, true);
        hunt.start_game().unwrap();

        hunt.admin_login("ops".into(), "pw".into()).unwrap();
        let gate = hunt
            .add_spot(SpotInput {
                name: "Gate".into(),
                description: String::new(),
                task: "Take a selfie".into(),
                latitude: 11.2588,
                longitude: 75.7804,
                radius: None,
            })
            .unwrap();
        assert_eq!(gate.radius, 20.0);

        hunt.start_tracking();
        assert!(hunt.is_tracking());
        hunt.push_position(fix(11.2588, 75.7804));
        wait_for(|| hunt.presented_task().is_some());

        let spots = hunt.spots();
        assert_eq!(spots[0].status, ProximityStatus::Active);
        assert_eq!(spots[0].distance_label.as_deref(), Some("0m"));

        let result = block_on(&hunt, hunt.complete_task()).unwrap();
        assert!(result.newly_completed);
        assert_eq!(result.progress, 11);
        assert_eq!(hunt.completed_tasks(), vec![gate.id]);

        hunt.stop_tracking();
        assert!(!hunt.is_tracking());
    }

    #[test]
    fn start_is_gated() {
        let hunt = handle();
        assert!(matches!(hunt.start_game(), Err(HuntError::Session(_))));
    }

    #[test]
    fn location_probe_sees_pushed_fix() {
        let hunt = handle();
        let pusher = {
            let location = Arc::clone(&hunt.location);
            std::thread::spawn(move || {
                let deadline = Instant::now() + Duration::from_secs(2);
                while location.active_watches() == 0 && Instant::now() < deadline {
                    std::thread::sleep(Duration::from_millis(5));
                }
                location.publish(Ok(LocationSample::new(11.2588, 75.7804, 5.0, 1)));
            })
        };

        let permissions = block_on(&hunt, hunt.request_permissions(false));
        pusher.join().unwrap();

        assert!(!permissions.camera);
        assert!(permissions.location);
        assert!(hunt.last_location().is_some());
    }

    #[test]
    fn leaderboard_and_participants_come_from_backend() {
        let hunt = handle();
        let board = block_on(&hunt, hunt.leaderboard()).unwrap();
        assert_eq!(board.len(), 5);
        assert_eq!(board[0].name, "Alice Johnson");

        let count = block_on(&hunt, hunt.refresh_participants()).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn saved_game_survives_restart() {
        let dir = std::env::temp_dir().join(format!("yessplora-mobile-{}", std::process::id()));
        let dir_str = dir.to_string_lossy().into_owned();

        {
            let hunt = HuntHandle::new(Some(dir_str.clone()), Some(CONFIG.into())).unwrap();
            block_on(&hunt, hunt.register("Bob".into(), "YESS010".into())).unwrap();
            hunt.set_settings(SettingsView {
                sound_enabled: false,
                vibration_enabled: true,
                notifications_enabled: true,
            });
        }

        let hunt = HuntHandle::new(Some(dir_str), Some(CONFIG.into())).unwrap();
        assert!(!hunt.settings().sound_enabled);
        drop(hunt);
        let _ = std::fs::remove_dir_all(dir);
    }
}
