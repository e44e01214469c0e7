//! Plain records crossing the FFI boundary.

use yessplora_core::api_types::LeaderboardEntry;
use yessplora_core::hunt::proximity::format_distance;
use yessplora_core::hunt::state::{LocationSample, Settings, SettingsUpdate};
use yessplora_core::hunt::{Notice, NoticeLevel, SpotReading, SpotStatus, TaskCompletion};
use yessplora_core::spots::{SpotDraft, TreasureSpot};

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl From<LocationFix> for LocationSample {
    fn from(fix: LocationFix) -> Self {
        LocationSample::new(fix.latitude, fix.longitude, fix.accuracy, fix.timestamp)
    }
}

impl From<LocationSample> for LocationFix {
    fn from(sample: LocationSample) -> Self {
        Self {
            latitude: sample.latitude,
            longitude: sample.longitude,
            accuracy: sample.accuracy,
            timestamp: sample.timestamp,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum ProximityStatus {
    Unknown,
    Far,
    Nearby,
    Active,
}

impl From<SpotStatus> for ProximityStatus {
    fn from(status: SpotStatus) -> Self {
        match status {
            SpotStatus::Unknown => Self::Unknown,
            SpotStatus::Far => Self::Far,
            SpotStatus::Nearby => Self::Nearby,
            SpotStatus::Active => Self::Active,
        }
    }
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct SpotView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub task: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub completed: bool,
    pub distance_m: Option<f64>,
    /// e.g. "42m" or "1.3km"
    pub distance_label: Option<String>,
    pub status: ProximityStatus,
}

impl SpotView {
    pub(crate) fn from_spot(spot: &TreasureSpot, completed: bool) -> Self {
        Self {
            id: spot.id.to_string(),
            name: spot.name.clone(),
            description: spot.description.clone(),
            task: spot.task.clone(),
            latitude: spot.latitude,
            longitude: spot.longitude,
            radius: spot.radius,
            completed,
            distance_m: None,
            distance_label: None,
            status: ProximityStatus::Unknown,
        }
    }

    pub(crate) fn from_reading(reading: &SpotReading, completed: bool) -> Self {
        Self {
            distance_m: Some(reading.distance_m),
            distance_label: Some(format_distance(reading.distance_m)),
            status: reading.status.into(),
            ..Self::from_spot(&reading.spot, completed)
        }
    }
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct SpotInput {
    pub name: String,
    pub description: String,
    pub task: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: Option<f64>,
}

impl From<SpotInput> for SpotDraft {
    fn from(input: SpotInput) -> Self {
        SpotDraft {
            name: input.name,
            description: input.description,
            task: input.task,
            latitude: input.latitude,
            longitude: input.longitude,
            radius: input.radius,
        }
    }
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct TaskResult {
    pub spot_id: String,
    pub newly_completed: bool,
    pub progress: u8,
}

impl From<&TaskCompletion> for TaskResult {
    fn from(completion: &TaskCompletion) -> Self {
        Self {
            spot_id: completion.spot.id.to_string(),
            newly_completed: completion.newly_completed,
            progress: completion.progress,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct NoticeView {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        let kind = match notice.level {
            NoticeLevel::Success => NoticeKind::Success,
            NoticeLevel::Info => NoticeKind::Info,
            NoticeLevel::Error => NoticeKind::Error,
        };
        Self {
            kind,
            message: notice.message,
        }
    }
}

#[derive(Clone, Copy, Debug, uniffi::Record)]
pub struct SettingsView {
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
    pub notifications_enabled: bool,
}

impl From<Settings> for SettingsView {
    fn from(settings: Settings) -> Self {
        Self {
            sound_enabled: settings.sound_enabled,
            vibration_enabled: settings.vibration_enabled,
            notifications_enabled: settings.notifications_enabled,
        }
    }
}

impl From<SettingsView> for SettingsUpdate {
    fn from(view: SettingsView) -> Self {
        Self {
            sound_enabled: Some(view.sound_enabled),
            vibration_enabled: Some(view.vibration_enabled),
            notifications_enabled: Some(view.notifications_enabled),
        }
    }
}

#[derive(Clone, Debug, uniffi::Record)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub name: String,
    pub ticket_id: String,
    pub completed_tasks: u32,
    pub time_took: String,
}

impl From<LeaderboardEntry> for LeaderboardRow {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            rank: entry.rank,
            name: entry.name,
            ticket_id: entry.ticket_id,
            completed_tasks: entry.completed_tasks,
            time_took: entry.time_took,
        }
    }
}
