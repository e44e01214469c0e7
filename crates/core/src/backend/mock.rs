use std::sync::Mutex;
use std::time::Duration;

use rand::Rng;
use yessplora_api_types::{
    LeaderboardEntry, ParticipantRecord, SaveReceipt, TASK_COLUMNS, TaskStatus,
};

use super::{BackendError, BackendFuture, ParticipantBackend};
use crate::config::BackendConfig;

/// Stand-in for the spreadsheet: fixed latency, sample data, never fails
/// (except for task numbers no sheet could hold).
pub struct MockSheetsBackend {
    save_latency: Duration,
    list_latency: Duration,
    update_latency: Duration,
    leaderboard_latency: Duration,
    participants: Mutex<Vec<ParticipantRecord>>,
}

impl MockSheetsBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            save_latency: Duration::from_millis(config.save_latency_ms),
            list_latency: Duration::from_millis(config.list_latency_ms),
            update_latency: Duration::from_millis(config.update_latency_ms),
            leaderboard_latency: Duration::from_millis(config.leaderboard_latency_ms),
            participants: Mutex::new(sample_participants()),
        }
    }

    fn participants(&self) -> std::sync::MutexGuard<'_, Vec<ParticipantRecord>> {
        self.participants
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockSheetsBackend {
    fn default() -> Self {
        Self::new(&BackendConfig::default())
    }
}

impl ParticipantBackend for MockSheetsBackend {
    fn save_participant<'a>(&'a self, record: &'a ParticipantRecord) -> BackendFuture<'a, SaveReceipt> {
        Box::pin(async move {
            tokio::time::sleep(self.save_latency).await;
            tracing::info!(ticket = %record.ticket_id, "saving participant to mock sheet");

            self.participants().push(record.clone());
            let row_number = rand::rng().random_range(1..=1000u32);

            Ok(SaveReceipt {
                success: true,
                message: "Data saved successfully".into(),
                row_number,
            })
        })
    }

    fn get_participants(&self) -> BackendFuture<'_, Vec<ParticipantRecord>> {
        Box::pin(async move {
            tokio::time::sleep(self.list_latency).await;
            Ok(self.participants().clone())
        })
    }

    fn update_task_completion<'a>(
        &'a self,
        participant_id: &'a str,
        task_number: usize,
        status: TaskStatus,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            if !(1..=TASK_COLUMNS).contains(&task_number) {
                return Err(BackendError::InvalidTaskNumber(task_number));
            }

            tokio::time::sleep(self.update_latency).await;
            tracing::info!(participant_id, task_number, %status, "updating task on mock sheet");

            if let Some(record) = self
                .participants()
                .iter_mut()
                .find(|r| r.ticket_id.eq_ignore_ascii_case(participant_id))
            {
                record.set_task(task_number, status);
            }
            Ok(())
        })
    }

    fn get_leaderboard(&self) -> BackendFuture<'_, Vec<LeaderboardEntry>> {
        Box::pin(async move {
            tokio::time::sleep(self.leaderboard_latency).await;
            Ok(sample_leaderboard())
        })
    }
}

fn sample_participants() -> Vec<ParticipantRecord> {
    let mut john = ParticipantRecord::new("John Doe", "YESS001");
    for n in 1..=2 {
        john.set_task(n, TaskStatus::Completed);
    }
    john.time_took = "15:30".into();

    let mut jane = ParticipantRecord::new("Jane Smith", "YESS002");
    for n in 1..=5 {
        jane.set_task(n, TaskStatus::Completed);
    }
    jane.time_took = "25:45".into();

    vec![john, jane]
}

fn sample_leaderboard() -> Vec<LeaderboardEntry> {
    [
        ("Alice Johnson", "YESS003", 9, "45:20"),
        ("Bob Wilson", "YESS004", 8, "52:15"),
        ("Carol Davis", "YESS005", 7, "58:30"),
        ("David Brown", "YESS006", 6, "1:05:45"),
        ("Eva Miller", "YESS007", 5, "1:12:20"),
    ]
    .into_iter()
    .zip(1u32..)
    .map(|((name, ticket_id, completed_tasks, time_took), rank)| LeaderboardEntry {
        rank,
        name: name.into(),
        ticket_id: ticket_id.into(),
        completed_tasks,
        time_took: time_took.into(),
    })
    .collect()
}
