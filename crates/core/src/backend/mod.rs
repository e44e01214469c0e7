//! Participant record backend.
//!
//! Callers surface failures once and never retry on their own.

pub mod mock;
pub mod sheets;

use std::future::Future;
use std::pin::Pin;

use yessplora_api_types::{LeaderboardEntry, ParticipantRecord, RowError, SaveReceipt, TaskStatus};

pub use mock::MockSheetsBackend;
pub use sheets::SheetsClient;

pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

/// Participant spreadsheet operations
pub trait ParticipantBackend: Send + Sync {
    fn save_participant<'a>(&'a self, record: &'a ParticipantRecord) -> BackendFuture<'a, SaveReceipt>;

    fn get_participants(&self) -> BackendFuture<'_, Vec<ParticipantRecord>>;

    /// `participant_id` is the ticket id; `task_number` is 1-based
    fn update_task_completion<'a>(
        &'a self,
        participant_id: &'a str,
        task_number: usize,
        status: TaskStatus,
    ) -> BackendFuture<'a, ()>;

    fn get_leaderboard(&self) -> BackendFuture<'_, Vec<LeaderboardEntry>>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid request url: {0}")]
    Url(String),

    #[error("backend is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("task number {0} is out of range")]
    InvalidTaskNumber(usize),

    #[error("participant {0} not found")]
    ParticipantNotFound(String),

    #[error("row {row} is malformed: {source}")]
    MalformedRow { row: usize, source: RowError },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
