//! Google Sheets v4 values API client.
//!
//! Row 1 of the sheet is a header; participants start on row 2 in the
//! column layout of [`ParticipantRecord::to_row`].

use serde::Deserialize;
use serde_json::json;
use yessplora_api_types::{
    LeaderboardEntry, ParticipantRecord, SaveReceipt, TASK_COLUMNS, TaskStatus, rank_leaderboard,
};

use super::{BackendError, BackendFuture, ParticipantBackend};
use crate::config::BackendConfig;

const DATA_RANGE: &str = "A:Z";
const FIRST_TASK_COLUMN: u8 = b'C';

pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    api_key: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
}

impl SheetsClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &BackendConfig) -> Result<Self, BackendError> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(BackendError::NotConfigured("spreadsheet id"));
        }
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(BackendError::NotConfigured("api key"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            api_key,
            access_token: config
                .access_token
                .clone()
                .filter(|t| !t.trim().is_empty()),
        })
    }

    fn values_url(&self, range: &str, suffix: &str, write: bool) -> Result<reqwest::Url, BackendError> {
        let raw = format!("{}/{}/values/{range}{suffix}", self.base_url, self.spreadsheet_id);
        let mut params = vec![("key", self.api_key.as_str())];
        if write {
            params.push(("valueInputOption", "USER_ENTERED"));
        }
        reqwest::Url::parse_with_params(&raw, &params).map_err(|e| BackendError::Url(e.to_string()))
    }

    /// Writes carry the OAuth token; the API key alone is read-only.
    fn write_request(
        &self,
        method: reqwest::Method,
        url: reqwest::Url,
        body: &serde_json::Value,
    ) -> Result<reqwest::RequestBuilder, BackendError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(BackendError::NotConfigured("access token"))?;
        Ok(self.client.request(method, url).bearer_auth(token).json(body))
    }

    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, BackendError> {
        let url = self.values_url(DATA_RANGE, "", false)?;
        let response = check_status(self.client.get(url).send().await?).await?;
        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }
}

impl ParticipantBackend for SheetsClient {
    fn save_participant<'a>(&'a self, record: &'a ParticipantRecord) -> BackendFuture<'a, SaveReceipt> {
        Box::pin(async move {
            let url = self.values_url(DATA_RANGE, ":append", true)?;
            let body = json!({ "values": [record.to_row()] });

            let request = self.write_request(reqwest::Method::POST, url, &body)?;
            let response = check_status(request.send().await?).await?;
            let appended: AppendResponse = response.json().await?;
            let row_number = row_of_range(&appended.updates.updated_range).ok_or_else(|| {
                BackendError::UnexpectedResponse(appended.updates.updated_range.clone())
            })?;

            tracing::info!(ticket = %record.ticket_id, row_number, "participant saved");
            Ok(SaveReceipt {
                success: true,
                message: "Data saved successfully".into(),
                row_number,
            })
        })
    }

    fn get_participants(&self) -> BackendFuture<'_, Vec<ParticipantRecord>> {
        Box::pin(async move {
            let rows = self.fetch_rows().await?;
            parse_participants(&rows)
        })
    }

    fn update_task_completion<'a>(
        &'a self,
        participant_id: &'a str,
        task_number: usize,
        status: TaskStatus,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let column = task_column(task_number).ok_or(BackendError::InvalidTaskNumber(task_number))?;

            let rows = self.fetch_rows().await?;
            let row = find_participant_row(&rows, participant_id)
                .ok_or_else(|| BackendError::ParticipantNotFound(participant_id.to_string()))?;

            let cell = format!("{column}{row}");
            let url = self.values_url(&cell, "", true)?;
            let body = json!({ "values": [[status.to_string()]] });
            let request = self.write_request(reqwest::Method::PUT, url, &body)?;
            check_status(request.send().await?).await?;

            tracing::info!(participant_id, task_number, %status, "task status updated");
            Ok(())
        })
    }

    fn get_leaderboard(&self) -> BackendFuture<'_, Vec<LeaderboardEntry>> {
        Box::pin(async move {
            let participants = self.get_participants().await?;
            Ok(rank_leaderboard(&participants))
        })
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "sheets request rejected");
    Err(BackendError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Skip the header row and blank rows; everything else must parse.
fn parse_participants(rows: &[Vec<String>]) -> Result<Vec<ParticipantRecord>, BackendError> {
    rows.iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(i, row)| {
            ParticipantRecord::from_row(row)
                .map_err(|source| BackendError::MalformedRow { row: i + 1, source })
        })
        .collect()
}

/// 1-based sheet row of the participant, header included
fn find_participant_row(rows: &[Vec<String>], participant_id: &str) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| {
            row.get(1)
                .is_some_and(|ticket| ticket.trim().eq_ignore_ascii_case(participant_id))
        })
        .map(|(i, _)| i + 1)
}

fn task_column(task_number: usize) -> Option<char> {
    if !(1..=TASK_COLUMNS).contains(&task_number) {
        return None;
    }
    Some((FIRST_TASK_COLUMN + (task_number - 1) as u8) as char)
}

/// `Sheet1!A5:O5` -> 5
fn row_of_range(range: &str) -> Option<u32> {
    let cells = range.rsplit('!').next()?;
    let first = cells.split(':').next()?;
    first
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .ok()
}
