//! Wire types shared between the hunt engine and the participant spreadsheet.
//!
//! A participant occupies one sheet row laid out as
//! `name, ticketId, task1..task9, bossLevel, bonusLevel, completed, timeTook`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of task columns in a participant row
pub const TASK_COLUMNS: usize = 9;

/// Total columns in a participant row
pub const ROW_WIDTH: usize = TASK_COLUMNS + 6;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum TaskStatus {
    Completed,
    #[default]
    Pending,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum LevelStatus {
    #[default]
    #[serde(rename = "Not Started")]
    #[strum(serialize = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub name: String,
    pub ticket_id: String,
    pub tasks: Vec<TaskStatus>,
    pub boss_level: LevelStatus,
    pub bonus_level: LevelStatus,
    pub completed: bool,
    pub time_took: String,
}

impl ParticipantRecord {
    /// A freshly registered participant: every task pending, no time recorded.
    pub fn new(name: impl Into<String>, ticket_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticket_id: ticket_id.into(),
            tasks: vec![TaskStatus::Pending; TASK_COLUMNS],
            boss_level: LevelStatus::NotStarted,
            bonus_level: LevelStatus::NotStarted,
            completed: false,
            time_took: "00:00".into(),
        }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|status| **status == TaskStatus::Completed)
            .count()
    }

    /// Mark a 1-based task column. Returns `false` if the number is out of range.
    pub fn set_task(&mut self, task_number: usize, status: TaskStatus) -> bool {
        match task_number.checked_sub(1).and_then(|i| self.tasks.get_mut(i)) {
            Some(slot) => {
                *slot = status;
                true
            }
            None => false,
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(ROW_WIDTH);
        row.push(self.name.clone());
        row.push(self.ticket_id.clone());
        row.extend(
            (0..TASK_COLUMNS).map(|i| self.tasks.get(i).copied().unwrap_or_default().to_string()),
        );
        row.push(self.boss_level.to_string());
        row.push(self.bonus_level.to_string());
        row.push(if self.completed { "Yes" } else { "No" }.to_string());
        row.push(self.time_took.clone());
        row
    }

    /// Parse a sheet row. Trailing cells may be missing; present cells must be valid.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, RowError> {
        let cell = |i: usize| row.get(i).map(|c| c.as_ref().trim()).filter(|c| !c.is_empty());

        let name = cell(0).ok_or(RowError::MissingName)?.to_string();
        let ticket_id = cell(1).ok_or(RowError::MissingTicket)?.to_string();

        let mut record = Self::new(name, ticket_id);

        for i in 0..TASK_COLUMNS {
            if let Some(value) = cell(2 + i) {
                record.tasks[i] = parse_cell(value, 2 + i)?;
            }
        }

        let level_base = 2 + TASK_COLUMNS;
        if let Some(value) = cell(level_base) {
            record.boss_level = parse_cell(value, level_base)?;
        }
        if let Some(value) = cell(level_base + 1) {
            record.bonus_level = parse_cell(value, level_base + 1)?;
        }
        if let Some(value) = cell(level_base + 2) {
            record.completed = value.eq_ignore_ascii_case("yes");
        }
        if let Some(value) = cell(level_base + 3) {
            record.time_took = value.to_string();
        }

        Ok(record)
    }
}

fn parse_cell<T: FromStr>(value: &str, column: usize) -> Result<T, RowError> {
    value.parse().map_err(|_| RowError::InvalidCell {
        column,
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("Row has no participant name")]
    MissingName,

    #[error("Row has no ticket id")]
    MissingTicket,

    #[error("Unrecognised value {value:?} in column {column}")]
    InvalidCell { column: usize, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub success: bool,
    pub message: String,
    pub row_number: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub ticket_id: String,
    pub completed_tasks: u32,
    pub time_took: String,
}

/// Parse `mm:ss` or `h:mm:ss` into seconds.
pub fn parse_time_took(value: &str) -> Option<u32> {
    let parts = value
        .trim()
        .split(':')
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [m, s] if *s < 60 => Some(m * 60 + s),
        [h, m, s] if *m < 60 && *s < 60 => Some(h * 3600 + m * 60 + s),
        _ => None,
    }
}

/// Rank participants: most completed tasks first, then the shortest time.
///
/// Unparseable times sort after every parseable one.
pub fn rank_leaderboard(records: &[ParticipantRecord]) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&ParticipantRecord> = records.iter().collect();
    sorted.sort_by_key(|r| {
        (
            std::cmp::Reverse(r.completed_count()),
            parse_time_took(&r.time_took).unwrap_or(u32::MAX),
        )
    });

    sorted
        .into_iter()
        .zip(1u32..)
        .map(|(r, rank)| LeaderboardEntry {
            rank,
            name: r.name.clone(),
            ticket_id: r.ticket_id.clone(),
            completed_tasks: r.completed_count() as u32,
            time_took: r.time_took.clone(),
        })
        .collect()
}
