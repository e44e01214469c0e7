//! Which task is currently in front of the participant.

use std::sync::Arc;

use yessplora_spots::{SpotIdentifier, TaskIdentifier, TreasureSpot};

use crate::hunt::tracker::TickReport;

#[derive(Debug, Default)]
pub struct TaskFlow {
    presented: Option<Arc<TreasureSpot>>,
}

impl TaskFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> Option<&Arc<TreasureSpot>> {
        self.presented.as_ref()
    }

    /// Apply a tick's edges. Vacating the presented spot closes it; if nothing
    /// is presented afterwards, the first entered spot (list order) with an
    /// unfinished task is presented and returned.
    pub fn on_tick(
        &mut self,
        report: &TickReport,
        is_completed: impl Fn(&TaskIdentifier) -> bool,
    ) -> Option<Arc<TreasureSpot>> {
        for spot in report.vacated() {
            self.dismiss_spot(&spot.id);
        }

        if self.presented.is_some() {
            return None;
        }

        let next = report
            .entered()
            .find(|spot| !is_completed(&spot.task_id()))
            .cloned()?;

        self.presented = Some(Arc::clone(&next));
        Some(next)
    }

    /// Present a spot directly (e.g. from a QR code), replacing any current task
    pub fn present(&mut self, spot: Arc<TreasureSpot>) {
        self.presented = Some(spot);
    }

    /// Close the presentation for completion
    pub fn complete(&mut self) -> Option<Arc<TreasureSpot>> {
        self.presented.take()
    }

    /// Close without completing; the spot can trigger again on its next entry
    pub fn cancel(&mut self) -> Option<Arc<TreasureSpot>> {
        self.presented.take()
    }

    /// Close the presentation if it belongs to `id`
    pub fn dismiss_spot(&mut self, id: &SpotIdentifier) -> bool {
        if self.presented.as_ref().is_some_and(|spot| &spot.id == id) {
            self.presented = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.presented = None;
    }
}
