use anyhow::{Context, Result};
use serde::Serialize;
use yessplora_core::hunt::proximity::active_spots;
use yessplora_core::hunt::{HuntSession, LocationSample};
use yessplora_core::spots::SpotDraft;

pub struct ReplayOptions {
    pub complete_tasks: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedTask {
    /// Index into the track
    pub position: usize,
    pub spot_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    pub presented: Vec<PresentedTask>,
    pub completed: Vec<String>,
    pub progress: u8,
    pub notices: Vec<String>,
}

/// Drive `session` through the whole track as a registered, fully-permitted
/// participant.
pub fn replay(
    mut session: HuntSession,
    drafts: Vec<SpotDraft>,
    track: &[LocationSample],
    options: ReplayOptions,
) -> Result<ReplaySummary> {
    session
        .admin_login("replay", "replay")
        .context("Failed to log in as admin")?;
    for draft in drafts {
        let name = draft.name.clone();
        session
            .add_spot(draft)
            .with_context(|| format!("Invalid spot {name:?}"))?;
    }
    session.admin_logout();

    if !session.state().user.is_authenticated {
        session.register("Replay Runner", "REPLAY01")?;
    }
    session.set_permissions(true, true);
    session.start_game()?;

    let spots = session.spots();
    let nearby_radius_m = session.config().nearby_radius_m;
    let mut presented = Vec::new();

    for (position, sample) in track.iter().enumerate() {
        let active = active_spots(Some(sample), &spots, nearby_radius_m);
        log::debug!(
            "#{position} ({:.5}, {:.5}) inside {} spots",
            sample.latitude,
            sample.longitude,
            active.len()
        );

        let outcome = session.on_position(*sample);
        let Some(spot) = outcome.presented else {
            continue;
        };

        log::info!("#{position}: presented {:?}", spot.name);
        presented.push(PresentedTask {
            position,
            spot_id: spot.id.to_string(),
            name: spot.name.clone(),
        });

        if options.complete_tasks {
            session.complete_presented()?;
        }
    }

    Ok(ReplaySummary {
        presented,
        completed: session
            .state()
            .game
            .completed_tasks()
            .iter()
            .map(ToString::to_string)
            .collect(),
        progress: session.progress(),
        notices: session
            .take_notices()
            .into_iter()
            .map(|notice| format!("[{}] {}", notice.level, notice.message))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use yessplora_core::config::{AdminCredentials, GameConfig};

    use super::*;

    fn session() -> HuntSession {
        HuntSession::new(GameConfig {
            admin: Some(AdminCredentials {
                username: "replay".into(),
                password: "replay".into(),
            }),
            ..GameConfig::default()
        })
    }

    fn walk() -> Vec<LocationSample> {
        [11.2500, 11.2587, 11.2588, 11.2600, 11.2588]
            .iter()
            .zip(0i64..)
            .map(|(lat, i)| LocationSample::new(*lat, 75.7804, 5.0, i * 1000))
            .collect()
    }

    #[test]
    fn completing_stops_re_presentation() {
        let drafts = vec![SpotDraft::new("Gate", 11.2588, 75.7804)];
        let summary = replay(session(), drafts, &walk(), ReplayOptions { complete_tasks: true })
            .unwrap();

        assert_eq!(summary.presented.len(), 1);
        assert_eq!(summary.presented[0].position, 1);
        assert_eq!(summary.completed.len(), 1);
        assert_eq!(summary.progress, 11);
    }

    #[test]
    fn open_task_blocks_new_presentations() {
        let drafts = vec![SpotDraft::new("Gate", 11.2588, 75.7804)];
        let summary = replay(session(), drafts, &walk(), ReplayOptions { complete_tasks: false })
            .unwrap();

        // Leaving closes the task, re-entering opens it again
        assert_eq!(summary.presented.len(), 2);
        assert_eq!(summary.presented[1].position, 4);
        assert!(summary.completed.is_empty());
    }
}
