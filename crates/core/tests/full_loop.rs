use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use yessplora_core::GameConfig;
use yessplora_core::config::AdminCredentials;
use yessplora_core::hunt::location::{ChannelLocationSource, LocationSource};
use yessplora_core::hunt::permissions::{CameraAccess, CameraError, request_permissions};
use yessplora_core::hunt::{HuntSession, LocationSample, SpotStatus, spawn_tracking};
use yessplora_core::persist::{MemoryStorage, Snapshot, StateStorage};
use yessplora_core::spots::SpotDraft;

struct GrantingCamera;

impl CameraAccess for GrantingCamera {
    fn request<'a>(
        &'a self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), CameraError>> + Send + 'a>>
    {
        Box::pin(async { Ok(()) })
    }
}

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

async fn wait_until(mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !done() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition never held");
}

#[tokio::test]
async fn walk_into_a_spot_and_complete_it() {
    let storage = MemoryStorage::new();
    let mut session = HuntSession::with_storage(config(), Box::new(storage.clone()));

    session.register("Alice", "YESS009").unwrap();

    // Permission probes: camera granted, location answered by the feed
    let source = Arc::new(ChannelLocationSource::new());
    let feed = Arc::clone(&source);
    let probe = tokio::spawn(async move {
        request_permissions(&GrantingCamera, feed.as_ref(), Duration::from_secs(10)).await
    });
    wait_until(|| source.active_watches() == 1).await;
    source.publish(Ok(LocationSample::new(GATE.0 + 0.01, GATE.1, 8.0, 1)));
    let outcome = probe.await.unwrap();
    session.apply_permission_outcome(&outcome);
    assert!(session.state().permissions.all_granted());

    session.admin_login("ops", "pw").unwrap();
    session.add_spot(SpotDraft::new("Gate", GATE.0, GATE.1)).unwrap();
    session.admin_logout();
    session.start_game().unwrap();

    let session = Arc::new(Mutex::new(session));
    let handle = spawn_tracking(Arc::clone(&session), source.watch());

    // Walk up to within 20 m of the gate
    source.publish(Ok(LocationSample::new(GATE.0 + 0.0005, GATE.1, 8.0, 2)));
    source.publish(Ok(LocationSample::new(GATE.0 + 0.0001, GATE.1, 8.0, 3)));
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }

    {
        let mut session = session.lock().await;
        assert_eq!(session.presented_task().unwrap().name, "Gate");
        assert_eq!(session.readings()[0].status, SpotStatus::Active);

        let completion = session.complete_presented().unwrap();
        assert!(completion.newly_completed);
        assert_eq!(session.state().game.completed_count(), 1);
        assert_eq!(session.progress(), 11);
    }

    handle.stop().await;
    assert_eq!(source.active_watches(), 0);

    // The last commit landed in storage
    let json = storage
        .load(yessplora_core::config::STORAGE_KEY)
        .unwrap()
        .unwrap();
    let snapshot = Snapshot::decode(&json).unwrap();
    assert_eq!(snapshot.game.progress, 11);
    assert_eq!(snapshot.game.completed_tasks.len(), 1);
    assert_eq!(snapshot.user.ticket_id, "YESS009");
}

#[tokio::test]
async fn restart_resumes_from_storage() {
    let storage = MemoryStorage::new();
    {
        let mut session = HuntSession::with_storage(config(), Box::new(storage.clone()));
        session.register("Bob", "YESS010").unwrap();
        session.set_permissions(true, true);
        session.start_game().unwrap();
    }

    let session = HuntSession::with_storage(config(), Box::new(storage));
    assert_eq!(session.state().user.name, "Bob");
    assert!(session.state().game.is_started);
    // Permissions are asked for again on every launch
    assert!(!session.state().permissions.location);
}
