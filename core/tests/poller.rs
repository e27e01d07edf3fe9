use chrono::Utc;
use insights_core::{
    error::{InsightsError, InsightsResult},
    model::Run,
    poller::{PollStatus, RunListPoller, RunSource, StoreRunSource},
    store::InsightsStore,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ── Helpers ──────────────────────────────────────────────────────────────────

// Every test runs on a paused clock: sleeps and intervals advance virtual
// time only, so tick counts are exact.
const TICK: Duration = Duration::from_secs(5);

/// Sleep long enough for `ticks` interval ticks after the immediate one,
/// landing between ticks rather than on one.
async fn sleep_ticks(ticks: u32) {
    tokio::time::sleep(TICK * ticks + TICK / 2).await;
}

/// Returns no runs for the first `empty_polls` calls, then one run (or an
/// error when `fail` is set).
struct ScriptedSource {
    calls: AtomicU32,
    empty_polls: u32,
    fail: bool,
}

impl ScriptedSource {
    fn new(empty_polls: u32, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            empty_polls,
            fail,
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RunSource for ScriptedSource {
    fn list_runs(&self) -> InsightsResult<Vec<Run>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.empty_polls {
            return Ok(Vec::new());
        }
        if self.fail {
            return Err(InsightsError::InvalidConfig {
                reason: "backend unavailable".into(),
            });
        }
        Ok(vec![Run {
            run_id: 1,
            ..Run::default()
        }])
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The first fetch happens immediately; a non-empty list ends the loop.
#[tokio::test(start_paused = true)]
async fn ready_on_first_non_empty_list() {
    let source = ScriptedSource::new(0, false);
    let mut handle = RunListPoller::spawn(source.clone(), Duration::from_secs(3600));

    let status = tokio::time::timeout(Duration::from_secs(60), handle.wait())
        .await
        .unwrap();
    assert!(matches!(status, PollStatus::Ready(ref runs) if runs.len() == 1));
    assert_eq!(source.calls(), 1);
}

/// Empty lists are retried on the interval until runs appear, then polling
/// stops for good.
#[tokio::test(start_paused = true)]
async fn retries_while_empty_then_stops() {
    let source = ScriptedSource::new(3, false);
    let mut handle = RunListPoller::spawn(source.clone(), TICK);

    let status = tokio::time::timeout(Duration::from_secs(60), handle.wait())
        .await
        .unwrap();
    assert!(matches!(status, PollStatus::Ready(_)));
    assert_eq!(source.calls(), 4);

    sleep_ticks(5).await;
    assert_eq!(source.calls(), 4, "poller kept fetching after runs appeared");
}

/// Errors are terminal: one failure ends the loop with a user-facing message.
#[tokio::test(start_paused = true)]
async fn error_ends_polling_with_message() {
    let source = ScriptedSource::new(1, true);
    let mut handle = RunListPoller::spawn(source.clone(), TICK);

    let status = tokio::time::timeout(Duration::from_secs(60), handle.wait())
        .await
        .unwrap();
    match status {
        PollStatus::Failed(message) => {
            assert!(message.starts_with("Failed to load runs:"), "{message}");
            assert!(message.contains("backend unavailable"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    sleep_ticks(5).await;
    assert_eq!(source.calls(), 2);
}

/// Stopping the handle tears the loop down while it is still polling.
#[tokio::test(start_paused = true)]
async fn stop_ends_an_idle_poller() {
    let source = ScriptedSource::new(u32::MAX, false);
    let handle = RunListPoller::spawn(source.clone(), TICK);

    sleep_ticks(3).await;
    assert_eq!(handle.status(), PollStatus::Polling { attempts: 4 });
    assert_eq!(source.calls(), 4);

    let status = handle.stop().await;
    assert_eq!(status, PollStatus::Stopped);

    sleep_ticks(5).await;
    assert_eq!(source.calls(), 4);
}

/// Dropping the handle also stops further fetches.
#[tokio::test(start_paused = true)]
async fn dropping_handle_stops_polling() {
    let source = ScriptedSource::new(u32::MAX, false);
    let handle = RunListPoller::spawn(source.clone(), TICK);
    sleep_ticks(2).await;
    assert_eq!(source.calls(), 3);
    drop(handle);

    tokio::time::advance(TICK * 10).await;
    tokio::task::yield_now().await;
    assert_eq!(source.calls(), 3);
}

/// A run written to the database while polling is picked up.
#[tokio::test(start_paused = true)]
async fn store_source_sees_new_runs() {
    let path = std::env::temp_dir().join(format!("insights_poller_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let path = path.to_string_lossy().into_owned();
    let writer = InsightsStore::open(&path).unwrap();
    writer.migrate().unwrap();

    let source = Arc::new(StoreRunSource::new(InsightsStore::open(&path).unwrap(), 20));
    let mut handle = RunListPoller::spawn(source, TICK);

    sleep_ticks(3).await;
    assert!(matches!(handle.status(), PollStatus::Polling { .. }));

    let run_id = writer.insert_run(Utc::now()).unwrap();
    let status = tokio::time::timeout(Duration::from_secs(60), handle.wait())
        .await
        .unwrap();
    match status {
        PollStatus::Ready(runs) => assert_eq!(runs[0].run_id, run_id),
        other => panic!("expected runs, got {other:?}"),
    }
    let _ = std::fs::remove_file(&path);
}
