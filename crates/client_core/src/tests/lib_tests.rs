use super::*;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use serde_json::json;
use shared::domain::Tint;
use tokio::sync::Notify;

struct StatusBridge {
    status: String,
    queries: Mutex<Vec<String>>,
}

impl StatusBridge {
    fn new(status: &str) -> Arc<Self> {
        Arc::new(Self {
            status: status.to_string(),
            queries: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries").clone()
    }
}

#[async_trait]
impl CanvasBridge for StatusBridge {
    async fn send_text_query(&self, query: &str) -> anyhow::Result<String> {
        self.queries.lock().expect("queries").push(query.to_string());
        Ok(self.status.clone())
    }
}

struct GatedBridge {
    calls: AtomicUsize,
    gate: Notify,
}

#[async_trait]
impl CanvasBridge for GatedBridge {
    async fn send_text_query(&self, _query: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok("SUCCESS".to_string())
    }
}

struct FailingBridge;

#[async_trait]
impl CanvasBridge for FailingBridge {
    async fn send_text_query(&self, _query: &str) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("canvas bridge unavailable"))
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Never answers; records when its future is dropped.
struct PendingBridge {
    dropped: Arc<AtomicBool>,
}

#[async_trait]
impl CanvasBridge for PendingBridge {
    async fn send_text_query(&self, _query: &str) -> anyhow::Result<String> {
        let _flag = DropFlag(Arc::clone(&self.dropped));
        std::future::pending::<anyhow::Result<String>>().await
    }
}

async fn wait_until(
    rx: &mut watch::Receiver<SceneSnapshot>,
    predicate: impl FnMut(&SceneSnapshot) -> bool,
) -> SceneSnapshot {
    let snapshot = tokio::time::timeout(Duration::from_secs(120), rx.wait_for(predicate))
        .await
        .expect("scene did not reach expected state")
        .expect("scene loop alive");
    *snapshot
}

#[tokio::test(start_paused = true)]
async fn frame_loop_rotates_spinning_sprite() {
    let controller = SceneController::spawn(StatusBridge::new("SUCCESS"), SceneConfig::default());
    tokio::time::sleep(Duration::from_secs(1)).await;

    let snapshot = controller.snapshot();
    assert!(snapshot.frames > 1);
    assert!(
        (snapshot.sprite.rotation - 1.0).abs() < 0.05,
        "rotation after one second: {}",
        snapshot.sprite.rotation
    );
    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn paused_sprite_holds_rotation_across_frames() {
    let controller = SceneController::spawn(StatusBridge::new("SUCCESS"), SceneConfig::default());
    let mut rx = controller.subscribe();

    controller
        .deliver(json!({ "command": "SPIN", "spin": false }))
        .await
        .expect("deliver");
    let paused = wait_until(&mut rx, |s| !s.sprite.spin).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    let later = controller.snapshot();
    assert!(later.frames > paused.frames);
    assert_eq!(later.sprite.rotation, paused.sprite.rotation);
    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn host_commands_and_taps_reach_the_scene() {
    let controller = SceneController::spawn(StatusBridge::new("SUCCESS"), SceneConfig::default());
    let mut rx = controller.subscribe();

    controller
        .deliver(json!({ "command": "TINT", "tint": 0x0000FF }))
        .await
        .expect("deliver");
    wait_until(&mut rx, |s| s.sprite.tint == Tint::BLUE).await;

    controller
        .apply(SceneCommand::Tint { tint: Tint::RED })
        .await
        .expect("apply");
    wait_until(&mut rx, |s| s.sprite.tint == Tint::RED).await;

    controller.tap_sprite().await.expect("tap");
    wait_until(&mut rx, |s| !s.sprite.spin).await;
    controller.tap_sprite().await.expect("tap");
    wait_until(&mut rx, |s| s.sprite.spin).await;

    controller
        .deliver(json!({ "timer": 5 }))
        .await
        .expect("deliver");
    let scene = controller.stop().await.expect("stop");
    assert_eq!(scene.sprite().tint, Tint::RED);
    assert!(scene.sprite().spin);
}

#[tokio::test(start_paused = true)]
async fn restart_sends_query_and_reenables_on_success() {
    let bridge = StatusBridge::new("SUCCESS");
    let controller = SceneController::spawn(bridge.clone(), SceneConfig::default());
    let mut rx = controller.subscribe();

    controller.tap_restart().await.expect("tap restart");
    let snapshot = wait_until(&mut rx, |s| s.restart_enabled && !s.sprite.spin).await;
    assert!(!snapshot.sprite.spin);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(bridge.queries(), vec![RESTART_QUERY.to_string()]);
    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn restart_press_is_ignored_while_in_flight() {
    let bridge = Arc::new(GatedBridge {
        calls: AtomicUsize::new(0),
        gate: Notify::new(),
    });
    let controller = SceneController::spawn(bridge.clone(), SceneConfig::default());
    let mut rx = controller.subscribe();

    controller.tap_restart().await.expect("tap restart");
    wait_until(&mut rx, |s| !s.restart_enabled).await;
    controller.tap_restart().await.expect("tap restart");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(bridge.calls.load(Ordering::SeqCst), 1);
    assert!(!controller.snapshot().restart_enabled);

    bridge.gate.notify_one();
    wait_until(&mut rx, |s| s.restart_enabled).await;
    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn failed_restart_reenables_control() {
    let controller = SceneController::spawn(Arc::new(FailingBridge), SceneConfig::default());
    let mut rx = controller.subscribe();

    controller.tap_restart().await.expect("tap restart");
    tokio::time::sleep(Duration::from_millis(100)).await;
    let snapshot = wait_until(&mut rx, |s| s.restart_enabled).await;
    assert!(!snapshot.sprite.spin);
    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn unanswered_restart_times_out() {
    let dropped = Arc::new(AtomicBool::new(false));
    let config = SceneConfig {
        restart_timeout: Duration::from_secs(2),
        ..SceneConfig::default()
    };
    let controller = SceneController::spawn(
        Arc::new(PendingBridge {
            dropped: Arc::clone(&dropped),
        }),
        config,
    );
    let mut rx = controller.subscribe();

    controller.tap_restart().await.expect("tap restart");
    wait_until(&mut rx, |s| !s.restart_enabled).await;
    let started = Instant::now();
    wait_until(&mut rx, |s| s.restart_enabled).await;

    assert!(started.elapsed() >= Duration::from_millis(1900));
    assert!(dropped.load(Ordering::SeqCst));
    controller.stop().await.expect("stop");
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_in_flight_restart() {
    let dropped = Arc::new(AtomicBool::new(false));
    let config = SceneConfig {
        restart_timeout: Duration::from_secs(600),
        ..SceneConfig::default()
    };
    let controller = SceneController::spawn(
        Arc::new(PendingBridge {
            dropped: Arc::clone(&dropped),
        }),
        config,
    );
    let mut rx = controller.subscribe();

    controller.tap_restart().await.expect("tap restart");
    wait_until(&mut rx, |s| !s.restart_enabled).await;

    let scene = controller.stop().await.expect("stop");
    assert!(!scene.restart_enabled());

    for _ in 0..10 {
        if dropped.load(Ordering::SeqCst) {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn stopped_loop_rejects_inputs() {
    let controller = SceneController::spawn(StatusBridge::new("SUCCESS"), SceneConfig::default());
    controller.task.abort();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = controller
        .tap_sprite()
        .await
        .expect_err("loop is gone");
    assert!(matches!(err, SceneError::ControllerStopped));
}

#[tokio::test(start_paused = true)]
async fn zero_frame_interval_still_runs_the_loop() {
    let config = SceneConfig {
        frame_interval: Duration::ZERO,
        ..SceneConfig::default()
    };
    let controller = SceneController::spawn(StatusBridge::new("SUCCESS"), config);
    let mut rx = controller.subscribe();

    controller.tap_sprite().await.expect("loop alive");
    wait_until(&mut rx, |s| !s.sprite.spin && s.frames > 1).await;
    controller.stop().await.expect("stop");
}
