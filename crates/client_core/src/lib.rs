//! Scene side of the canvas action: sprite state, the frame loop that animates
//! it, and intake of host commands and user taps.

use std::{sync::Arc, time::Duration};

use serde_json::Value;
use shared::protocol::SceneCommand;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{interval, timeout, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

pub mod bridge;
pub mod error;
pub mod scene;
pub mod sprite;
pub mod webhook;

pub use bridge::CanvasBridge;
pub use error::{SceneError, WebhookClientError};
pub use scene::{RestartOutcome, Scene, SceneSnapshot, RESTART_QUERY};
pub use sprite::SpriteState;
pub use webhook::WebhookClient;

const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);
const DEFAULT_RESTART_TIMEOUT: Duration = Duration::from_secs(10);
const MIN_FRAME_INTERVAL: Duration = Duration::from_millis(1);
const INPUT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct SceneConfig {
    pub frame_interval: Duration,
    /// Upper bound on the restart round-trip before the control re-enables.
    pub restart_timeout: Duration,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            frame_interval: DEFAULT_FRAME_INTERVAL,
            restart_timeout: DEFAULT_RESTART_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
enum SceneInput {
    Update(Value),
    Command(SceneCommand),
    TapSprite,
    TapRestart,
}

/// Handle to the task that owns the [`Scene`].
///
/// Frames, host updates and taps are serialized through one task, so whichever
/// of them lands last before a frame wins.
pub struct SceneController {
    inputs: mpsc::Sender<SceneInput>,
    snapshots: watch::Receiver<SceneSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Scene>,
}

impl SceneController {
    pub fn spawn(bridge: Arc<dyn CanvasBridge>, config: SceneConfig) -> Self {
        Self::spawn_with_scene(Scene::default(), bridge, config)
    }

    pub fn spawn_with_scene(
        scene: Scene,
        bridge: Arc<dyn CanvasBridge>,
        mut config: SceneConfig,
    ) -> Self {
        // tokio intervals reject a zero period.
        config.frame_interval = config.frame_interval.max(MIN_FRAME_INTERVAL);
        let (inputs_tx, inputs_rx) = mpsc::channel(INPUT_BUFFER);
        let (snapshots_tx, snapshots_rx) = watch::channel(scene.snapshot());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run_scene(
            scene,
            bridge,
            config,
            inputs_rx,
            snapshots_tx,
            shutdown_rx,
        ));

        Self {
            inputs: inputs_tx,
            snapshots: snapshots_rx,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    /// Raw payload from the host; unrecognized content is ignored by the scene.
    pub async fn deliver(&self, data: Value) -> Result<(), SceneError> {
        self.send(SceneInput::Update(data)).await
    }

    pub async fn apply(&self, command: SceneCommand) -> Result<(), SceneError> {
        self.send(SceneInput::Command(command)).await
    }

    pub async fn tap_sprite(&self) -> Result<(), SceneError> {
        self.send(SceneInput::TapSprite).await
    }

    pub async fn tap_restart(&self) -> Result<(), SceneError> {
        self.send(SceneInput::TapRestart).await
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        *self.snapshots.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SceneSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the frame loop, cancels any outstanding restart query and returns the final scene.
    pub async fn stop(mut self) -> Result<Scene, SceneError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task
            .await
            .map_err(|e| SceneError::TaskFailed(e.to_string()))
    }

    async fn send(&self, input: SceneInput) -> Result<(), SceneError> {
        self.inputs
            .send(input)
            .await
            .map_err(|_| SceneError::ControllerStopped)
    }
}

async fn run_scene(
    mut scene: Scene,
    bridge: Arc<dyn CanvasBridge>,
    config: SceneConfig,
    mut inputs: mpsc::Receiver<SceneInput>,
    snapshots: watch::Sender<SceneSnapshot>,
    mut shutdown: oneshot::Receiver<()>,
) -> Scene {
    let mut frames = interval(config.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    let (restart_tx, mut restart_rx) = mpsc::channel::<RestartOutcome>(1);
    let mut restart_task: Option<JoinHandle<()>> = None;

    info!(frame_interval = ?config.frame_interval, "scene loop started");
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            now = frames.tick() => {
                let delta = now.saturating_duration_since(last_frame);
                last_frame = now;
                scene.frame(delta);
            }
            input = inputs.recv() => {
                let Some(input) = input else { break };
                match input {
                    SceneInput::Update(data) => {
                        scene.apply_update(&data);
                    }
                    SceneInput::Command(command) => scene.apply_command(&command),
                    SceneInput::TapSprite => scene.tap_sprite(),
                    SceneInput::TapRestart => {
                        if let Some(query) = scene.press_restart() {
                            restart_task = Some(spawn_restart_query(
                                Arc::clone(&bridge),
                                query,
                                config.restart_timeout,
                                restart_tx.clone(),
                            ));
                        }
                    }
                }
            }
            Some(outcome) = restart_rx.recv() => {
                restart_task = None;
                scene.restart_resolved(&outcome);
            }
        }
        snapshots.send_replace(scene.snapshot());
    }

    if let Some(task) = restart_task.take() {
        debug!("cancelling in-flight restart query");
        task.abort();
    }
    info!(frames = scene.snapshot().frames, "scene loop stopped");
    scene
}

fn spawn_restart_query(
    bridge: Arc<dyn CanvasBridge>,
    query: &'static str,
    limit: Duration,
    done: mpsc::Sender<RestartOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = match timeout(limit, bridge.send_text_query(query)).await {
            Ok(Ok(status)) => RestartOutcome::Replied(status),
            Ok(Err(error)) => RestartOutcome::Failed(format!("{error:#}")),
            Err(_) => RestartOutcome::TimedOut(limit),
        };
        let _ = done.send(outcome).await;
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
