use std::{collections::HashSet, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{SceneConfig, SceneController, SceneSnapshot, WebhookClient};
use shared::{
    domain::{Capability, IntentEvent},
    protocol::{CanvasCommand, WebhookResponse},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod bridge;
mod intents;

use bridge::WebhookBridge;
use intents::resolve_intent;

/// Plays the conversational host against a running fulfillment webhook.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080/fulfillment")]
    webhook_url: String,
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    #[arg(long, default_value_t = 10)]
    restart_timeout_secs: u64,
    /// Pretend the surface has no interactive canvas.
    #[arg(long)]
    no_canvas: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut capabilities = HashSet::from([Capability::ScreenOutput, Capability::AudioOutput]);
    if !args.no_canvas {
        capabilities.insert(Capability::InteractiveCanvas);
    }

    let client = WebhookClient::new(&args.webhook_url).context("invalid --webhook-url")?;
    let (canvas_tx, mut canvas_rx) = mpsc::unbounded_channel::<CanvasCommand>();
    let bridge = WebhookBridge::new(client.clone(), capabilities.clone(), canvas_tx);
    let controller = SceneController::spawn(
        Arc::new(bridge),
        SceneConfig {
            frame_interval: Duration::from_millis(args.frame_ms),
            restart_timeout: Duration::from_secs(args.restart_timeout_secs),
        },
    );

    let welcome = IntentEvent {
        capabilities: capabilities.clone(),
        ..IntentEvent::new("welcome").with_query("talk to spinning triangle")
    };
    let response = client
        .send_intent(&welcome)
        .await
        .context("welcome intent failed")?;
    print_replies(&response);
    if !response.expects_user_response() {
        controller.stop().await?;
        return Ok(());
    }
    if let Some(url) = response.html().and_then(|html| html.url.as_deref()) {
        println!("[canvas] embedding {url}");
    }
    println!("Type to talk; 'tap', 'restart', 'state' or 'quit' act on the scene.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(command) = canvas_rx.recv() => deliver(&controller, &command).await?,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => {}
                    "quit" | "exit" => break,
                    "tap" => controller.tap_sprite().await?,
                    "restart" => controller.tap_restart().await?,
                    "state" => print_snapshot(&controller.snapshot()),
                    text => {
                        let mut event = resolve_intent(text);
                        event.capabilities = capabilities.clone();
                        match client.send_intent(&event).await {
                            Ok(response) => {
                                print_replies(&response);
                                if let Some(command) = response.canvas_state() {
                                    deliver(&controller, command).await?;
                                }
                                if !response.expects_user_response() {
                                    break;
                                }
                            }
                            Err(error) => warn!(%error, intent = %event.name, "webhook call failed"),
                        }
                    }
                }
            }
        }
    }

    let scene = controller.stop().await?;
    print_snapshot(&scene.snapshot());
    Ok(())
}

async fn deliver(controller: &SceneController, command: &CanvasCommand) -> Result<()> {
    let data = serde_json::to_value(command)?;
    println!("[canvas] update {data}");
    controller.deliver(data).await?;
    Ok(())
}

fn print_replies(response: &WebhookResponse) {
    for reply in response.replies() {
        println!("assistant: {reply}");
    }
}

fn print_snapshot(snapshot: &SceneSnapshot) {
    println!(
        "[scene] rotation={:.3} tint={} spin={} restart_enabled={} frames={}",
        snapshot.sprite.rotation,
        snapshot.sprite.tint,
        snapshot.sprite.spin,
        snapshot.restart_enabled,
        snapshot.frames
    );
}
