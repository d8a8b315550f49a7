//! RemoteApp launch against a loopback RAIL channel.
//!
//! Run with: cargo run -p loopback-demo -- [settings.json] [exec-result-code]
//!
//! The settings file holds a JSON `RemoteAppSettings`. The result code is
//! what the simulated server reports for the launch (0 is success).

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use futures::StreamExt;
use remoteapp_core::{
    ChannelConnectedEvent, RAIL_CHANNEL_NAME, RailClient, RailEvent, RailSession, RdpContext,
    RemoteAppSettings,
    loopback::{LoopbackChannels, LoopbackClient},
    orders::{ExecResultOrder, HandshakeExOrder},
    status::status_code,
};
use remoteapp_rail::RailClientContext;
use remoteapp_session::RdpSession;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_settings(path: Option<&str>) -> anyhow::Result<RemoteAppSettings> {
    let Some(path) = path else {
        return Ok(RemoteAppSettings::new(1024, 768, "||notepad").with_arguments("%TEMP%\\demo.txt"));
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = load_settings(args.first().map(String::as_str))?;
    let exec_result: u16 = match args.get(1) {
        Some(code) => code.parse().context("exec result code must be a number")?,
        None => 0,
    };

    let session = RdpSession::new(settings, Arc::new(LoopbackChannels::new([RAIL_CHANNEL_NAME])))?;
    session.load_remote_app();

    // Print events as they happen until the launch outcome is known.
    let mut events = session.events().history_plus_stream();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match serde_json::to_string(&event) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Failed to serialize event: {e}"),
            }
            if matches!(
                event,
                RailEvent::SessionAborted { .. }
                    | RailEvent::HandshakeFailed { .. }
                    | RailEvent::ExecuteResult { code: 0, .. }
            ) {
                break;
            }
        }
    });

    let client = Arc::new(LoopbackClient::with_latency(Duration::from_millis(5)));
    let rail = Arc::new(RailClientContext::new(
        Arc::clone(&client) as Arc<dyn RailClient>
    ));

    // The transport delivers channel events on its own thread.
    let transport_session = Arc::clone(&session);
    let transport_rail = Arc::clone(&rail);
    tokio::task::spawn_blocking(move || {
        transport_session
            .pubsub()
            .publish_channel_connected(&ChannelConnectedEvent::new(
                RAIL_CHANNEL_NAME,
                Arc::clone(&transport_rail) as _,
            ));

        if let Err(e) = transport_rail.server_handshake_ex(&HandshakeExOrder {
            build_number: 0x4563,
            rail_handshake_flags: 0,
        }) {
            tracing::warn!("RAIL handshake failed: {e}");
            return;
        }

        let result = transport_rail.server_execute_result(&ExecResultOrder {
            exec_result,
            exe_or_file: "notepad".to_string(),
            ..Default::default()
        });
        if let Err(e) = result {
            tracing::warn!(status = status_code(result), "RAIL execute result failed: {e}");
        }
    })
    .await?;

    printer.await?;

    for order in client.sent() {
        tracing::info!(?order, "sent");
    }
    tracing::info!(state = ?rail.state(), aborted = session.is_aborted(), "done");

    Ok(())
}
