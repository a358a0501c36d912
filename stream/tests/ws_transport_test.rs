//! Drives the real WebSocket transport against a loopback server.

use std::net::SocketAddr;
use std::time::Duration;

use corelib::ConnectionState;
use futures::{SinkExt, StreamExt};
use stream::{SessionHandle, StreamConfig, WsTransport, spawn_session};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);

/// What the fake sample source does after sending its frames.
#[derive(Clone, Copy)]
enum AfterFrames {
    WaitForClientClose,
    CloseFromServer,
}

/// Accepts one client, sends `frames`, then follows `after`.
/// Resolves to true if the client sent a close frame.
async fn sample_source(
    frames: Vec<&'static str>,
    after: AfterFrames,
) -> anyhow::Result<(SocketAddr, JoinHandle<anyhow::Result<bool>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await?;
        let mut ws = accept_async(tcp).await?;

        for f in frames {
            ws.send(Message::Text(f.to_string().into())).await?;
        }

        if let AfterFrames::CloseFromServer = after {
            ws.close(None).await?;
        }

        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Close(_)) => return Ok(true),
                Ok(_) => continue,
                Err(_) => return Ok(false),
            }
        }
        Ok(false)
    });

    Ok((addr, server))
}

fn start(addr: SocketAddr) -> anyhow::Result<SessionHandle> {
    let cfg = StreamConfig::default().with_endpoint(format!("ws://{addr}"));
    let (handle, _task) = spawn_session(WsTransport::from_config(&cfg), &cfg)?;
    Ok(handle)
}

async fn eventually(mut check: impl FnMut() -> bool) -> anyhow::Result<()> {
    timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;
    Ok(())
}

#[tokio::test]
async fn receives_frames_and_closes_on_toggle() -> anyhow::Result<()> {
    let (addr, server) = sample_source(
        vec![
            r#"{"channel1": 0.5, "channel2": -0.3, "timestamp": 1000}"#,
            "not a sample",
            r#"{"channel1": 0.7, "channel2": -0.1, "timestamp": 1010}"#,
        ],
        AfterFrames::WaitForClientClose,
    )
    .await?;

    let handle = start(addr)?;
    let mut state = handle.subscribe_state();
    let mut window = handle.subscribe_window();

    handle.toggle().await?;
    timeout(WAIT, state.wait_for(|s| s.is_connected())).await??;
    timeout(WAIT, window.wait_for(|w| w.len() == 2)).await??;

    let snap = handle.snapshot();
    assert_eq!(snap.series("channel1").len(), 2);
    assert_eq!(snap.last().and_then(|r| r.channel("channel2")), Some(-0.1));
    eventually(|| handle.counters().decode_failures == 1).await?;

    handle.toggle().await?;
    timeout(WAIT, state.wait_for(|s| *s == ConnectionState::Disconnected)).await??;

    let saw_close = timeout(WAIT, server).await???;
    assert!(saw_close, "server should receive a close frame");

    Ok(())
}

#[tokio::test]
async fn remote_close_disconnects() -> anyhow::Result<()> {
    let (addr, _server) = sample_source(
        vec![r#"{"channel1": 1.0, "timestamp": 1000}"#],
        AfterFrames::CloseFromServer,
    )
    .await?;

    let handle = start(addr)?;
    handle.toggle().await?;

    eventually(|| handle.counters().closed == 1).await?;

    let counters = handle.counters();
    assert_eq!(counters.opened, 1);
    assert_eq!(counters.samples_appended, 1);
    assert_eq!(handle.state(), ConnectionState::Disconnected);
    assert_eq!(handle.snapshot().len(), 1);

    Ok(())
}

#[tokio::test]
async fn refused_connection_falls_back_to_disconnected() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let handle = start(addr)?;
    handle.toggle().await?;

    eventually(|| handle.counters().closed == 1).await?;

    assert_eq!(handle.counters().opened, 0);
    assert_eq!(handle.state(), ConnectionState::Disconnected);

    // Still operable: a later toggle starts a fresh attempt.
    handle.toggle().await?;
    eventually(|| handle.counters().attempts == 2).await?;

    Ok(())
}
