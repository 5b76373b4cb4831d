use anyhow::{Context, Result};
use chatcloud_core::{Msg, Viewport};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::binner::bins;
use crate::brush::BrushController;
use crate::layout::{LayoutConfig, LayoutPass, LayoutProgress, LayoutResult};
use crate::store::{Dataset, EventStore};

#[derive(Debug)]
enum LayoutEvent {
    Progress(LayoutProgress),
    Done(LayoutResult),
}

type Transport<S> = Framed<S, LengthDelimitedCodec>;

/// One connected viewer: its own selection, brush state and layout passes over
/// the shared dataset.
pub async fn serve<S>(stream: S, dataset: Arc<Dataset>, layout: LayoutConfig) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());

    // Expect Hello first; anything else gets the default viewport.
    let viewport = match framed.next().await {
        Some(frame) => {
            let frame = frame.context("read hello")?;
            match serde_json::from_slice::<Msg>(&frame) {
                Ok(Msg::Hello { version, viewport }) => {
                    tracing::info!(%version, ?viewport, "viewer hello");
                    viewport.unwrap_or_default()
                }
                Ok(other) => {
                    tracing::warn!(msg = ?std::mem::discriminant(&other), "expected hello");
                    Viewport::default()
                }
                Err(err) => {
                    tracing::warn!(error = %err, "undecodable hello");
                    Viewport::default()
                }
            }
        }
        None => return Ok(()),
    };

    let hello = Msg::Hello {
        version: env!("CARGO_PKG_VERSION").into(),
        viewport: None,
    };
    send(&mut framed, &hello).await?;
    let timeline = Msg::Timeline {
        buckets: dataset.buckets.clone(),
        selection: None,
    };
    send(&mut framed, &timeline).await?;

    let mut store = EventStore::new();
    store.load(Arc::clone(&dataset.events));
    let layout = layout.with_canvas(viewport.cloud_width, viewport.cloud_height);
    let mut brush = BrushController::new(&dataset.buckets, viewport.timeline_width, layout);

    // The brush only edits the store; new active sets arrive here.
    let mut active = store.subscribe();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let initial = active.borrow_and_update().clone();
    spawn_pass(brush.start_pass(&initial), tx.clone());

    loop {
        tokio::select! {
            frame = framed.next() => {
                let Some(frame) = frame else { break };
                let frame = frame.context("read frame")?;
                let msg = match serde_json::from_slice::<Msg>(&frame) {
                    Ok(msg) => msg,
                    Err(err) => {
                        let reply = Msg::Error { message: format!("decode error: {err}") };
                        send(&mut framed, &reply).await?;
                        continue;
                    }
                };
                match msg {
                    Msg::Brush { x0, x1 } => brush.on_brush_end(&mut store, x0, x1),
                    Msg::ClearBrush => brush.on_brush_clear(&mut store),
                    Msg::Ping => send(&mut framed, &Msg::Pong).await?,
                    other => {
                        tracing::debug!(msg = ?std::mem::discriminant(&other), "ignoring message");
                    }
                }
            }
            Ok(()) = active.changed() => {
                let events = active.borrow_and_update().clone();
                let timeline = Msg::Timeline {
                    buckets: bins(&events),
                    selection: store.selection(),
                };
                send(&mut framed, &timeline).await?;
                spawn_pass(brush.start_pass(&events), tx.clone());
            }
            Some(event) = rx.recv() => forward(&mut framed, &brush, event).await?,
        }
    }

    Ok(())
}

fn spawn_pass(pass: LayoutPass, tx: mpsc::UnboundedSender<LayoutEvent>) {
    tracing::debug!(pass = pass.id(), "spawning layout task");
    tokio::spawn(async move {
        let progress_tx = tx.clone();
        let result = pass
            .run(|progress| {
                let _ = progress_tx.send(LayoutEvent::Progress(*progress));
            })
            .await;
        if let Some(result) = result {
            let _ = tx.send(LayoutEvent::Done(result)); // receiver gone with its session
        }
    });
}

async fn forward<S>(framed: &mut Transport<S>, brush: &BrushController, event: LayoutEvent) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (pass, msg) = match event {
        LayoutEvent::Progress(p) => (
            p.pass,
            Msg::LayoutProgress {
                pass: p.pass,
                placed: p.placed,
                attempted: p.attempted,
                total: p.total,
            },
        ),
        LayoutEvent::Done(result) => {
            tracing::info!(
                pass = result.pass,
                placed = result.placements.len(),
                dropped = result.dropped.len(),
                "layout ready"
            );
            (
                result.pass,
                Msg::LayoutDone {
                    pass: result.pass,
                    dropped: result.dropped.len(),
                    placements: result.placements,
                },
            )
        }
    };
    if !brush.is_current(pass) {
        tracing::debug!(pass, "dropping output of superseded pass");
        return Ok(());
    }
    send(framed, &msg).await
}

async fn send<S>(framed: &mut Transport<S>, msg: &Msg) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let bytes = serde_json::to_vec(msg).context("encode message")?;
    framed.send(tokio_util::bytes::Bytes::from(bytes)).await.context("send message")?;
    Ok(())
}
