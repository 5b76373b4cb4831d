use crate::net::Incoming;
use anyhow::{Context, Result};
use chatcloud_core::{Msg, Viewport};
use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Outbound half of the socket thread. Dropping it closes the connection.
#[derive(Debug, Clone)]
pub struct ReaderHandle {
    outbound: mpsc::UnboundedSender<Msg>,
}

impl ReaderHandle {
    /// False once the connection is gone.
    pub fn send(&self, msg: Msg) -> bool {
        self.outbound.send(msg).is_ok()
    }
}

pub fn spawn_reader(sock_path: String, viewport: Viewport, tx: Sender<Incoming>) -> ReaderHandle {
    let (outbound, out_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        rt.block_on(async move {
            if let Err(e) = run(sock_path.clone(), viewport, out_rx, tx.clone()).await {
                let _ = tx.send(Incoming::error(sock_path.clone(), format!("{e:#}")));
                let _ = tx.send(Incoming::disconnected(sock_path.clone()));
            }
        });
    });
    ReaderHandle { outbound }
}

async fn run(
    sock_path: String,
    viewport: Viewport,
    mut out_rx: mpsc::UnboundedReceiver<Msg>,
    tx: Sender<Incoming>,
) -> Result<()> {
    let stream = UnixStream::connect(&sock_path)
        .await
        .with_context(|| format!("connect UDS {sock_path}"))?;

    let mut framed = Framed::new(stream, LengthDelimitedCodec::new());

    let _ = tx.send(Incoming::connected(sock_path.clone()));

    let hello = Msg::Hello {
        version: env!("CARGO_PKG_VERSION").into(),
        viewport: Some(viewport),
    };
    framed.send(tokio_util::bytes::Bytes::from(serde_json::to_vec(&hello)?)).await?;

    loop {
        tokio::select! {
            frame = framed.next() => {
                let Some(frame) = frame else { break };
                let bytes = frame.context("read frame")?;
                match serde_json::from_slice::<Msg>(&bytes) {
                    Ok(m) => {
                        let _ = tx.send(Incoming::message(sock_path.clone(), m));
                    }
                    Err(e) => {
                        let _ = tx.send(Incoming::error(
                            sock_path.clone(),
                            format!("decode error: {e}"),
                        ));
                    }
                }
            }
            out = out_rx.recv() => {
                // UI dropped its handle
                let Some(msg) = out else { break };
                framed.send(tokio_util::bytes::Bytes::from(serde_json::to_vec(&msg)?)).await?;
            }
        }
    }

    let _ = tx.send(Incoming::disconnected(sock_path.clone()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::IncomingKind;
    use std::time::Duration;
    use tokio::net::UnixListener;

    #[test]
    fn talks_to_an_agent_socket() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sock = dir.path().join("agent.sock");
        let sock_str = sock.to_string_lossy().into_owned();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let listener = rt.block_on(async { UnixListener::bind(&sock) }).expect("bind");

        // Fake agent: check hello, answer a ping, then hang up.
        let agent = std::thread::spawn(move || {
            rt.block_on(async move {
                let (stream, _) = listener.accept().await.expect("accept");
                let mut framed = Framed::new(stream, LengthDelimitedCodec::new());
                let frame = framed.next().await.expect("hello").expect("io");
                let hello: Msg = serde_json::from_slice(&frame).expect("decode");
                assert!(matches!(
                    hello,
                    Msg::Hello { viewport: Some(Viewport { cloud_width, .. }), .. } if cloud_width == 640.0
                ));
                let frame = framed.next().await.expect("ping").expect("io");
                let ping: Msg = serde_json::from_slice(&frame).expect("decode");
                assert_eq!(ping, Msg::Ping);
                let pong = serde_json::to_vec(&Msg::Pong).expect("encode");
                framed.send(tokio_util::bytes::Bytes::from(pong)).await.expect("send");
            });
        });

        let (tx, rx) = crossbeam_channel::unbounded();
        let viewport = Viewport {
            timeline_width: 300.0,
            cloud_width: 640.0,
            cloud_height: 480.0,
        };
        let handle = spawn_reader(sock_str, viewport, tx);
        let timeout = Duration::from_secs(5);

        assert_eq!(rx.recv_timeout(timeout).expect("connected").kind, IncomingKind::Connected);
        assert!(handle.send(Msg::Ping));
        assert_eq!(
            rx.recv_timeout(timeout).expect("pong").kind,
            IncomingKind::Other(Msg::Pong)
        );
        assert_eq!(
            rx.recv_timeout(timeout).expect("disconnected").kind,
            IncomingKind::Disconnected
        );
        agent.join().expect("agent thread");
    }

    #[test]
    fn connect_failure_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sock = dir.path().join("nobody.sock").to_string_lossy().into_owned();
        let (tx, rx) = crossbeam_channel::unbounded();
        let _handle = spawn_reader(sock, Viewport::default(), tx);

        let timeout = Duration::from_secs(5);
        let first = rx.recv_timeout(timeout).expect("error");
        assert!(matches!(first.kind, IncomingKind::Error(ref e) if e.contains("connect UDS")));
        assert_eq!(
            rx.recv_timeout(timeout).expect("disconnected").kind,
            IncomingKind::Disconnected
        );
    }
}
