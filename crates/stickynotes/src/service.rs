//! Orchestrator runtime and the JSON-lines renderer bridge.
//!
//! The renderer talks to the orchestrator over a pair of byte streams (stdin
//! and stdout for `stickies run`): one [`Inbound`] frame per input line, one
//! [`Outbound`] frame per output line.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::host::{RemoteHost, WindowHost};
use crate::note::NoteId;
use crate::orchestrator::Orchestrator;
use crate::protocol::{
    frame_channel, inbound_channel, FrameReceiver, Inbound, InboundReceiver, InboundSender,
};
use crate::store::NoteStore;

/// What to open once the orchestrator is up.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip opening the manager window.
    pub no_manager: bool,
    /// Notes to open at startup.
    pub open: Vec<NoteId>,
}

/// Open the startup windows. Failures are logged, not fatal.
pub fn startup<H: WindowHost>(orchestrator: &mut Orchestrator<H>, options: &RunOptions) {
    if !options.no_manager {
        if let Err(e) = orchestrator.open_or_create_manager() {
            error!("Failed to open manager window: {e}");
        }
    }
    for id in &options.open {
        if let Err(e) = orchestrator.open_or_create_note(Some(id)) {
            error!("Failed to open note {id}: {e}");
        }
    }
}

/// Process inbound messages one at a time until the queue closes or
/// `shutdown` resolves. Messages already queued are handled first.
pub async fn serve<H, F>(orchestrator: &mut Orchestrator<H>, mut inbound: InboundReceiver, shutdown: F)
where
    H: WindowHost,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;
            msg = inbound.recv() => match msg {
                Some(msg) => orchestrator.dispatch(msg),
                None => {
                    debug!("inbound queue closed");
                    break;
                }
            },
            () = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }
}

/// Parse inbound frames from `reader`, one JSON document per line.
///
/// Malformed lines are logged and skipped. Returns at end of input or when
/// the orchestrator's queue is gone.
///
/// # Errors
///
/// Returns an error if reading from `reader` fails.
pub async fn read_frames<R>(reader: R, inbound: InboundSender) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Inbound>(line) {
            Ok(msg) => {
                if inbound.send(msg).is_err() {
                    break;
                }
            }
            Err(e) => warn!("Ignoring malformed frame: {e}"),
        }
    }
    debug!("renderer input closed");
    Ok(())
}

/// Write outbound frames to `writer`, one JSON document per line, until every
/// frame sender is dropped.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub async fn write_frames<W>(mut writer: W, mut frames: FrameReceiver) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = frames.recv().await {
        let mut line = serde_json::to_vec(&frame)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Run the orchestrator against a renderer on stdin/stdout.
///
/// Returns when stdin closes or on Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or stdout fails.
pub async fn run_stdio(config: Config, options: RunOptions) -> Result<()> {
    let store = NoteStore::open(config.store_dir())?;

    let (inbound_tx, inbound_rx) = inbound_channel();
    let (frame_tx, frame_rx) = frame_channel();
    let host = RemoteHost::new(frame_tx, inbound_tx.clone());
    let mut orchestrator = Orchestrator::new(config, store, host);

    let writer = tokio::spawn(write_frames(tokio::io::stdout(), frame_rx));

    let (eof_tx, eof_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = read_frames(stdin, inbound_tx).await {
            error!("Failed to read renderer input: {e}");
        }
        let _ = eof_tx.send(());
    });

    startup(&mut orchestrator, &options);
    info!("Orchestrator running");

    let shutdown = async move {
        tokio::select! {
            _ = eof_rx => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    };
    serve(&mut orchestrator, inbound_rx, shutdown).await;

    // Dropping the host closes the frame channel and lets the writer finish.
    drop(orchestrator);
    match writer.await {
        Ok(result) => result,
        Err(e) => {
            error!("Frame writer task failed: {e}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::WindowId;
    use crate::protocol::{frame_channel, Command, Outbound};

    #[tokio::test]
    async fn test_read_frames_skips_garbage() {
        let input = concat!(
            "{\"type\":\"command\",\"sender\":1,\"command\":{\"channel\":\"toggle-pin\"}}\n",
            "\n",
            "this is not json\n",
            "{\"type\":\"window\",\"window\":2,\"event\":{\"kind\":\"ready\"}}\n",
        );
        let (tx, mut rx) = inbound_channel();

        read_frames(input.as_bytes(), tx).await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            Inbound::Command {
                sender: WindowId::new(1),
                command: Command::TogglePin
            }
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            Inbound::Window { .. }
        ));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_write_frames_one_per_line() {
        let (tx, rx) = frame_channel();
        tx.send(Outbound::Event {
            window: WindowId::new(3),
            event: crate::protocol::Event::PinUpdated(true),
        })
        .unwrap();
        tx.send(Outbound::Event {
            window: WindowId::new(3),
            event: crate::protocol::Event::PinUpdated(false),
        })
        .unwrap();
        drop(tx);

        let mut out = Vec::new();
        write_frames(&mut out, rx).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Outbound = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(
            first,
            Outbound::Event {
                window: WindowId::new(3),
                event: crate::protocol::Event::PinUpdated(true)
            }
        );
    }
}
