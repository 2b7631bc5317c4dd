//! Connection - per-client task.
//!
//! Owns the socket for one client. Inbound lines are parsed and dispatched one
//! at a time; replies the command produced for this client are written before
//! anything other connections routed to it. The task ends on QUIT, EOF, a read
//! error, a full outbound queue, an unfinished registration or repeated flooding.

use crate::handlers::{Context, HandlerError, Registry, replies};
use crate::state::{Matrix, Uid};
use futures_util::{SinkExt, StreamExt};
use relay_proto::{LineCodec, MessageRef, Reply};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument, warn};

/// Strikes before a flooding client is dropped.
const MAX_FLOOD_VIOLATIONS: u8 = 3;

type Writer = FramedWrite<OwnedWriteHalf, LineCodec>;

/// A client connection handler.
pub struct Connection {
    uid: Uid,
    stream: TcpStream,
    addr: SocketAddr,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
    outgoing: mpsc::Receiver<Arc<Reply>>,
}

/// Runs `Matrix::disconnect` if the task is dropped before its own cleanup.
struct CleanupGuard {
    uid: Uid,
    matrix: Arc<Matrix>,
    armed: bool,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let uid = std::mem::take(&mut self.uid);
        let matrix = Arc::clone(&self.matrix);
        handle.spawn(async move {
            matrix.disconnect(&uid, "Connection closed").await;
        });
    }
}

/// Identity cached between commands for rendering queued replies.
struct Session {
    nick: Option<String>,
    registered: bool,
    flood_violations: u8,
}

impl Connection {
    pub fn new(
        uid: Uid,
        stream: TcpStream,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        registry: Arc<Registry>,
        outgoing: mpsc::Receiver<Arc<Reply>>,
    ) -> Self {
        Self {
            uid,
            stream,
            addr,
            matrix,
            registry,
            outgoing,
        }
    }

    /// Run the connection until it closes.
    #[instrument(skip(self), fields(uid = %self.uid, addr = %self.addr), name = "connection")]
    pub async fn run(self) -> anyhow::Result<()> {
        let Connection {
            uid,
            stream,
            addr,
            matrix,
            registry,
            mut outgoing,
        } = self;

        let mut guard = CleanupGuard {
            uid: uid.clone(),
            matrix: Arc::clone(&matrix),
            armed: true,
        };

        let max_len = matrix.config.limits.max_line_len;
        let (read_half, write_half) = stream.into_split();
        let mut reader = FramedRead::new(read_half, LineCodec::with_max_len(max_len));
        let mut writer = FramedWrite::new(write_half, LineCodec::with_max_len(max_len));

        let timeout_secs = matrix.config.limits.registration_timeout_secs;
        let registration_deadline = tokio::time::sleep(Duration::from_secs(timeout_secs));
        tokio::pin!(registration_deadline);

        let net_trace = matrix.config.debug.net;
        let mut session = Session {
            nick: None,
            registered: false,
            flood_violations: 0,
        };

        let reason: String = loop {
            tokio::select! {
                inbound = reader.next() => {
                    let line = match inbound {
                        None => break "Client Quit".to_string(),
                        Some(Err(e)) | Some(Ok(Err(e))) => {
                            if !e.is_recoverable() {
                                debug!(error = %e, "Read error");
                                break "Read error".to_string();
                            }
                            debug!(error = %e, "Dropped malformed line");
                            continue;
                        }
                        Some(Ok(Ok(line))) => line,
                    };

                    if net_trace {
                        debug!(raw = %line, "<<");
                    }
                    if line.trim().is_empty() {
                        continue;
                    }

                    if !matrix.rate_limiter.check_message_rate(&uid) {
                        session.flood_violations += 1;
                        warn!(strikes = session.flood_violations, "Flooding detected");
                        if session.flood_violations >= MAX_FLOOD_VIOLATIONS {
                            break "Excess Flood".to_string();
                        }
                        let notice = replies::flood_warning(
                            &matrix.server_info,
                            session.flood_violations,
                            MAX_FLOOD_VIOLATIONS,
                        );
                        write_replies(&mut writer, &[notice], session.nick.as_deref(), net_trace)
                            .await?;
                        continue;
                    }

                    let msg = match MessageRef::parse(&line) {
                        Ok(msg) => msg,
                        Err(e) => {
                            debug!(error = %e, "Unparseable line");
                            continue;
                        }
                    };

                    let mut ctx = Context::new(&uid, &matrix, addr);
                    let result = registry.dispatch(&mut ctx, &msg).await;
                    let pending = ctx.take_replies();

                    if let Some(client) = matrix.client(&uid) {
                        let client = client.read().await;
                        session.nick = client.nick.clone();
                        session.registered = client.is_registered();
                    }

                    write_replies(&mut writer, &pending, session.nick.as_deref(), net_trace).await?;

                    match result {
                        Err(HandlerError::Quit(message)) => {
                            break message.unwrap_or_else(|| "Client Quit".to_string());
                        }
                        Err(HandlerError::ClientGone(_)) => break "Connection closed".to_string(),
                        _ => {}
                    }
                }

                queued = outgoing.recv() => {
                    let Some(first) = queued else {
                        break "SendQ exceeded".to_string();
                    };
                    let mut batch = vec![first];
                    while let Ok(next) = outgoing.try_recv() {
                        batch.push(next);
                    }
                    let nick = session.nick.as_deref();
                    for reply in &batch {
                        let rendered = reply.render_for(nick);
                        if net_trace {
                            debug!(raw = %rendered.trim_end(), ">>");
                        }
                        writer.feed(rendered).await?;
                    }
                    writer.flush().await?;
                }

                () = &mut registration_deadline, if timeout_secs > 0 && !session.registered => {
                    info!("Registration timed out");
                    break "Registration timeout".to_string();
                }
            }
        };

        let closing = format!("ERROR :Closing Link: {} ({reason})\r\n", addr.ip());
        if let Err(e) = writer.send(closing).await {
            debug!(error = %e, "Failed to send closing link");
        }

        matrix.disconnect(&uid, &reason).await;
        guard.armed = false;
        Ok(())
    }
}

async fn write_replies(
    writer: &mut Writer,
    pending: &[Reply],
    nick: Option<&str>,
    net_trace: bool,
) -> anyhow::Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    for reply in pending {
        let rendered = reply.render_for(nick);
        if net_trace {
            debug!(raw = %rendered.trim_end(), ">>");
        }
        writer.feed(rendered).await?;
    }
    writer.flush().await?;
    Ok(())
}
