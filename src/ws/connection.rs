//! WebSocket connection lifecycle management.
//!
//! After the Engine.IO/Socket.IO handshake the socket is split between a
//! reader task and a writer task. The reader turns frames into [`Inbound`]
//! events and answers pings through the writer; the writer drains outbound
//! events. Sends are fire-and-forget: nothing waits for an acknowledgement.

use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::TransportError;
use crate::protocol::socketio::{self, Frame, Handshake};
use crate::protocol::{Inbound, Outbound};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Namespace disconnect, sent before closing the socket.
const DISCONNECT: &str = "41";

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Connection {
    sid: String,
    outbound: mpsc::UnboundedSender<Outbound>,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

/// Opens the websocket at `url` and joins the default namespace.
pub async fn connect(url: &str) -> Result<Connection, TransportError> {
    debug!(%url, "connecting");
    let (mut socket, _) = connect_async(url).await?;
    let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, handshake(&mut socket))
        .await
        .map_err(|_| TransportError::Handshake("timed out".into()))??;
    info!(sid = %handshake.sid, ping_interval_ms = handshake.ping_interval, "connected");

    let (sink, stream) = socket.split();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Outbound>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<Inbound>();
    let (ctl_tx, ctl_rx) = mpsc::unbounded_channel::<&'static str>();

    let writer = tokio::spawn(write_loop(sink, out_rx, ctl_rx));
    let reader = tokio::spawn(read_loop(stream, in_tx, ctl_tx));

    Ok(Connection {
        sid: handshake.sid,
        outbound: out_tx,
        inbound: in_rx,
        reader,
        writer,
    })
}

impl Connection {
    /// Engine.IO session id assigned by the server.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// A handle for queueing outbound events.
    pub fn sender(&self) -> mpsc::UnboundedSender<Outbound> {
        self.outbound.clone()
    }

    /// Next inbound event. The last event of every connection is
    /// [`Inbound::Disconnect`]; after it this returns `None`.
    pub async fn recv(&mut self) -> Option<Inbound> {
        self.inbound.recv().await
    }

    /// Leaves the namespace and closes the socket.
    ///
    /// Senders obtained from [`Connection::sender`] must be dropped first,
    /// otherwise the writer keeps waiting for them until the timeout.
    pub async fn close(self) {
        let Connection { sid, outbound, inbound, reader, mut writer } = self;
        drop(outbound);
        drop(inbound);
        if tokio::time::timeout(CLOSE_TIMEOUT, &mut writer).await.is_err() {
            warn!(%sid, "writer did not finish in time");
            writer.abort();
        }
        reader.abort();
        debug!(%sid, "connection closed");
    }
}

async fn handshake(socket: &mut Socket) -> Result<Handshake, TransportError> {
    let mut open = None;
    while let Some(msg) = socket.next().await {
        let text = match msg? {
            Message::Text(text) => text,
            Message::Close(_) => return Err(TransportError::Closed),
            _ => continue,
        };
        match socketio::decode_frame(&text)? {
            Frame::Open(handshake) => {
                socket.send(Message::Text(socketio::CONNECT.into())).await?;
                open = Some(handshake);
            }
            Frame::Ping => socket.send(Message::Text(socketio::PONG.into())).await?,
            Frame::Connected => {
                return open.ok_or_else(|| {
                    TransportError::Handshake("namespace ack before open packet".into())
                });
            }
            Frame::ConnectError(message) => return Err(TransportError::Rejected(message)),
            Frame::Close | Frame::NamespaceDisconnect => return Err(TransportError::Closed),
            other => debug!(?other, "ignoring frame during handshake"),
        }
    }
    Err(TransportError::Closed)
}

async fn read_loop(
    mut stream: SplitStream<Socket>,
    inbound: mpsc::UnboundedSender<Inbound>,
    control: mpsc::UnboundedSender<&'static str>,
) {
    while let Some(msg) = stream.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(frame)) => {
                debug!(?frame, "server closed the socket");
                break;
            }
            Ok(_) => continue,
            Err(err) => {
                warn!(%err, "websocket read failed");
                break;
            }
        };
        match socketio::decode_frame(&text) {
            Ok(Frame::Event(event)) => {
                debug!(event = event.name(), "received");
                if inbound.send(event).is_err() {
                    // Nobody is listening any more.
                    return;
                }
            }
            Ok(Frame::Ping) => {
                let _ = control.send(socketio::PONG);
            }
            Ok(Frame::Close | Frame::NamespaceDisconnect) => {
                debug!("server ended the session");
                break;
            }
            Ok(frame) => debug!(?frame, "ignoring control frame"),
            Err(err) => warn!(%err, frame = %text, "dropping undecodable frame"),
        }
    }
    let _ = inbound.send(Inbound::Disconnect);
}

async fn write_loop(
    mut sink: SplitSink<Socket, Message>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    mut control: mpsc::UnboundedReceiver<&'static str>,
) {
    loop {
        let frame = tokio::select! {
            Some(frame) = control.recv() => frame.to_string(),
            msg = outbound.recv() => match msg {
                Some(msg) => match socketio::encode_event(&msg) {
                    Ok(frame) => {
                        debug!(event = msg.name(), "sending");
                        frame
                    }
                    Err(err) => {
                        error!(%err, event = msg.name(), "failed to encode event");
                        continue;
                    }
                },
                None => {
                    let _ = sink.send(Message::Text(DISCONNECT.into())).await;
                    let _ = sink.close().await;
                    return;
                }
            },
        };
        if let Err(err) = sink.send(Message::Text(frame)).await {
            warn!(%err, "websocket send failed");
            return;
        }
    }
}
