//! WebSocket connection handlers.
//!
//! Each accepted socket is split in two: the session loop reads inbound
//! frames and drives the use cases, while the pusher loop owns the outbound
//! sink and writes whatever other contexts queue for this peer.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::task::JoinHandle;

use crate::{
    domain::{
        ClientAddress, Frame, Notification, Outbound, PeerChannel, PeerIdFactory, PeerOutbox,
        RelayError, Session, SessionState,
    },
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
    ui::state::AppState,
};

/// Outbound events queued per connection before frame delivery waits
const OUTBOUND_BUFFER: usize = 64;

/// How long a closing connection may take to flush its queue
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let address = client_address(remote, &headers, state.trust_forwarded_for);

    // 上限をわずかに超えるフレームにも message_too_large を返せるよう、
    // トランスポートの上限は設定値の 2 倍にする。
    // 2 倍を超えるフレームはトランスポート層のエラーとして扱われ、
    // エラー応答なしで切断される（相手には PEER_DISCONNECTED が届く）
    let transport_limit = state
        .forward_frame_usecase
        .max_message_size()
        .saturating_mul(2);

    ws.max_message_size(transport_limit)
        .max_frame_size(transport_limit)
        .on_upgrade(move |socket| handle_socket(socket, state, address))
}

/// Resolve the address used for rate limiting
fn client_address(remote: SocketAddr, headers: &HeaderMap, trust_forwarded_for: bool) -> ClientAddress {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                value
                    .split(',')
                    .find_map(|part| part.trim().parse::<IpAddr>().ok())
            });
        if let Some(ip) = forwarded {
            return ClientAddress::new(ip);
        }
    }
    ClientAddress::new(remote.ip())
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, address: ClientAddress) {
    let peer_id = PeerIdFactory::generate();
    let (sink, stream) = socket.split();

    let (channel, outbox) = PeerChannel::new(peer_id.clone(), OUTBOUND_BUFFER);
    state
        .connect_peer_usecase
        .execute(peer_id.clone(), channel.clone())
        .await;
    tracing::info!("Peer '{}' connected from {}", peer_id, address);

    let mut session = Session::new(peer_id, address);
    let mut send_task = pusher_loop(outbox, sink);

    // どちらかが終了したら接続を閉じる
    let writer_finished = tokio::select! {
        _ = session_loop(&mut session, stream, &state) => false,
        _ = &mut send_task => true,
    };

    state.disconnect_peer_usecase.execute(&mut session).await;

    channel.close();
    if !writer_finished
        && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
            .await
            .is_err()
    {
        tracing::warn!(
            "Writer for peer '{}' did not finish in time, aborting",
            session.peer_id()
        );
        send_task.abort();
    }
}

/// Spawns a task that writes queued events to the WebSocket sink.
///
/// On the shutdown signal the remaining queue is flushed, then a close frame
/// is sent.
fn pusher_loop(
    mut outbox: PeerOutbox,
    mut sink: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                event = outbox.receiver.recv() => match event {
                    Some(event) => {
                        if send_outbound(&mut sink, event).await.is_err() {
                            return;
                        }
                    }
                    None => break,
                },
                _ = outbox.shutdown.notified() => break,
            }
        }

        outbox.receiver.close();
        while let Ok(event) = outbox.receiver.try_recv() {
            if send_outbound(&mut sink, event).await.is_err() {
                return;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    })
}

async fn send_outbound(
    sink: &mut SplitSink<WebSocket, Message>,
    event: Outbound,
) -> Result<(), axum::Error> {
    let message = match event {
        Outbound::Frame(Frame::Text(text)) => Message::Text(text.into()),
        Outbound::Frame(Frame::Binary(bytes)) => Message::Binary(bytes.into()),
        Outbound::Notification(notification) => {
            // Domain Model から DTO への変換
            let message = ServerMessage::from(notification);
            match serde_json::to_string(&message) {
                Ok(json) => Message::Text(json.into()),
                Err(e) => {
                    tracing::error!("Failed to serialize {:?}: {}", message, e);
                    return Ok(());
                }
            }
        }
    };
    sink.send(message).await
}

/// Read inbound frames until the peer goes away or a fatal error occurs
async fn session_loop(session: &mut Session, mut stream: SplitStream<WebSocket>, state: &AppState) {
    while let Some(message) = stream.next().await {
        let frame = match message {
            Ok(Message::Text(text)) => Frame::Text(text.as_str().to_owned()),
            Ok(Message::Binary(bytes)) => Frame::Binary(bytes.to_vec()),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => {
                tracing::info!("Peer '{}' requested close", session.peer_id());
                break;
            }
            Err(e) => {
                tracing::info!("WebSocket error from peer '{}': {}", session.peer_id(), e);
                break;
            }
        };

        if let Err(e) = state.forward_frame_usecase.admit(&frame) {
            tracing::warn!("Peer '{}': {}", session.peer_id(), e);
            reject(state, session, RelayError::MessageTooLarge).await;
            break;
        }

        if session.state() == &SessionState::Connected {
            handle_control(state, session, &frame).await;
            continue;
        }

        let size = frame.len();
        match state.forward_frame_usecase.execute(session, frame).await {
            Ok(()) => {
                tracing::trace!("Relayed {} bytes from '{}'", size, session.peer_id());
            }
            Err(e) => {
                tracing::debug!("Frame from '{}' not relayed: {}", session.peer_id(), e);
                if let Some(error) = e.reply() {
                    reject(state, session, error).await;
                }
                if e.is_fatal() {
                    break;
                }
            }
        }
    }
}

/// Handle a `CREATE_ROOM` / `JOIN_ROOM` from an unpaired session
async fn handle_control(state: &AppState, session: &mut Session, frame: &Frame) {
    let result = match ClientMessage::parse(frame.as_bytes()) {
        Ok(ClientMessage::CreateRoom) => state
            .create_room_usecase
            .execute(session)
            .await
            .map(|_| ()),
        Ok(ClientMessage::JoinRoom { room_id }) => state
            .join_room_usecase
            .execute(session, &room_id)
            .await
            .map(|_| ()),
        Err(e) => {
            tracing::debug!(
                "Malformed control message from '{}': {}",
                session.peer_id(),
                e
            );
            Err(RelayError::InvalidRequest)
        }
    };

    if let Err(error) = result {
        reject(state, session, error).await;
    }
}

/// Send an error reply; the connection stays open unless the caller closes it
async fn reject(state: &AppState, session: &Session, error: RelayError) {
    if let Err(e) = state
        .message_pusher
        .push_notification(session.peer_id(), Notification::Rejected(error))
        .await
    {
        tracing::debug!("Error reply to '{}' not delivered: {}", session.peer_id(), e);
    }
}
