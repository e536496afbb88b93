//! WebSocket connection handlers.
//!
//! 1 接続 = 1 ConnectionId = 1 writer task。受信ループが ClientEvent を
//! UseCase に渡し、返ってきた配信計画を connections マップ経由で送信します。
//! どの経路で切れても（close frame / transport error / writer 停止）
//! 最後の cleanup は DisconnectUseCase に収束します。

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{
        ConnectionId, DisplayName, MessageBody, Role, RoomError, SessionId, SignalPayload, UserId,
    },
    infrastructure::dto::websocket::{ClientEvent, ErrorCode, RoomMemberInfo, ServerEvent},
    ui::state::{AppState, ClientInfo},
    usecase::{
        DisconnectUseCase, JoinRoomUseCase, LeaveRoomUseCase, PresenceUpdate,
        RegisterConnectionUseCase, RelaySignalUseCase, SendMessageUseCase, WatchStatusUseCase,
        register_connection::build_presence_update,
    },
};

/// The transport's registry binding, shared between the receive loop and
/// the disconnect cleanup.
type Registration = Arc<Mutex<Option<(UserId, Role)>>>;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // Connection refs are minted here, never taken from the client
    let connection = ConnectionId::generate();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state
        .connections
        .lock()
        .await
        .insert(connection, ClientInfo { sender: tx });
    tracing::info!("connection '{}' accepted", connection);

    let (mut sender, mut receiver) = socket.split();

    let registration: Registration = Arc::new(Mutex::new(None));

    // Task that drains this connection's outbound channel into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    let state_clone = state.clone();
    let registration_clone = registration.clone();

    // Task that dispatches inbound events to the usecases
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("websocket error on '{}': {}", connection, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => {
                            dispatch_event(&state_clone, connection, &registration_clone, event)
                                .await;
                        }
                        Err(e) => {
                            tracing::warn!("unparseable event on '{}': {}", connection, e);
                            state_clone
                                .deliver(
                                    &connection,
                                    &ServerEvent::Error {
                                        code: ErrorCode::InvalidPayload,
                                        message: format!("unrecognized event: {e}"),
                                    },
                                )
                                .await;
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::info!("connection '{}' requested close", connection);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Drop the transport first so the cleanup fan-out never targets it
    state.connections.lock().await.remove(&connection);
    let registration = registration.lock().await.take();

    let disconnect_usecase = DisconnectUseCase::new(
        state.registry.clone(),
        state.subscriptions.clone(),
        state.rooms.clone(),
    );
    let outcome = disconnect_usecase.execute(registration, connection).await;

    for departure in &outcome.departures {
        let event = ServerEvent::UserLeft {
            connection_id: departure.member.connection.to_string(),
            participant_id: departure.member.participant_id.to_string(),
        };
        state.deliver_many(&departure.recipients, &event).await;
    }
    if let Some(presence) = &outcome.presence {
        fan_out_presence(&state, presence).await;
    }

    tracing::info!("connection '{}' cleaned up", connection);
}

/// Route one inbound event to its usecase and deliver the resulting events.
async fn dispatch_event(
    state: &Arc<AppState>,
    connection: ConnectionId,
    registration: &Registration,
    event: ClientEvent,
) {
    match event {
        ClientEvent::RegisterMember { identity } => {
            register(state, connection, registration, identity, Role::Member).await;
        }
        ClientEvent::RegisterCoach { identity } => {
            register(state, connection, registration, identity, Role::Coach).await;
        }
        ClientEvent::RegisterOperator { identity } => {
            register(state, connection, registration, identity, Role::Operator).await;
        }
        ClientEvent::SubscribeStatus { target_id } => {
            let Some((identity, _)) = require_registration(state, connection, registration).await
            else {
                return;
            };
            let Some(target) = parse_user_id(state, connection, target_id).await else {
                return;
            };

            let usecase =
                WatchStatusUseCase::new(state.registry.clone(), state.subscriptions.clone());
            let is_online = usecase.subscribe(identity, target.clone()).await;

            // Initial snapshot so the subscriber does not start blind
            state
                .deliver(
                    &connection,
                    &ServerEvent::UserStatusChange {
                        target_id: target.into_string(),
                        is_online,
                    },
                )
                .await;
        }
        ClientEvent::UnsubscribeStatus { target_id } => {
            let Some((identity, _)) = require_registration(state, connection, registration).await
            else {
                return;
            };
            let Some(target) = parse_user_id(state, connection, target_id).await else {
                return;
            };

            let usecase =
                WatchStatusUseCase::new(state.registry.clone(), state.subscriptions.clone());
            usecase.unsubscribe(&identity, &target).await;
        }
        ClientEvent::PrivateMessage { to_id, body } => {
            let Some((identity, _)) = require_registration(state, connection, registration).await
            else {
                return;
            };
            let Some(receiver) = parse_user_id(state, connection, to_id).await else {
                return;
            };
            let body = match body.validate() {
                Ok(body) => body,
                Err(e) => {
                    deliver_error(state, connection, ErrorCode::InvalidPayload, e.to_string())
                        .await;
                    return;
                }
            };

            send_private_message(state, connection, identity, receiver, body).await;
        }
        ClientEvent::JoinVideoRoom {
            session_id,
            participant_id,
            display_name,
        } => {
            if require_registration(state, connection, registration)
                .await
                .is_none()
            {
                return;
            }
            let Some(session_id) = parse_session_id(state, connection, session_id).await else {
                return;
            };
            let Some(participant_id) = parse_user_id(state, connection, participant_id).await
            else {
                return;
            };
            let display_name = match DisplayName::new(display_name) {
                Ok(name) => name,
                Err(e) => {
                    deliver_error(state, connection, ErrorCode::InvalidPayload, e.to_string())
                        .await;
                    return;
                }
            };

            join_video_room(state, connection, session_id, participant_id, display_name).await;
        }
        ClientEvent::LeaveVideoRoom { session_id } => {
            if require_registration(state, connection, registration)
                .await
                .is_none()
            {
                return;
            }
            let Some(session_id) = parse_session_id(state, connection, session_id).await else {
                return;
            };

            let usecase = LeaveRoomUseCase::new(state.rooms.clone());
            let outcome = usecase.execute(&session_id, &connection).await;

            if let Some(member) = outcome.removed {
                let recipients: Vec<ConnectionId> =
                    outcome.remaining.iter().map(|m| m.connection).collect();
                state
                    .deliver_many(
                        &recipients,
                        &ServerEvent::UserLeft {
                            connection_id: member.connection.to_string(),
                            participant_id: member.participant_id.to_string(),
                        },
                    )
                    .await;
            }
        }
        ClientEvent::SendSignal {
            session_id,
            to_connection,
            signal,
        } => {
            if require_registration(state, connection, registration)
                .await
                .is_none()
            {
                return;
            }
            relay_signal(state, connection, session_id, to_connection, signal, false).await;
        }
        ClientEvent::ReturnSignal {
            session_id,
            to_connection,
            signal,
        } => {
            if require_registration(state, connection, registration)
                .await
                .is_none()
            {
                return;
            }
            relay_signal(state, connection, session_id, to_connection, signal, true).await;
        }
    }
}

async fn register(
    state: &Arc<AppState>,
    connection: ConnectionId,
    registration: &Registration,
    identity: String,
    role: Role,
) {
    let identity = match UserId::new(identity) {
        Ok(identity) => identity,
        Err(e) => {
            deliver_error(state, connection, ErrorCode::InvalidPayload, e.to_string()).await;
            return;
        }
    };

    // A transport re-registering under a different binding releases the old
    // one first, so the registry never holds two bindings for one socket
    let previous = registration.lock().await.clone();
    if let Some((old_identity, old_role)) = previous
        && (old_identity != identity || old_role != role)
    {
        let removal = state
            .registry
            .remove(&old_identity, old_role, &connection)
            .await;
        if removal.went_offline {
            let presence = build_presence_update(
                &*state.registry,
                &*state.subscriptions,
                old_identity.clone(),
                false,
            )
            .await;
            fan_out_presence(state, &presence).await;
            state.subscriptions.drop_observer(&old_identity).await;
        }
    }

    let usecase =
        RegisterConnectionUseCase::new(state.registry.clone(), state.subscriptions.clone());
    let outcome = usecase.execute(identity.clone(), role, connection).await;
    *registration.lock().await = Some((identity.clone(), role));

    if let Some(replaced) = outcome.replaced {
        tracing::info!(
            "'{}' ({}) reconnected, replacing connection '{}'",
            identity,
            role,
            replaced
        );
    } else {
        tracing::info!("'{}' registered as {} on '{}'", identity, role, connection);
    }

    state
        .deliver(
            &connection,
            &ServerEvent::Registered {
                connection_id: connection.to_string(),
                role: role.as_str().to_string(),
                registered_at: outcome.registered_at.value(),
            },
        )
        .await;

    if let Some(presence) = &outcome.presence {
        fan_out_presence(state, presence).await;
    }
}

async fn send_private_message(
    state: &Arc<AppState>,
    connection: ConnectionId,
    sender_id: UserId,
    receiver_id: UserId,
    body: MessageBody,
) {
    let usecase = SendMessageUseCase::new(state.registry.clone(), state.chat_store.clone());
    match usecase.execute(sender_id, receiver_id, body).await {
        Ok(outcome) => {
            state
                .deliver(
                    &connection,
                    &ServerEvent::MessageSent {
                        message: outcome.record.clone(),
                    },
                )
                .await;
            state
                .deliver_many(
                    &outcome.recipient_connections,
                    &ServerEvent::ReceiveMessage {
                        message: outcome.record,
                    },
                )
                .await;
        }
        Err(e) => {
            tracing::warn!("message persistence failed: {}", e);
            deliver_error(
                state,
                connection,
                ErrorCode::DeliveryFailed,
                "message could not be stored and was not delivered".to_string(),
            )
            .await;
        }
    }
}

async fn join_video_room(
    state: &Arc<AppState>,
    connection: ConnectionId,
    session_id: SessionId,
    participant_id: UserId,
    display_name: DisplayName,
) {
    let usecase = JoinRoomUseCase::new(state.rooms.clone());
    let outcome = match usecase
        .execute(session_id.clone(), connection, participant_id, display_name)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            deliver_room_error(state, connection, &e).await;
            return;
        }
    };

    let members = outcome
        .roster
        .iter()
        .map(|m| RoomMemberInfo {
            connection_id: m.connection.to_string(),
            participant_id: m.participant_id.to_string(),
            display_name: m.display_name.to_string(),
        })
        .collect();
    state
        .deliver(
            &connection,
            &ServerEvent::RoomJoined {
                session_id: session_id.into_string(),
                status: outcome.status,
                connection_id: connection.to_string(),
                members,
            },
        )
        .await;

    // Each existing member initiates its own offer toward the newcomer
    let peer_connections: Vec<ConnectionId> =
        outcome.peers.iter().map(|m| m.connection).collect();
    state
        .deliver_many(
            &peer_connections,
            &ServerEvent::UserJoined {
                connection_id: outcome.member.connection.to_string(),
                participant_id: outcome.member.participant_id.to_string(),
                display_name: outcome.member.display_name.to_string(),
            },
        )
        .await;
}

async fn relay_signal(
    state: &Arc<AppState>,
    connection: ConnectionId,
    session_id: String,
    to_connection: String,
    signal: SignalPayload,
    returned: bool,
) {
    let Some(session_id) = parse_session_id(state, connection, session_id).await else {
        return;
    };
    let to = match ConnectionId::parse(&to_connection) {
        Ok(to) => to,
        Err(e) => {
            deliver_error(state, connection, ErrorCode::InvalidPayload, e.to_string()).await;
            return;
        }
    };

    let usecase = RelaySignalUseCase::new(state.rooms.clone());
    match usecase.execute(&session_id, &to).await {
        Ok(Some(target)) => {
            let event = if returned {
                ServerEvent::ReceivingReturnedSignal {
                    from_connection: connection.to_string(),
                    signal,
                }
            } else {
                ServerEvent::ReceiveSignal {
                    from_connection: connection.to_string(),
                    signal,
                }
            };
            state.deliver(&target, &event).await;
        }
        Ok(None) => {
            // The peer left mid-handshake; this race is expected
            tracing::debug!(
                "dropping signal for departed connection '{}' in session '{}'",
                to,
                session_id
            );
        }
        Err(e) => {
            deliver_room_error(state, connection, &e).await;
        }
    }
}

async fn fan_out_presence(state: &Arc<AppState>, presence: &PresenceUpdate) {
    state
        .deliver_many(
            &presence.recipients,
            &ServerEvent::UserStatusChange {
                target_id: presence.target_id.to_string(),
                is_online: presence.is_online,
            },
        )
        .await;
}

/// Return the transport's binding, or reject the operation with
/// `not-registered`.
async fn require_registration(
    state: &Arc<AppState>,
    connection: ConnectionId,
    registration: &Registration,
) -> Option<(UserId, Role)> {
    let binding = registration.lock().await.clone();
    if binding.is_none() {
        deliver_error(
            state,
            connection,
            ErrorCode::NotRegistered,
            "register an identity before using the hub".to_string(),
        )
        .await;
    }
    binding
}

async fn parse_user_id(
    state: &Arc<AppState>,
    connection: ConnectionId,
    raw: String,
) -> Option<UserId> {
    match UserId::new(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            deliver_error(state, connection, ErrorCode::InvalidPayload, e.to_string()).await;
            None
        }
    }
}

async fn parse_session_id(
    state: &Arc<AppState>,
    connection: ConnectionId,
    raw: String,
) -> Option<SessionId> {
    match SessionId::new(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            deliver_error(state, connection, ErrorCode::InvalidPayload, e.to_string()).await;
            None
        }
    }
}

async fn deliver_error(
    state: &Arc<AppState>,
    connection: ConnectionId,
    code: ErrorCode,
    message: String,
) {
    state
        .deliver(&connection, &ServerEvent::Error { code, message })
        .await;
}

async fn deliver_room_error(state: &Arc<AppState>, connection: ConnectionId, error: &RoomError) {
    let code = match error {
        RoomError::SessionEnded(_) => ErrorCode::SessionEnded,
        RoomError::InvalidStatusTransition { .. } => ErrorCode::InvalidPayload,
    };
    deliver_error(state, connection, code, error.to_string()).await;
}
