use anyhow::anyhow;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use lectern_core::{ClientEvent, ConnectionId, ParticipantId, RoomId};

use crate::room::{RoomCommand, RoomManager};
use crate::signaling::SignalingService;

/// Shared state behind the signaling endpoint.
#[derive(Clone)]
pub struct AppState {
    pub service: SignalingService,
    pub rooms: RoomManager,
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let conn = ConnectionId::new();
    ws.on_upgrade(move |socket| handle_socket(socket, conn, state))
}

/// The room a connection committed to with its first announce/join.
struct Binding {
    room: RoomId,
    participant_id: ParticipantId,
    commands: mpsc::Sender<RoomCommand>,
}

async fn handle_socket(socket: WebSocket, conn: ConnectionId, state: AppState) {
    info!("New signaling connection: {}", conn);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.service.add_connection(conn, tx);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let mut binding: Option<Binding> = None;

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    if let Err(e) = handle_event(conn, event, &state, &mut binding).await {
                        error!("Room mailbox gone for connection {}: {}", conn, e);
                        break;
                    }
                }
                Err(e) => warn!("Invalid client event on {}: {:?}", conn, e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    if let Some(binding) = &binding {
        let _ = binding
            .commands
            .send(RoomCommand::Disconnect { conn })
            .await;
        info!(
            "Connection {} left room {} ({})",
            conn, binding.room, binding.participant_id
        );
    }

    send_task.abort();
    state.service.remove_connection(&conn);
    info!("Signaling connection closed: {}", conn);
}

async fn handle_event(
    conn: ConnectionId,
    event: ClientEvent,
    state: &AppState,
    binding: &mut Option<Binding>,
) -> anyhow::Result<()> {
    match event {
        ClientEvent::AnnounceBroadcaster {
            room,
            participant_id,
        } => {
            bind(conn, room, participant_id, state, binding, |conn, participant_id| {
                RoomCommand::AnnounceBroadcaster {
                    conn,
                    participant_id,
                }
            })
            .await?;
        }
        ClientEvent::JoinWatcher {
            room,
            participant_id,
        } => {
            bind(conn, room, participant_id, state, binding, |conn, participant_id| {
                RoomCommand::JoinWatcher {
                    conn,
                    participant_id,
                }
            })
            .await?;
        }
        ClientEvent::Offer { to, sdp, .. } => {
            let Some(binding) = binding else {
                warn!("Relay event from unbound connection {}", conn);
                return Ok(());
            };
            forward(
                &binding.commands,
                RoomCommand::Offer {
                    from: binding.participant_id.clone(),
                    to,
                    sdp,
                },
            )
            .await?;
        }
        ClientEvent::Answer { to, sdp, .. } => {
            let Some(binding) = binding else {
                warn!("Relay event from unbound connection {}", conn);
                return Ok(());
            };
            forward(
                &binding.commands,
                RoomCommand::Answer {
                    from: binding.participant_id.clone(),
                    to,
                    sdp,
                },
            )
            .await?;
        }
        ClientEvent::Candidate { candidate, .. } => {
            let Some(binding) = binding else {
                warn!("Relay event from unbound connection {}", conn);
                return Ok(());
            };
            forward(
                &binding.commands,
                RoomCommand::Candidate {
                    conn,
                    from: binding.participant_id.clone(),
                    candidate,
                },
            )
            .await?;
        }
        ClientEvent::EngagementSignal { label, .. } => {
            let Some(binding) = binding else {
                warn!("Engagement signal from unbound connection {}", conn);
                return Ok(());
            };
            forward(
                &binding.commands,
                RoomCommand::EngagementSignal {
                    conn,
                    from: binding.participant_id.clone(),
                    label,
                },
            )
            .await?;
        }
    }

    Ok(())
}

/// Commits the connection to one room. A second announce/join on the same
/// connection is ignored; a session has exactly one room and one role.
async fn bind(
    conn: ConnectionId,
    room: RoomId,
    participant_id: ParticipantId,
    state: &AppState,
    binding: &mut Option<Binding>,
    make_command: impl FnOnce(ConnectionId, ParticipantId) -> RoomCommand,
) -> anyhow::Result<()> {
    if binding.is_some() {
        warn!("Connection {} tried to bind twice, ignoring", conn);
        return Ok(());
    }

    let commands = state.rooms.room_sender(&room);
    forward(&commands, make_command(conn, participant_id.clone())).await?;
    *binding = Some(Binding {
        room,
        participant_id,
        commands,
    });
    Ok(())
}

async fn forward(
    commands: &mpsc::Sender<RoomCommand>,
    cmd: RoomCommand,
) -> anyhow::Result<()> {
    commands
        .send(cmd)
        .await
        .map_err(|_| anyhow!("room mailbox closed"))
}
