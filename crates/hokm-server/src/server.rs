//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use hokm_core::{Command, Dispatcher, PlayerId, Response, SessionSnapshot, SessionStatus};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// The engine and its sessions
    pub dispatcher: Dispatcher,
    /// Mapping from player ID to their message sender
    pub player_senders: DashMap<PlayerId, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: &PlayerId, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Send a message to everyone seated at a table.
    pub fn broadcast_to_table(&self, snapshot: &SessionSnapshot, msg: ServerMessage) {
        for seat in &snapshot.seats {
            self.send_to_player(&seat.player, msg.clone());
        }
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Hokm server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Each connection plays as a fresh player
    let uuid = Uuid::new_v4();
    let player_id = PlayerId::new(uuid.to_string());

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id.clone(), tx);

    let welcome = ServerMessage::Welcome { player_id: uuid };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text.into())).await?;

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(&player_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", player_id, e);
                    state.send_to_player(
                        &player_id,
                        ServerMessage::Error {
                            error: None,
                            message: format!("Invalid message: {}", e),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(&player_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(&player_id, &state);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
pub fn handle_message(player_id: &PlayerId, msg: ClientMessage, state: &ServerState) {
    match msg {
        ClientMessage::Ping => state.send_to_player(player_id, ServerMessage::Pong),
        ClientMessage::ListLobbies => {
            let lobbies = state.dispatcher.open_lobbies();
            state.send_to_player(player_id, ServerMessage::LobbyList { lobbies });
        }
        other => {
            if let Some(command) = other.into_command(player_id.clone()) {
                handle_command(player_id, command, state);
            }
        }
    }
}

fn handle_command(player_id: &PlayerId, command: Command, state: &ServerState) {
    // Seats must be known before a cancel wipes the session
    let cancelled_table = match &command {
        Command::CancelSession { session, .. } => state.dispatcher.snapshot(*session).ok(),
        _ => None,
    };

    match state.dispatcher.dispatch(command) {
        Ok(Response::Created { session, snapshot }) => {
            state.send_to_player(
                player_id,
                ServerMessage::SessionCreated {
                    session_id: session,
                    snapshot,
                },
            );
        }
        Ok(Response::Updated(result)) => {
            let snapshot = result.snapshot.clone();
            state.broadcast_to_table(
                &snapshot,
                ServerMessage::SessionUpdated {
                    snapshot: result.snapshot,
                    events: result.events,
                },
            );
        }
        Ok(Response::Hand { session, cards }) => {
            state.send_to_player(
                player_id,
                ServerMessage::Hand {
                    session_id: session,
                    cards,
                },
            );
        }
        Ok(Response::Cancelled { session, events }) => {
            let msg = ServerMessage::SessionCancelled {
                session_id: session,
                events,
            };
            match cancelled_table {
                Some(table) => state.broadcast_to_table(&table, msg),
                None => state.send_to_player(player_id, msg),
            }
        }
        Err(e) => {
            debug!("Rejected command from {}: {}", player_id, e);
            state.send_to_player(player_id, ServerMessage::from(e));
        }
    }
}

/// Handle player disconnect.
///
/// A lobby is dropped when its creator leaves. A table in play is dropped once
/// none of its seated players is connected any more.
fn handle_disconnect(player_id: &PlayerId, state: &ServerState) {
    state.player_senders.remove(player_id);

    for table in state.dispatcher.sessions_of(player_id) {
        let creator_left_lobby = table.status == SessionStatus::Lobby
            && table.seats.first().map(|s| &s.player) == Some(player_id);
        let deserted = table
            .seats
            .iter()
            .all(|s| !state.player_senders.contains_key(&s.player));
        if !creator_left_lobby && !deserted {
            continue;
        }

        // An empty table has nobody left to vouch for it, so the server does
        match state.dispatcher.cancel_session(table.id, player_id, deserted) {
            Ok(events) => {
                info!("Dropped table {} after {} left", table.id, player_id);
                state.broadcast_to_table(
                    &table,
                    ServerMessage::SessionCancelled {
                        session_id: table.id,
                        events,
                    },
                );
            }
            Err(e) => debug!("Could not drop table {}: {}", table.id, e),
        }
    }
}
