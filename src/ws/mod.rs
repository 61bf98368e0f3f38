mod connection;
mod destination;

use axum::{
    debug_handler,
    extract::{ws::{Message, WebSocket}, Query, State, WebSocketUpgrade},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use thiserror::Error;

use crate::{auth, lobby::{Lobby, LobbyError}, store::Store, AppResult, AppState};

pub use connection::Connection;
pub use destination::Destination;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(serde_json::Error),
    #[error("unknown destination {0}")]
    UnknownDestination(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(lobby_ws))
}

#[derive(Deserialize)]
pub(crate) struct WsQuery {
    token: Option<String>,
}

/// Browsers cannot set headers on a WebSocket handshake, so the token may
/// also come as `?token=`.
#[debug_handler(state = AppState)]
pub(crate) async fn lobby_ws(
    Query(WsQuery { token }): Query<WsQuery>,
    State(store): State<Store>,
    State(lobby): State<Lobby>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let token = token.as_deref().or_else(|| auth::bearer_token(&headers));
    let auth::AuthUser(user) = auth::authenticate(&store, token).await?;

    Ok(ws.on_upgrade(move |socket| async move {
        let (conn, outbound) = Connection::new(user, lobby);
        serve(socket, conn, outbound).await;
    }).into_response())
}

async fn serve(
    socket: WebSocket,
    mut conn: Connection,
    mut outbound: tokio::sync::mpsc::Receiver<std::sync::Arc<str>>,
) {
    let (mut sender, mut receiver) = socket.split();
    tracing::info!(conn = %conn.id(), user = %conn.user(), "client connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sender.send(Message::Text(text.as_ref().into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => conn.handle_text(text.as_str()).await,
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
            _ = &mut send_task => break,
        }
    }

    conn.close();
    send_task.abort();
    tracing::info!(conn = %conn.id(), user = %conn.user(), "client disconnected");
}
