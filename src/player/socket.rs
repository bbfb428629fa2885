//! The node's websocket: opens the session the REST API is scoped to, then
//! keeps listening so track and queue events show up in the logs. The session
//! lives exactly as long as the connection.

use futures::StreamExt;
use serenity::all::UserId;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use super::model::NodeMessage;
use super::{PlayerError, PlayerResult};
use crate::config::NodeConfig;

const CLIENT_NAME: &str = concat!("cadence/", env!("CARGO_PKG_VERSION"));

type NodeStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open node session.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    /// Completes when the node closes the connection, ending the session.
    pub listener: JoinHandle<()>,
}

/// Connect to the node and wait for its `ready` message.
///
/// The connection stays open in a background task, see [`Session::listener`].
pub async fn open_session(config: &NodeConfig, user_id: UserId) -> PlayerResult<Session> {
    let url = config
        .websocket_url()
        .map_err(|e| PlayerError::Config(e.to_string()))?;

    let mut request = url.as_str().into_client_request()?;
    let headers = request.headers_mut();
    headers.insert("Authorization", header_value(&config.password)?);
    headers.insert("User-Id", header_value(&user_id.to_string())?);
    headers.insert("Client-Name", HeaderValue::from_static(CLIENT_NAME));

    let (mut stream, _response) = connect_async(request).await?;
    debug!("Websocket connected to {}", url);

    while let Some(frame) = stream.next().await {
        match frame? {
            Message::Text(text) => match serde_json::from_str::<NodeMessage>(text.as_str()) {
                Ok(NodeMessage::Ready {
                    session_id,
                    resumed,
                }) => {
                    info!("Lavalink session {} opened (resumed: {})", session_id, resumed);
                    return Ok(Session {
                        id: session_id,
                        listener: tokio::spawn(listen(stream)),
                    });
                }
                Ok(message) => log_message(message),
                Err(e) => warn!("Unrecognized message from Lavalink: {}", e),
            },
            Message::Close(frame) => {
                return Err(PlayerError::Handshake(format!(
                    "connection closed before ready: {:?}",
                    frame
                )));
            }
            _ => {}
        }
    }

    Err(PlayerError::Handshake(
        "connection ended before ready".to_string(),
    ))
}

fn header_value(value: &str) -> PlayerResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| PlayerError::Config(e.to_string()))
}

async fn listen(mut stream: NodeStream) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<NodeMessage>(text.as_str()) {
                Ok(message) => log_message(message),
                Err(e) => warn!("Unrecognized message from Lavalink: {}", e),
            },
            Ok(Message::Close(frame)) => {
                warn!("Lavalink closed the websocket: {:?}", frame);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Lavalink websocket error: {}", e);
                break;
            }
        }
    }
    warn!("Lavalink websocket listener stopped");
}

fn log_message(message: NodeMessage) {
    match message {
        NodeMessage::Ready { session_id, .. } => {
            debug!("Duplicate ready message for session {}", session_id)
        }
        NodeMessage::PlayerUpdate { guild_id, state } => debug!(
            "Player update for guild {}: position {}ms, connected {}",
            guild_id, state.position, state.connected
        ),
        NodeMessage::Stats {} => {}
        NodeMessage::Event(event) => {
            let title = event
                .track
                .as_ref()
                .map(|track| track.info.title.as_str())
                .unwrap_or("unknown");

            match event.kind.as_str() {
                "TrackStartEvent" => info!("Track started in guild {}: {}", event.guild_id, title),
                "TrackEndEvent" => info!(
                    "Track ended in guild {}: {} ({})",
                    event.guild_id,
                    title,
                    event.reason.as_deref().unwrap_or("unknown reason")
                ),
                "QueueEndEvent" => info!("Queue ended in guild {}", event.guild_id),
                "TrackExceptionEvent" | "TrackStuckEvent" => {
                    warn!("{} in guild {}: {}", event.kind, event.guild_id, title)
                }
                other => debug!("Unhandled {} in guild {}", other, event.guild_id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::test_support::{node_config, serve_sessions};
    use assert_matches::assert_matches;
    use std::time::Duration;

    const READY: &str = r#"{"op":"ready","resumed":false,"sessionId":"la3kfsdf5eafe848"}"#;
    const STATS: &str = r#"{"op":"stats","players":0,"playingPlayers":0}"#;

    #[tokio::test]
    async fn test_open_session_returns_ready_session_id() {
        let host = serve_sessions(vec![vec![STATS, READY]], true).await;

        let session = open_session(&node_config(host), UserId::new(1)).await.unwrap();
        assert_eq!(session.id, "la3kfsdf5eafe848");
        assert!(!session.listener.is_finished());
        session.listener.abort();
    }

    #[tokio::test]
    async fn test_open_session_fails_without_ready() {
        let host = serve_sessions(vec![vec![STATS]], false).await;

        assert_matches!(
            open_session(&node_config(host), UserId::new(1)).await,
            Err(PlayerError::Handshake(_))
        );
    }

    #[tokio::test]
    async fn test_listener_ends_when_node_closes() {
        let host = serve_sessions(vec![vec![READY]], false).await;

        let session = open_session(&node_config(host), UserId::new(1)).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), session.listener)
            .await
            .expect("listener should stop once the node closes")
            .unwrap();
    }
}
