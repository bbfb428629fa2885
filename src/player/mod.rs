//! Per-guild playback coordinator backed by a Lavalink node.
//!
//! The node owns all playback state: the current track, the paused flag and
//! the queue. [`Player`] only knows how to reach it, so every call derives what
//! it needs from the node and no guild state is cached here. Concurrent calls
//! for the same guild are not serialized; the node's queue is the arbiter.

use std::time::Duration;

use reqwest::StatusCode;
use serenity::all::UserId;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use tracing::{error, info, warn};

use crate::PlayerSlot;
use crate::config::NodeConfig;
use crate::gateway::GatewayError;

pub mod model;
pub mod node;
mod playback;
mod queue;
pub mod socket;
mod voice;

pub use model::{LoadResult, PlayerState, Queue, QueueTrack, Track};
pub use node::NodeClient;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Exponential delay between node reconnect attempts.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Backoff {
    /// Delay after `failures` consecutive failed attempts.
    pub fn delay(&self, failures: u32) -> Duration {
        self.initial
            .saturating_mul(2u32.saturating_pow(failures.min(16)))
            .min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
        }
    }
}

pub type PlayerResult<T> = Result<T, PlayerError>;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("failed to join voice channel: {0}")]
    JoinVoice(#[source] GatewayError),

    #[error("no results found")]
    NoResults,

    #[error("no track found")]
    NoTrackFound,

    #[error("failed to load track: {0}")]
    Load(model::Exception),

    #[error("lavalink error: {0}")]
    Node(model::NodeError),

    #[error("unexpected status {0} from node")]
    UnexpectedStatus(StatusCode),

    #[error("failed to reach node: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("node websocket error: {0}")]
    Socket(#[from] Box<tungstenite::Error>),

    #[error("node did not open a session: {0}")]
    Handshake(String),

    #[error("invalid node configuration: {0}")]
    Config(String),

    #[error("failed to decode node response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The queue had nothing left. Playback was stopped; `stop_failure` holds
    /// the error if that stop was rejected.
    #[error("queue is empty{}", stop_suffix(.stop_failure))]
    QueueEmpty { stop_failure: Option<Box<PlayerError>> },

    /// The node answered `queue/next` with something that is not a track.
    #[error("failed to unmarshal response: {source}{}", stop_suffix(.stop_failure))]
    Unmarshal {
        source: serde_json::Error,
        stop_failure: Option<Box<PlayerError>>,
    },
}

fn stop_suffix(stop_failure: &Option<Box<PlayerError>>) -> String {
    match stop_failure {
        Some(error) => format!(": failed to stop player: {}", error),
        None => String::new(),
    }
}

impl PlayerError {
    /// The node's own message, if the node (rather than the network) failed.
    pub fn node_message(&self) -> Option<&str> {
        match self {
            PlayerError::Node(error) => Some(&error.message),
            PlayerError::Load(exception) => {
                Some(exception.message.as_deref().unwrap_or(&exception.cause))
            }
            PlayerError::QueueEmpty {
                stop_failure: Some(stop),
            }
            | PlayerError::Unmarshal {
                stop_failure: Some(stop),
                ..
            } => stop.node_message(),
            _ => None,
        }
    }

    /// Whether the node or Discord could not be reached at all.
    pub fn is_transport(&self) -> bool {
        match self {
            PlayerError::Transport(_)
            | PlayerError::Socket(_)
            | PlayerError::Handshake(_)
            | PlayerError::JoinVoice(_) => true,
            PlayerError::QueueEmpty {
                stop_failure: Some(stop),
            }
            | PlayerError::Unmarshal {
                stop_failure: Some(stop),
                ..
            } => stop.is_transport(),
            _ => false,
        }
    }
}

impl From<tungstenite::Error> for PlayerError {
    fn from(error: tungstenite::Error) -> Self {
        PlayerError::Socket(Box::new(error))
    }
}

/// Coordinates playback for every guild through one node session.
#[derive(Debug, Clone)]
pub struct Player {
    node: NodeClient,
}

impl Player {
    pub fn new(node: NodeClient) -> Self {
        Self { node }
    }

    /// Open a session on the node described by `config` and build a player on it.
    ///
    /// The returned handle completes when the node closes the session; the
    /// player is useless after that.
    pub async fn connect(
        config: &NodeConfig,
        user_id: UserId,
    ) -> PlayerResult<(Self, JoinHandle<()>)> {
        info!("Connecting to Lavalink at {}", config.host);

        let session = tokio::time::timeout(CONNECT_TIMEOUT, socket::open_session(config, user_id))
            .await
            .map_err(|_| {
                PlayerError::Handshake(format!(
                    "no ready message within {}s",
                    CONNECT_TIMEOUT.as_secs()
                ))
            })??;

        let base_url = config
            .rest_url()
            .map_err(|e| PlayerError::Config(e.to_string()))?;
        let node = NodeClient::new(base_url, &config.password, session.id, config.request_timeout)?;

        info!("Lavalink session {} ready", node.session_id());
        Ok((Self::new(node), session.listener))
    }

    /// Keep a node session open for as long as the bot runs.
    ///
    /// Each session's player sits in `slot` until the node closes the
    /// connection. Failed attempts are retried after `backoff`.
    pub async fn supervise(
        config: &NodeConfig,
        user_id: UserId,
        slot: &PlayerSlot,
        backoff: Backoff,
    ) {
        let mut failures = 0;
        loop {
            match Self::connect(config, user_id).await {
                Ok((player, listener)) => {
                    failures = 0;
                    let player = slot.install(player);
                    info!("Music player is ready");

                    if let Err(e) = listener.await {
                        error!("Lavalink listener task failed: {}", e);
                    }
                    slot.remove(&player);
                    warn!(
                        "Lavalink session {} closed, reconnecting",
                        player.node().session_id()
                    );
                }
                Err(e) => {
                    failures += 1;
                    error!(
                        "Failed to connect to Lavalink (attempt {}): {}",
                        failures, e
                    );
                }
            }

            let delay = backoff.delay(failures);
            info!("Reconnecting to Lavalink in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    pub fn node(&self) -> &NodeClient {
        &self.node
    }
}
