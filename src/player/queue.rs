//! Queue operations backed by the node's queue plugin.

use reqwest::{Method, StatusCode};
use serenity::all::GuildId;
use tracing::{debug, warn};

use super::model::{Queue, QueueTrack, Track};
use super::node::NodeClient;
use super::{Player, PlayerError, PlayerResult};

impl Player {
    /// Tracks waiting after the current one, in play order.
    pub async fn get_queue(&self, guild_id: GuildId) -> PlayerResult<Queue> {
        let request = self.node.player_request(Method::GET, guild_id, "/queue")?;
        let response = NodeClient::execute(request).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Queue::default());
        }
        NodeClient::decode(response).await
    }

    /// Append `tracks` to the end of the queue.
    ///
    /// If the player was idle the node starts the first one right away and
    /// returns it.
    pub async fn add_to_queue(
        &self,
        guild_id: GuildId,
        tracks: &[QueueTrack],
    ) -> PlayerResult<Option<Track>> {
        let request = self
            .node
            .player_request(Method::POST, guild_id, "/queue/tracks")?
            .json(tracks);
        let response = NodeClient::execute(request).await?;

        if response.status() == StatusCode::NO_CONTENT {
            debug!("Appended {} track(s) in guild {}", tracks.len(), guild_id);
            return Ok(None);
        }
        NodeClient::decode(response).await.map(Some)
    }

    /// Advance to the next queued track and return it.
    ///
    /// When nothing is queued the player is stopped and `QueueEmpty` is
    /// returned, carrying the stop's own failure if there was one.
    pub async fn next_track(&self, guild_id: GuildId) -> PlayerResult<Track> {
        let request = self
            .node
            .player_request(Method::POST, guild_id, "/queue/next")?
            .query(&[("count", "1")]);
        let response = NodeClient::execute(request).await?;

        if response.status() == StatusCode::NO_CONTENT {
            let stop_failure = self.stop(guild_id).await.err().map(Box::new);
            return Err(PlayerError::QueueEmpty { stop_failure });
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<Track>(&body) {
            Ok(track) => Ok(track),
            Err(source) => {
                warn!("Unreadable next track for guild {}: {}", guild_id, source);
                let stop_failure = self.stop(guild_id).await.err().map(Box::new);
                Err(PlayerError::Unmarshal {
                    source,
                    stop_failure,
                })
            }
        }
    }

    /// Step back to the most recently played track, if the history has one.
    pub async fn previous_track(&self, guild_id: GuildId) -> PlayerResult<Option<Track>> {
        let request = self
            .node
            .player_request(Method::POST, guild_id, "/queue/previous")?
            .query(&[("count", "1")]);
        let response = NodeClient::execute(request).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        NodeClient::decode(response).await.map(Some)
    }

    pub async fn shuffle_queue(&self, guild_id: GuildId) -> PlayerResult<()> {
        let request = self
            .node
            .player_request(Method::POST, guild_id, "/queue/shuffle")?;
        NodeClient::execute(request).await?;
        Ok(())
    }

    pub async fn clear_queue(&self, guild_id: GuildId) -> PlayerResult<()> {
        let request = self
            .node
            .player_request(Method::DELETE, guild_id, "/queue")?;
        NodeClient::execute(request).await?;
        Ok(())
    }

    /// Remove the queued track at zero-based `index`.
    pub async fn remove_track(&self, guild_id: GuildId, index: usize) -> PlayerResult<()> {
        let request = self.node.player_request(
            Method::DELETE,
            guild_id,
            &format!("/queue/tracks/{}", index),
        )?;
        NodeClient::execute(request).await?;
        Ok(())
    }

    /// Previously played tracks, oldest first.
    pub async fn history(&self, guild_id: GuildId) -> PlayerResult<Vec<Track>> {
        let request = self
            .node
            .player_request(Method::GET, guild_id, "/history")?;
        let response = NodeClient::execute(request).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        NodeClient::decode(response).await
    }
}
