use serde_json::Value;
use serenity::all::{ChannelId, GuildId};
use tracing::{debug, info, warn};
use url::Url;

use super::model::{
    LoadResult, PlayerState, PlayerUpdate, QueueTrack, Track, TrackUpdate, VoiceUpdate,
};
use super::{Player, PlayerError, PlayerResult};
use crate::gateway::Gateway;

/// Turn free text into a YouTube search; http(s) URLs are loaded directly.
pub(crate) fn search_identifier(query: &str) -> String {
    let query = query.trim();
    match Url::parse(query) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => query.to_string(),
        _ => format!("ytsearch:{}", query),
    }
}

impl Player {
    /// Play `query` in `channel_id`, or queue it behind the current track.
    ///
    /// Returns the resolved track and its 1-based position: 1 when it started
    /// playing immediately, otherwise the queue length before the append + 1.
    ///
    /// The voice join is not undone if a later step fails or the call is
    /// cancelled, so the bot may be left in the channel without playing.
    pub async fn play(
        &self,
        gateway: &dyn Gateway,
        guild_id: GuildId,
        channel_id: ChannelId,
        query: &str,
        user_data: Value,
    ) -> PlayerResult<(Track, usize)> {
        self.join(gateway, guild_id, channel_id).await?;

        let mut track = self.load_track(query).await?;
        track.user_data = user_data;

        if self.current_track(guild_id).await?.is_some() {
            let position = match self.get_queue(guild_id).await {
                Ok(queue) => queue.len() + 1,
                Err(e) => {
                    warn!("Failed to read queue for guild {}: {}", guild_id, e);
                    1
                }
            };

            self.add_to_queue(guild_id, &[QueueTrack::from(&track)])
                .await?;

            info!(
                "Queued '{}' at position {} in guild {}",
                track.info.title, position, guild_id
            );
            return Ok((track, position));
        }

        self.start(guild_id, &track).await?;
        info!("Now playing '{}' in guild {}", track.info.title, guild_id);
        Ok((track, 1))
    }

    /// Like [`Player::play`], but replaces whatever is currently playing.
    pub async fn play_now(
        &self,
        gateway: &dyn Gateway,
        guild_id: GuildId,
        channel_id: ChannelId,
        query: &str,
        user_data: Value,
    ) -> PlayerResult<Track> {
        self.join(gateway, guild_id, channel_id).await?;

        let mut track = self.load_track(query).await?;
        track.user_data = user_data;

        self.start(guild_id, &track).await?;
        Ok(track)
    }

    /// Every track `url` resolves to, in node order.
    pub async fn load_playlist(&self, url: &str) -> PlayerResult<Vec<Track>> {
        let tracks = match self.node.load_tracks(url).await? {
            LoadResult::Track(track) => vec![track],
            LoadResult::Playlist(playlist) => playlist.tracks,
            LoadResult::Search(tracks) => tracks,
            LoadResult::Empty(_) => return Err(PlayerError::NoResults),
            LoadResult::Error(exception) => return Err(PlayerError::Load(exception)),
        };

        if tracks.is_empty() {
            return Err(PlayerError::NoTrackFound);
        }
        Ok(tracks)
    }

    pub(crate) async fn load_track(&self, query: &str) -> PlayerResult<Track> {
        let identifier = search_identifier(query);

        match self.node.load_tracks(&identifier).await? {
            LoadResult::Track(track) => Ok(track),
            LoadResult::Playlist(playlist) => playlist
                .tracks
                .into_iter()
                .next()
                .ok_or(PlayerError::NoTrackFound),
            LoadResult::Search(tracks) => {
                tracks.into_iter().next().ok_or(PlayerError::NoTrackFound)
            }
            LoadResult::Empty(_) => Err(PlayerError::NoResults),
            LoadResult::Error(exception) => Err(PlayerError::Load(exception)),
        }
    }

    /// Join the voice channel and hand the credentials to the node.
    async fn join(
        &self,
        gateway: &dyn Gateway,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlayerResult<()> {
        let connection = gateway
            .join_voice(guild_id, channel_id)
            .await
            .map_err(PlayerError::JoinVoice)?;
        debug!("Joined voice channel {} in guild {}", channel_id, guild_id);

        self.update_voice(
            guild_id,
            VoiceUpdate {
                token: connection.token,
                endpoint: connection.endpoint,
                session_id: connection.session_id,
            },
        )
        .await
    }

    async fn start(&self, guild_id: GuildId, track: &Track) -> PlayerResult<()> {
        let update = PlayerUpdate {
            track: Some(TrackUpdate {
                encoded: Some(track.encoded.clone()),
                user_data: track.user_data.clone(),
            }),
            ..Default::default()
        };
        self.node.update_player(guild_id, &update).await
    }

    /// Clear the current track. The queue is left as it is.
    pub async fn stop(&self, guild_id: GuildId) -> PlayerResult<()> {
        let update = PlayerUpdate {
            track: Some(TrackUpdate {
                encoded: None,
                user_data: Value::Null,
            }),
            ..Default::default()
        };
        self.node.update_player(guild_id, &update).await
    }

    pub async fn pause(&self, guild_id: GuildId, paused: bool) -> PlayerResult<()> {
        let update = PlayerUpdate {
            paused: Some(paused),
            ..Default::default()
        };
        self.node.update_player(guild_id, &update).await
    }

    /// Jump to `position` milliseconds into the current track.
    pub async fn seek(&self, guild_id: GuildId, position: u64) -> PlayerResult<()> {
        let update = PlayerUpdate {
            position: Some(position),
            ..Default::default()
        };
        self.node.update_player(guild_id, &update).await
    }

    /// Set the volume, 0 to 1000 with 100 being unchanged.
    pub async fn set_volume(&self, guild_id: GuildId, volume: u16) -> PlayerResult<()> {
        let update = PlayerUpdate {
            volume: Some(volume),
            ..Default::default()
        };
        self.node.update_player(guild_id, &update).await
    }

    /// Snapshot of the node's player for `guild_id`; `None` while idle.
    pub async fn session(&self, guild_id: GuildId) -> PlayerResult<Option<PlayerState>> {
        self.node.player(guild_id).await
    }

    pub async fn current_track(&self, guild_id: GuildId) -> PlayerResult<Option<Track>> {
        Ok(self.session(guild_id).await?.and_then(|state| state.track))
    }

    pub async fn is_playing(&self, guild_id: GuildId) -> PlayerResult<bool> {
        Ok(self
            .session(guild_id)
            .await?
            .is_some_and(|state| state.is_playing()))
    }

    pub async fn is_paused(&self, guild_id: GuildId) -> PlayerResult<bool> {
        Ok(self
            .session(guild_id)
            .await?
            .is_some_and(|state| state.is_paused()))
    }
}
