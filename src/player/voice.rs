//! Keeps the node's voice session in step with Discord after the first join.

use serenity::all::{ChannelId, GuildId};
use tracing::{debug, info, warn};

use super::model::{PlayerUpdate, VoiceUpdate};
use super::{Player, PlayerResult};

impl Player {
    /// Discord moved the bot's voice connection in `guild_id` to another server.
    ///
    /// Only guilds the node already has a player for are updated; the first
    /// join hands its credentials over itself. Without `session_id` the one the
    /// node already holds is reused.
    pub async fn voice_server_update(
        &self,
        guild_id: GuildId,
        token: String,
        endpoint: String,
        session_id: Option<String>,
    ) -> PlayerResult<()> {
        let Some(state) = self.session(guild_id).await? else {
            debug!("No player in guild {}, skipping voice server update", guild_id);
            return Ok(());
        };

        let session_id = session_id
            .or_else(|| state.voice.map(|voice| voice.session_id))
            .filter(|id| !id.is_empty());
        let Some(session_id) = session_id else {
            warn!("No voice session known for guild {}, dropping server update", guild_id);
            return Ok(());
        };

        info!("Voice server for guild {} is now {}", guild_id, endpoint);
        self.update_voice(
            guild_id,
            VoiceUpdate {
                token,
                endpoint,
                session_id,
            },
        )
        .await
    }

    /// The bot's own voice state changed in `guild_id`.
    ///
    /// Leaving voice destroys the node's player. A new voice session id is
    /// forwarded together with the credentials the node already holds.
    pub async fn voice_state_update(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
        session_id: String,
    ) -> PlayerResult<()> {
        let Some(state) = self.session(guild_id).await? else {
            return Ok(());
        };

        let Some(channel_id) = channel_id else {
            info!("Left voice in guild {}, destroying its player", guild_id);
            return self.node.destroy_player(guild_id).await;
        };

        let Some(voice) = state.voice.filter(|voice| !voice.token.is_empty()) else {
            return Ok(());
        };
        if voice.session_id == session_id {
            return Ok(());
        }

        debug!(
            "Voice session changed in guild {} (channel {})",
            guild_id, channel_id
        );
        self.update_voice(guild_id, VoiceUpdate { session_id, ..voice })
            .await
    }

    pub(crate) async fn update_voice(
        &self,
        guild_id: GuildId,
        voice: VoiceUpdate,
    ) -> PlayerResult<()> {
        let update = PlayerUpdate {
            voice: Some(voice),
            ..Default::default()
        };
        self.node.update_player(guild_id, &update).await
    }
}
