//! The bot's view of Discord: sending replies, publishing slash commands,
//! voice-state lookups and voice-channel joins.
//!
//! Everything above this module talks to [`Gateway`] rather than to serenity
//! directly, so the registry and the player can be exercised without a live
//! gateway connection.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::all::{
    ChannelId, Command as ApplicationCommand, CreateCommand, CreateInteractionResponse,
    CreateMessage, GuildId, InteractionId, ShardManager, UserId,
};
use serenity::client::Context as SerenityContext;
use thiserror::Error;
use tracing::{debug, error};

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Discord API error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("Voice gateway error: {0}")]
    Voice(String),

    #[error("Failed to get voice manager")]
    NoVoiceManager,
}

/// Credentials Discord hands out for a voice connection. The node needs them
/// to open the actual voice session on the bot's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConnection {
    pub token: String,
    pub endpoint: String,
    pub session_id: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: CreateMessage,
    ) -> Result<(), GatewayError>;

    async fn create_interaction_response(
        &self,
        interaction_id: InteractionId,
        token: String,
        response: CreateInteractionResponse,
    ) -> Result<(), GatewayError>;

    /// Replace the bot's global slash commands with `commands`.
    async fn set_global_commands(&self, commands: Vec<CreateCommand>) -> Result<(), GatewayError>;

    /// The voice channel `user_id` is currently connected to in `guild_id`.
    fn voice_channel(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId>;

    async fn join_voice(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<VoiceConnection, GatewayError>;

    /// Heartbeat latency of the shard this event arrived on.
    async fn latency(&self) -> Option<Duration>;

    fn shard_id(&self) -> u32;
}

/// [`Gateway`] backed by a serenity event context and songbird.
pub struct SerenityGateway {
    ctx: SerenityContext,
    shard_manager: Option<Arc<ShardManager>>,
}

impl SerenityGateway {
    pub fn new(ctx: SerenityContext, shard_manager: Option<Arc<ShardManager>>) -> Self {
        Self { ctx, shard_manager }
    }
}

#[async_trait]
impl Gateway for SerenityGateway {
    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: CreateMessage,
    ) -> Result<(), GatewayError> {
        channel_id.send_message(&self.ctx.http, message).await?;
        Ok(())
    }

    async fn create_interaction_response(
        &self,
        interaction_id: InteractionId,
        token: String,
        response: CreateInteractionResponse,
    ) -> Result<(), GatewayError> {
        self.ctx
            .http
            .create_interaction_response(interaction_id, &token, &response, Vec::new())
            .await?;
        Ok(())
    }

    async fn set_global_commands(&self, commands: Vec<CreateCommand>) -> Result<(), GatewayError> {
        let registered = ApplicationCommand::set_global_commands(&self.ctx.http, commands).await?;
        debug!("Discord accepted {} global commands", registered.len());
        Ok(())
    }

    fn voice_channel(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
        let guild = self.ctx.cache.guild(guild_id)?;
        let channel_id = guild.voice_states.get(&user_id)?.channel_id;
        channel_id
    }

    async fn join_voice(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<VoiceConnection, GatewayError> {
        let songbird = songbird::get(&self.ctx)
            .await
            .ok_or(GatewayError::NoVoiceManager)?;

        let (info, _call) = songbird
            .join_gateway(guild_id, channel_id)
            .await
            .map_err(|e| {
                error!(
                    "Failed to join voice channel {} for guild {}: {}",
                    channel_id, guild_id, e
                );
                GatewayError::Voice(e.to_string())
            })?;

        Ok(VoiceConnection {
            token: info.token,
            endpoint: info.endpoint,
            session_id: info.session_id,
        })
    }

    async fn latency(&self) -> Option<Duration> {
        let shard_manager = self.shard_manager.as_ref()?;
        let runners = shard_manager.runners.lock().await;

        // Shards are backed by a runner that tracks heartbeat latency for the
        // shard this event was received on.
        let runner = runners.get(&self.ctx.shard_id)?;
        runner.latency
    }

    fn shard_id(&self) -> u32 {
        self.ctx.shard_id.0
    }
}
