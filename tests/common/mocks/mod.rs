//! Mock implementations for external dependencies
//! This module contains mock objects used for testing

use std::time::Duration;

use async_trait::async_trait;
use cadence::gateway::{Gateway, GatewayError, VoiceConnection};
use mockall::mock;
use serenity::all::{
    ChannelId, CreateCommand, CreateInteractionResponse, CreateMessage, GuildId, InteractionId,
    UserId,
};

mock! {
    pub DiscordGateway {}

    #[async_trait]
    impl Gateway for DiscordGateway {
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

        async fn set_global_commands(
            &self,
            commands: Vec<CreateCommand>,
        ) -> Result<(), GatewayError>;

        fn voice_channel(&self, guild_id: GuildId, user_id: UserId) -> Option<ChannelId>;

        async fn join_voice(
            &self,
            guild_id: GuildId,
            channel_id: ChannelId,
        ) -> Result<VoiceConnection, GatewayError>;

        async fn latency(&self) -> Option<Duration>;

        fn shard_id(&self) -> u32;
    }
}

pub fn voice_connection() -> VoiceConnection {
    VoiceConnection {
        token: "voice-token".into(),
        endpoint: "us-east1.discord.media".into(),
        session_id: "voice-session".into(),
    }
}
