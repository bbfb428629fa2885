use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serenity::all::{
    GuildId, Interaction, Message, Ready, ShardManager, VoiceServerUpdateEvent, VoiceState,
};
use serenity::async_trait;
use serenity::prelude::*;
use tracing::{info, warn};

use crate::config::NodeConfig;
use crate::gateway::{Gateway, SerenityGateway};
use crate::player::{Backoff, Player};
use crate::registry::{InteractionInvocation, Registry, TextMessage};

/// Forwards gateway events to the [`Registry`], keeps the music player
/// connected once the bot is ready and relays the bot's voice changes to it.
pub struct Handler {
    registry: Arc<Registry>,
    node: NodeConfig,
    shard_manager: Arc<OnceLock<Arc<ShardManager>>>,
    supervising: AtomicBool,
}

impl Handler {
    pub fn new(registry: Arc<Registry>, node: NodeConfig) -> Self {
        Self {
            registry,
            node,
            shard_manager: Arc::new(OnceLock::new()),
            supervising: AtomicBool::new(false),
        }
    }

    /// Filled in by `main` once the client exists, so `ping` can read shard
    /// latency.
    pub fn shard_manager_slot(&self) -> Arc<OnceLock<Arc<ShardManager>>> {
        self.shard_manager.clone()
    }

    fn gateway(&self, ctx: &Context) -> Arc<dyn Gateway> {
        Arc::new(SerenityGateway::new(
            ctx.clone(),
            self.shard_manager.get().cloned(),
        ))
    }

    /// Keep a node session open in the background. Ready fires again on every
    /// gateway reconnect, so only the first one starts the supervisor.
    fn supervise_player(&self, ready: &Ready) {
        if self.supervising.swap(true, Ordering::SeqCst) {
            return;
        }

        let data = self.registry.data().clone();
        let node = self.node.clone();
        let user_id = ready.user.id;

        tokio::spawn(async move {
            Player::supervise(&node, user_id, &data.player, Backoff::default()).await;
        });
    }
}

/// The voice session id Discord gave the bot in `guild_id`, from the cache.
fn own_voice_session(ctx: &Context, guild_id: GuildId) -> Option<String> {
    let bot_id = ctx.cache.current_user().id;
    let guild = ctx.cache.guild(guild_id)?;
    guild
        .voice_states
        .get(&bot_id)
        .map(|state| state.session_id.clone())
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        self.registry
            .dispatch_text(self.gateway(&ctx), TextMessage::from(&msg))
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.registry
                .dispatch_interaction(self.gateway(&ctx), InteractionInvocation::from(&command))
                .await;
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "{} is connected to {} guild(s), listening for prefix '{}'",
            ready.user.name,
            ready.guilds.len(),
            self.registry.prefix()
        );

        let gateway = self.gateway(&ctx);
        if let Err(e) = self
            .registry
            .publish_interaction_definitions(gateway.as_ref())
            .await
        {
            warn!("Failed to register slash commands: {}", e);
        }

        self.supervise_player(&ready);
    }

    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        if new.user_id != ctx.cache.current_user().id {
            return;
        }
        let (Some(guild_id), Some(player)) = (new.guild_id, self.registry.data().player.get())
        else {
            return;
        };

        if let Err(e) = player
            .voice_state_update(guild_id, new.channel_id, new.session_id)
            .await
        {
            warn!("Failed to update voice state for guild {}: {}", guild_id, e);
        }
    }

    async fn voice_server_update(&self, ctx: Context, event: VoiceServerUpdateEvent) {
        // A missing endpoint means the voice server is going away; a new
        // update follows once Discord has picked another one.
        let (Some(guild_id), Some(endpoint)) = (event.guild_id, event.endpoint) else {
            return;
        };
        let Some(player) = self.registry.data().player.get() else {
            return;
        };

        let session_id = own_voice_session(&ctx, guild_id);
        if let Err(e) = player
            .voice_server_update(guild_id, event.token, endpoint, session_id)
            .await
        {
            warn!("Failed to update voice server for guild {}: {}", guild_id, e);
        }
    }
}
