use serenity::all::{CommandOptionType, CreateCommandOption};
use tracing::info;

use super::utils::{Requester, embedded_messages, query};
use super::*;
use crate::CommandError;

/// Play a song from YouTube or a direct URL
pub fn play() -> Command {
    Command::new("play", "Play a song in the voice channel.", |ctx| {
        Box::pin(run(ctx))
    })
    .aliases(&["p", "tocar"])
    .option(
        CreateCommandOption::new(CommandOptionType::String, "query", "Song name or URL")
            .required(true),
    )
}

async fn run(ctx: &Context) -> CommandResult {
    let guild_id = ctx.require_guild()?;

    let channel_id = ctx
        .gateway()
        .voice_channel(guild_id, ctx.author().id)
        .ok_or_else(|| {
            CommandError::user("You need to be in a voice channel to use this command.")
        })?;

    let query = query(ctx);
    if query.is_empty() {
        return Err(CommandError::user(format!(
            "You need to specify a song. Ex: `{}play <song>`",
            ctx.prefix()
        )));
    }

    let player = ctx.data().player.require()?;
    let requester = serde_json::to_value(Requester::from(ctx.author()))?;

    info!(
        "Received play command with query '{}' from {} in guild {}",
        query,
        ctx.author().name,
        guild_id
    );
    let (track, position) = player
        .play(ctx.gateway(), guild_id, channel_id, &query, requester)
        .await?;

    ctx.reply_embed(embedded_messages::now_playing(
        &track,
        position,
        ctx.author(),
    ))
    .await?;

    Ok(())
}
