use super::utils::embedded_messages;
use super::*;
use crate::player::PlayerError;

/// Skip the currently playing song
pub fn skip() -> Command {
    Command::new("skip", "Skip to the next song in the queue.", |ctx| {
        Box::pin(run(ctx))
    })
    .aliases(&["s", "next"])
}

async fn run(ctx: &Context) -> CommandResult {
    let guild_id = ctx.require_guild()?;
    let player = ctx.data().player.require()?;

    // A clean stop at the end of the queue is a normal outcome, not an error.
    let next = match player.next_track(guild_id).await {
        Ok(track) => Some(track),
        Err(PlayerError::QueueEmpty { stop_failure: None }) => None,
        Err(e) => return Err(e.into()),
    };

    ctx.reply_embed(embedded_messages::skipped(next.as_ref()))
        .await?;

    Ok(())
}
