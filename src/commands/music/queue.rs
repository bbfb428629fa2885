use super::utils::embedded_messages;
use super::*;
use crate::player::Queue;

/// Display the current music queue
pub fn queue() -> Command {
    Command::new("queue", "Show the current music queue.", |ctx| {
        Box::pin(run(ctx))
    })
    .aliases(&["q"])
}

async fn run(ctx: &Context) -> CommandResult {
    let guild_id = ctx.require_guild()?;
    let player = ctx.data().player.require()?;

    // Without a player on the node there is no queue to ask for either.
    let Some(session) = player.session(guild_id).await? else {
        ctx.reply("The queue is empty.").await?;
        return Ok(());
    };
    let queue: Queue = player.get_queue(guild_id).await?;

    let current = session
        .track()
        .map(|track| (track, session.position()));

    if current.is_none() && queue.is_empty() {
        ctx.reply("The queue is empty.").await?;
        return Ok(());
    }

    ctx.reply_embed(embedded_messages::music_queue(
        current,
        &queue,
        ctx.author(),
    ))
    .await?;

    Ok(())
}
