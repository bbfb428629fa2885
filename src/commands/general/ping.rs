use chrono::Utc;
use serenity::all::{CreateEmbed, Timestamp};

use crate::registry::Command;
use crate::utils::format_uptime;
use crate::{CommandResult, Context};

/// Ping the bot to check its latency
pub fn ping() -> Command {
    Command::new("ping", "Check the bot's latency.", |ctx| Box::pin(run(ctx)))
        .aliases(&["status"])
}

async fn run(ctx: &Context) -> CommandResult {
    let latency = match ctx.gateway().latency().await {
        Some(latency) => format!("{} ms", latency.as_millis()),
        None => "unknown".to_string(),
    };
    let uptime = format_uptime(Utc::now() - ctx.data().started_at);

    let embed = CreateEmbed::new()
        .title("Pong!")
        .field("API Latency", latency, true)
        .field("Shard", ctx.gateway().shard_id().to_string(), true)
        .field("Uptime", uptime, true)
        .color(0x00FF00)
        .timestamp(Timestamp::now());

    ctx.reply_embed(embed).await?;

    Ok(())
}
