use serenity::all::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, Timestamp};

use super::requester;
use crate::player::{Queue, Track};
use crate::registry::Author;
use crate::utils::format_duration;

const PLAY_COLOR: u32 = 0x2371AB;
const SKIP_COLOR: u32 = 0x1DB954;
const QUEUE_COLOR: u32 = 0x5865F2;

/// Queued tracks listed individually before the rest is summarized.
const QUEUE_PREVIEW: usize = 5;

/// Discord rejects the whole embed if any field value is longer than this.
const FIELD_LIMIT: usize = 1024;

/// Kept free at the end of "Up Next" for the "...and N more" line.
const OVERFLOW_ROOM: usize = 32;

/// Cut `text` to at most `limit` characters, marking the cut with an ellipsis.
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit - 1).collect();
    truncated.push('…');
    truncated
}

fn queue_entry(index: usize, track: &Track) -> String {
    let mut entry = format!(
        "**{}.** {} - `{}`",
        index + 1,
        link(track),
        format_duration(track.info.length)
    );
    if let Some(requester) = requester(track) {
        entry.push_str(&format!("\n- Requested by <@{}>", requester.requester_id));
    }
    entry.push_str("\n\n");
    entry
}

fn link(track: &Track) -> String {
    format!(
        "**[{}]({})**",
        track.info.title,
        track.info.uri.as_deref().unwrap_or("#")
    )
}

fn requested_by(author: &Author) -> CreateEmbedFooter {
    let footer = CreateEmbedFooter::new(format!("Requested by {}", author.name));
    match &author.avatar_url {
        Some(url) => footer.icon_url(url),
        None => footer,
    }
}

/// Embed for a track that started playing (position 1) or was queued.
pub fn now_playing(track: &Track, position: usize, author: &Author) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&track.info.title)
        .color(PLAY_COLOR)
        .author(CreateEmbedAuthor::new(&track.info.author))
        .field("Duration", format_duration(track.info.length), true)
        .field("Queue Position", position.to_string(), true)
        .footer(requested_by(author))
        .timestamp(Timestamp::now());

    if let Some(uri) = &track.info.uri {
        embed = embed.url(uri);
    }
    if let Some(artwork) = &track.info.artwork_url {
        embed = embed.thumbnail(artwork);
    }
    embed
}

/// Embed for a skip: the track now playing, or the end of the queue.
pub fn skipped(next: Option<&Track>) -> CreateEmbed {
    let embed = CreateEmbed::new().color(SKIP_COLOR);

    let Some(track) = next else {
        return embed.description("The queue has ended.");
    };

    let embed = embed
        .title("Song Skipped")
        .description(format!("Now playing: {}", link(track)));
    match &track.info.artwork_url {
        Some(artwork) => embed.thumbnail(artwork),
        None => embed,
    }
}

/// Embed for the queue: the current track with its progress, then a preview of
/// what is up next.
pub fn music_queue(current: Option<(&Track, u64)>, queue: &Queue, author: &Author) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .color(QUEUE_COLOR)
        .footer(requested_by(author))
        .timestamp(Timestamp::now());

    if let Some((track, position)) = current {
        let mut value = format!(
            "{} - `{}` / `{}`",
            link(track),
            format_duration(position),
            format_duration(track.info.length)
        );
        if let Some(requester) = requester(track) {
            value.push_str(&format!("\n- Requested by <@{}>", requester.requester_id));
        }

        if let Some(artwork) = &track.info.artwork_url {
            embed = embed.thumbnail(artwork);
        }
        embed = embed.field("▶ Now Playing", truncate(&value, FIELD_LIMIT), false);
    }

    if !queue.is_empty() {
        let budget = FIELD_LIMIT - OVERFLOW_ROOM;
        let mut up_next = String::new();
        let mut shown = 0;
        for (index, track) in queue.tracks.iter().take(QUEUE_PREVIEW).enumerate() {
            let entry = queue_entry(index, track);
            let used = up_next.chars().count();
            if used + entry.chars().count() > budget {
                if shown == 0 {
                    up_next = truncate(&entry, budget);
                    shown = 1;
                }
                break;
            }
            up_next.push_str(&entry);
            shown += 1;
        }

        if queue.len() > shown {
            up_next.push_str(&format!("*...and {} more song(s)*", queue.len() - shown));
        }

        embed = embed
            .field(
                format!("Up Next ({})", queue.len()),
                truncate(&up_next, FIELD_LIMIT),
                false,
            )
            .field(
                "Total Queue Duration",
                format_duration(queue.total_length()),
                true,
            );
    }

    embed
}
