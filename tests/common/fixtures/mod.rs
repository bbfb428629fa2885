//! Test fixtures for the cadence Discord bot
//! This module contains sample data used in tests

use cadence::registry::{Author, TextMessage};
use serde_json::{Value, json};
use serenity::all::{ChannelId, GuildId, MessageId, UserId};

pub const NODE_PASSWORD: &str = "youshallnotpass";
pub const SESSION_ID: &str = "integration-session";

/// Sample user ID for testing
pub const SAMPLE_USER_ID: u64 = 123456789;

/// Sample channel ID for testing
pub const SAMPLE_CHANNEL_ID: u64 = 987654321;

pub const SAMPLE_GUILD_ID: u64 = 817327181659111454;

pub const SAMPLE_VOICE_CHANNEL_ID: u64 = 555555555;

pub fn players_path() -> String {
    format!("/v4/sessions/{}/players/{}", SESSION_ID, SAMPLE_GUILD_ID)
}

pub fn text_message(content: &str) -> TextMessage {
    TextMessage {
        id: MessageId::new(1),
        channel_id: ChannelId::new(SAMPLE_CHANNEL_ID),
        guild_id: Some(GuildId::new(SAMPLE_GUILD_ID)),
        author: Author {
            id: UserId::new(SAMPLE_USER_ID),
            name: "ferris".into(),
            bot: false,
            avatar_url: None,
        },
        content: content.into(),
    }
}

pub fn track(encoded: &str, title: &str) -> Value {
    json!({
        "encoded": encoded,
        "info": {
            "identifier": encoded,
            "isSeekable": true,
            "author": "Lofi Girl",
            "length": 185000,
            "isStream": false,
            "position": 0,
            "title": title,
            "uri": format!("https://www.youtube.com/watch?v={}", encoded),
            "artworkUrl": format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", encoded),
            "isrc": null,
            "sourceName": "youtube"
        },
        "pluginInfo": {}
    })
}

pub fn player(track: Option<Value>) -> Value {
    json!({
        "guildId": SAMPLE_GUILD_ID.to_string(),
        "track": track,
        "volume": 100,
        "paused": false,
        "state": {"time": 1500467109, "position": 0, "connected": true, "ping": 50},
        "voice": {
            "token": "voice-token",
            "endpoint": "us-east1.discord.media",
            "sessionId": "voice-session"
        },
        "filters": {}
    })
}
