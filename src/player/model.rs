//! Wire types of the Lavalink v4 REST and websocket APIs.

use std::fmt;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A playable track as the node describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Opaque handle the node uses to play the track.
    pub encoded: String,
    pub info: TrackInfo,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub plugin_info: Value,
    /// Free-form data attached when the track was requested; the node hands it
    /// back untouched.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub user_data: Value,
}

impl Track {
    /// Decode [`Track::user_data`] into `T`, if present and well-formed.
    pub fn user_data_as<T: DeserializeOwned>(&self) -> Option<T> {
        if self.user_data.is_null() {
            return None;
        }
        serde_json::from_value(self.user_data.clone()).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub is_seekable: bool,
    #[serde(default)]
    pub author: String,
    /// Length in milliseconds.
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub is_stream: bool,
    #[serde(default)]
    pub position: u64,
    pub title: String,
    pub uri: Option<String>,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub source_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub info: PlaylistInfo,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    pub name: String,
    #[serde(default)]
    pub selected_track: i64,
}

/// Result of `GET /v4/loadtracks`.
#[derive(Debug, Deserialize)]
#[serde(tag = "loadType", content = "data", rename_all = "lowercase")]
pub enum LoadResult {
    Track(Track),
    Playlist(Playlist),
    Search(Vec<Track>),
    Empty(IgnoredAny),
    Error(Exception),
}

/// A failure the node reports while loading or playing a track.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Exception {
    pub message: Option<String>,
    pub severity: String,
    pub cause: String,
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} ({}): {}", message, self.severity, self.cause),
            None => write!(f, "{} ({})", self.cause, self.severity),
        }
    }
}

impl std::error::Error for Exception {}

/// Body of any non-2xx REST response from the node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeError {
    pub timestamp: u64,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status, self.error, self.message)
    }
}

impl std::error::Error for NodeError {}

/// The node's view of a guild's player.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    #[serde(default)]
    pub guild_id: String,
    pub track: Option<Track>,
    #[serde(default = "default_volume")]
    pub volume: u16,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub state: PlayerPosition,
    /// Voice credentials the node is currently using for this guild.
    #[serde(default)]
    pub voice: Option<VoiceUpdate>,
}

fn default_volume() -> u16 {
    100
}

impl PlayerState {
    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    /// A track is loaded and playback is not paused.
    pub fn is_playing(&self) -> bool {
        self.track.is_some() && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Playback position of the current track in milliseconds.
    pub fn position(&self) -> u64 {
        self.state.position
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlayerPosition {
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub position: u64,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub ping: i64,
}

/// The tracks waiting after the current one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Queue {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Queue {
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Sum of all queued track lengths in milliseconds.
    pub fn total_length(&self) -> u64 {
        self.tracks.iter().map(|track| track.info.length).sum()
    }
}

/// Entry submitted to `POST .../queue/tracks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueTrack {
    pub encoded: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub user_data: Value,
}

impl From<&Track> for QueueTrack {
    fn from(track: &Track) -> Self {
        Self {
            encoded: track.encoded.clone(),
            user_data: track.user_data.clone(),
        }
    }
}

/// Body of `PATCH /v4/sessions/{session}/players/{guild}`. Unset fields are
/// left untouched by the node.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceUpdate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackUpdate {
    /// `None` serializes to `null`, which stops playback.
    pub encoded: Option<String>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub user_data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceUpdate {
    pub token: String,
    pub endpoint: String,
    pub session_id: String,
}

/// Messages received over the node's websocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum NodeMessage {
    Ready {
        resumed: bool,
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    PlayerUpdate {
        #[serde(rename = "guildId")]
        guild_id: String,
        state: PlayerPosition,
    },
    Stats {},
    Event(NodeEvent),
}

#[derive(Debug, Deserialize)]
pub struct NodeEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "guildId")]
    pub guild_id: String,
    #[serde(default)]
    pub track: Option<Track>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::test_support::track_json;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_load_result_variants() {
        let track: LoadResult =
            serde_json::from_value(json!({"loadType": "track", "data": track_json("a", "A")}))
                .unwrap();
        assert_matches!(track, LoadResult::Track(t) if t.info.title == "A");

        let search: LoadResult = serde_json::from_value(json!({
            "loadType": "search",
            "data": [track_json("a", "A"), track_json("b", "B")]
        }))
        .unwrap();
        assert_matches!(search, LoadResult::Search(tracks) if tracks.len() == 2);

        let empty: LoadResult =
            serde_json::from_value(json!({"loadType": "empty", "data": {}})).unwrap();
        assert_matches!(empty, LoadResult::Empty(_));

        let error: LoadResult = serde_json::from_value(json!({
            "loadType": "error",
            "data": {"message": "Video unavailable", "severity": "common", "cause": "x"}
        }))
        .unwrap();
        assert_matches!(
            error,
            LoadResult::Error(e) if e.message.as_deref() == Some("Video unavailable")
        );
    }

    #[test]
    fn test_player_state_projections() {
        let playing: PlayerState = serde_json::from_value(json!({
            "guildId": "1",
            "track": track_json("a", "A"),
            "volume": 100,
            "paused": false,
            "state": {"time": 1, "position": 4200, "connected": true, "ping": 12}
        }))
        .unwrap();
        assert!(playing.is_playing());
        assert!(!playing.is_paused());
        assert_eq!(playing.position(), 4200);

        let paused = PlayerState { paused: true, ..playing.clone() };
        assert!(!paused.is_playing());
        assert!(paused.is_paused());

        let idle = PlayerState { track: None, paused: false, ..playing };
        assert!(!idle.is_playing());
    }

    #[test]
    fn test_stop_update_serializes_null_track() {
        let update = PlayerUpdate {
            track: Some(TrackUpdate { encoded: None, user_data: Value::Null }),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(update).unwrap(), json!({"track": {"encoded": null}}));
    }

    #[test]
    fn test_websocket_messages() {
        let ready: NodeMessage = serde_json::from_value(
            json!({"op": "ready", "resumed": false, "sessionId": "la3kfsdf5eafe848"}),
        )
        .unwrap();
        assert_matches!(
            ready,
            NodeMessage::Ready { session_id, .. } if session_id == "la3kfsdf5eafe848"
        );

        let stats: NodeMessage =
            serde_json::from_value(json!({"op": "stats", "players": 1, "playingPlayers": 1}))
                .unwrap();
        assert_matches!(stats, NodeMessage::Stats {});

        let event: NodeMessage = serde_json::from_value(json!({
            "op": "event",
            "type": "QueueEndEvent",
            "guildId": "817327181659111454"
        }))
        .unwrap();
        assert_matches!(event, NodeMessage::Event(e) if e.kind == "QueueEndEvent");
    }
}
