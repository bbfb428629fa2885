use serde::{Deserialize, Serialize};

use crate::Context;
use crate::player::Track;
use crate::registry::{Author, Trigger};

pub mod embedded_messages;

/// Who asked for a track. Stored as the track's `userData` so the node hands
/// it back with the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub requester_id: String,
    #[serde(default)]
    pub requester_name: String,
}

impl From<&Author> for Requester {
    fn from(author: &Author) -> Self {
        Self {
            requester_id: author.id.to_string(),
            requester_name: author.name.clone(),
        }
    }
}

/// The requester recorded on `track`, if any.
pub fn requester(track: &Track) -> Option<Requester> {
    track.user_data_as::<Requester>()
}

/// The song query: the `query` option on slash commands, the remaining words
/// on text commands.
pub fn query(ctx: &Context) -> String {
    match ctx.trigger() {
        Trigger::Interaction => ctx.string_option("query").unwrap_or_default().trim().to_string(),
        Trigger::Text => ctx.args().join(" "),
    }
}
