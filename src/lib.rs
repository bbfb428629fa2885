//! A Discord music bot: a dual-surface command registry (prefix text and slash
//! interactions) in front of a per-guild playback coordinator backed by a
//! Lavalink node.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod player;
pub mod registry;
pub mod utils;

pub use error::CommandError;
pub use registry::Context;

use player::Player;

/// Boxed error used at the binary's edges.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type CommandResult = Result<(), CommandError>;

/// Dependencies handed to every command invocation.
pub struct Data {
    pub started_at: DateTime<Utc>,
    pub player: PlayerSlot,
}

impl Data {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            player: PlayerSlot::default(),
        }
    }
}

impl Default for Data {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the [`Player`] while a node session is open.
///
/// The bot starts accepting commands before the node is reachable and the
/// session can drop at any time, so a background task fills and empties the
/// slot.
#[derive(Default)]
pub struct PlayerSlot(RwLock<Option<Arc<Player>>>);

impl PlayerSlot {
    /// Install `player`, replacing any previous one.
    pub fn install(&self, player: Player) -> Arc<Player> {
        let player = Arc::new(player);
        *self.write() = Some(player.clone());
        player
    }

    /// Empty the slot if it still holds `player`; a newer one is left alone.
    pub fn remove(&self, player: &Arc<Player>) -> bool {
        let mut slot = self.write();
        if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, player)) {
            *slot = None;
            return true;
        }
        false
    }

    pub fn get(&self) -> Option<Arc<Player>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The installed player, or the user-facing "not available" error.
    pub fn require(&self) -> Result<Arc<Player>, CommandError> {
        self.get()
            .ok_or_else(|| CommandError::user("The music player is not available."))
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Arc<Player>>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}
