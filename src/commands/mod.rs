//! This module aggregates all the command modules for the bot.

use crate::registry::Command;

/// General purpose commands (e.g., ping).
pub mod general;
/// Commands that drive the music player.
pub mod music;

/// Every command the bot ships with, in registration order.
pub fn all() -> Vec<Command> {
    vec![
        general::ping::ping(),
        music::play::play(),
        music::skip::skip(),
        music::queue::queue(),
    ]
}
