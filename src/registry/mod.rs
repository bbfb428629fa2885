//! Command registry shared by the prefix-text and slash-command surfaces.
//!
//! Commands are kept in registration order and the first match wins, so a
//! later command can never shadow an earlier one with the same name or alias.
//! Every invocation runs under the configured deadline, and every failure goes
//! through a single error callback.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::BoxError;
use crate::gateway::{Gateway, GatewayError};
use crate::player::PlayerError;
use crate::{CommandError, Data};

mod command;
mod context;

pub use command::{Command, Handler, Trigger, Triggers};
pub use context::{
    Author, Context, InteractionInvocation, Invocation, OptionValue, TextMessage,
};

#[cfg(test)]
pub(crate) use context::test_support;

pub type ErrorHandler =
    Arc<dyn for<'a> Fn(CommandError, &'a Context) -> BoxFuture<'a, ()> + Send + Sync>;

pub struct RegistryOptions {
    pub prefix: String,
    pub command_timeout: Duration,
    pub on_error: ErrorHandler,
}

impl RegistryOptions {
    pub fn new(prefix: impl Into<String>, command_timeout: Duration) -> Self {
        Self {
            prefix: prefix.into(),
            command_timeout,
            on_error: Arc::new(default_on_error),
        }
    }

    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: for<'a> Fn(CommandError, &'a Context) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        self.on_error = Arc::new(on_error);
        self
    }
}

pub struct Registry {
    commands: RwLock<Vec<Arc<Command>>>,
    options: RegistryOptions,
    data: Arc<Data>,
}

impl Registry {
    pub fn new(options: RegistryOptions, data: Arc<Data>) -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
            options,
            data,
        }
    }

    /// Append `command`. Duplicate names are accepted; the earlier one wins.
    pub async fn add(&self, command: Command) {
        debug!("Registering command {}", command.name);
        self.commands.write().await.push(Arc::new(command));
    }

    pub async fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.read().await.clone()
    }

    pub fn prefix(&self) -> &str {
        &self.options.prefix
    }

    pub fn data(&self) -> &Arc<Data> {
        &self.data
    }

    async fn find(&self, trigger: Trigger, name: &str) -> Option<Arc<Command>> {
        let commands = self.commands.read().await;
        commands
            .iter()
            .filter(|command| command.triggers.allows(trigger))
            .find(|command| match trigger {
                Trigger::Text => command.answers_to(name),
                Trigger::Interaction => command.name == name,
            })
            .cloned()
    }

    /// Route a chat message to the command it names, if any.
    ///
    /// Returns whether a command ran. Messages from bots, messages without the
    /// prefix and unknown command names are ignored silently.
    pub async fn dispatch_text(&self, gateway: Arc<dyn Gateway>, message: TextMessage) -> bool {
        if message.author.bot {
            return false;
        }

        let Some(rest) = message.content.strip_prefix(self.prefix()) else {
            return false;
        };

        let (token, tail) = match rest.find(char::is_whitespace) {
            Some(index) => rest.split_at(index),
            None => (rest, ""),
        };
        if token.is_empty() {
            return false;
        }

        let Some(command) = self.find(Trigger::Text, token).await else {
            return false;
        };

        let args = tail.split_whitespace().map(str::to_string).collect();
        let ctx = Context::new(
            Invocation::Text { message, args },
            self.prefix(),
            self.data.clone(),
            gateway,
        );

        self.run(command, ctx).await;
        true
    }

    /// Route a slash-command interaction to the command with that exact name.
    pub async fn dispatch_interaction(
        &self,
        gateway: Arc<dyn Gateway>,
        interaction: InteractionInvocation,
    ) -> bool {
        let Some(command) = self
            .find(Trigger::Interaction, &interaction.command_name)
            .await
        else {
            debug!("No command registered for /{}", interaction.command_name);
            return false;
        };

        let ctx = Context::new(
            Invocation::Interaction(interaction),
            self.prefix(),
            self.data.clone(),
            gateway,
        );

        self.run(command, ctx).await;
        true
    }

    async fn run(&self, command: Arc<Command>, ctx: Context) {
        debug!(
            "Running {} for {} in guild {:?}",
            command.name,
            ctx.author().name,
            ctx.guild_id()
        );

        let deadline = self.options.command_timeout;
        let result = match tokio::time::timeout(deadline, command.run(&ctx)).await {
            Ok(result) => result,
            Err(elapsed) => {
                warn!(
                    "Command {} did not finish within {:?}",
                    command.name, self.options.command_timeout
                );
                Err(CommandError::Transport(Box::new(elapsed)))
            }
        };

        if let Err(error) = result {
            (self.options.on_error)(error, &ctx).await;
        }
    }

    /// Replace the bot's global slash commands with every interaction-capable
    /// command, in one call. Nothing is sent when there are none.
    pub async fn publish_interaction_definitions(
        &self,
        gateway: &dyn Gateway,
    ) -> Result<(), GatewayError> {
        let definitions: Vec<_> = self
            .commands
            .read()
            .await
            .iter()
            .filter(|command| command.triggers.interaction)
            .map(|command| command.definition())
            .collect();

        if definitions.is_empty() {
            debug!("No slash commands to publish");
            return Ok(());
        }

        let count = definitions.len();
        gateway.set_global_commands(definitions).await?;
        info!("Published {} slash commands", count);
        Ok(())
    }
}

/// Log the failure according to its kind and tell the user something
/// appropriate. A failed reply is only logged.
pub fn default_on_error<'a>(error: CommandError, ctx: &'a Context) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        let reply = match &error {
            CommandError::User(message) => message.clone(),
            CommandError::Node { message, source } => {
                warn!("Audio node rejected a request: {}", source);
                format!("The music server could not complete that: {}", message)
            }
            CommandError::Transport(source) => {
                error!("Transport failure: {}", source);
                transport_reply(source).to_string()
            }
            CommandError::Internal(source) => {
                error!(
                    "Unexpected error in guild {:?} for {} ({}): {}",
                    ctx.guild_id(),
                    ctx.author().name,
                    ctx.author().id,
                    source
                );
                "An unexpected error occurred while executing the command.".to_string()
            }
        };

        if let Err(e) = ctx.reply(reply).await {
            warn!("Failed to send error reply: {}", e);
        }
    })
}

/// Name the part that actually failed: the voice join, the deadline, or the
/// connection to the node.
fn transport_reply(source: &BoxError) -> &'static str {
    if let Some(PlayerError::JoinVoice(_)) = source.downcast_ref::<PlayerError>() {
        "Sorry, I couldn't join your voice channel. Please try again later."
    } else if source.is::<tokio::time::error::Elapsed>() {
        "Sorry, that took too long. Please try again later."
    } else {
        "Sorry, I couldn't reach the music server. Please try again later."
    }
}
