use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serenity::all::{CreateCommand, CreateCommandOption};

use super::Context;
use crate::CommandResult;

pub type Handler =
    Arc<dyn for<'a> Fn(&'a Context) -> BoxFuture<'a, CommandResult> + Send + Sync>;

/// The surface an invocation arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A prefixed chat message.
    Text,
    /// A slash-command interaction.
    Interaction,
}

/// Which surfaces a command answers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triggers {
    pub text: bool,
    pub interaction: bool,
}

impl Triggers {
    pub const ALL: Triggers = Triggers {
        text: true,
        interaction: true,
    };
    pub const TEXT: Triggers = Triggers {
        text: true,
        interaction: false,
    };
    pub const INTERACTION: Triggers = Triggers {
        text: false,
        interaction: true,
    };

    pub fn allows(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Text => self.text,
            Trigger::Interaction => self.interaction,
        }
    }
}

impl Default for Triggers {
    fn default() -> Self {
        Self::ALL
    }
}

/// A named command with its aliases, the surfaces it is reachable from and
/// the handler it runs.
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub triggers: Triggers,
    /// Typed options, only declared on the interaction surface.
    pub options: Vec<CreateCommandOption>,
    handler: Handler,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a Context) -> BoxFuture<'a, CommandResult> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            aliases: Vec::new(),
            triggers: Triggers::ALL,
            options: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|alias| alias.to_string()).collect();
        self
    }

    pub fn triggers(mut self, triggers: Triggers) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn option(mut self, option: CreateCommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Whether `token` is this command's name or one of its aliases.
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|alias| alias == token)
    }

    /// The slash-command definition published to Discord.
    pub fn definition(&self) -> CreateCommand {
        CreateCommand::new(&self.name)
            .description(&self.description)
            .set_options(self.options.clone())
    }

    pub(crate) fn run<'a>(&self, ctx: &'a Context) -> BoxFuture<'a, CommandResult> {
        (self.handler)(ctx)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("triggers", &self.triggers)
            .finish_non_exhaustive()
    }
}
