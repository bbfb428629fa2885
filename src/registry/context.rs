use std::sync::Arc;

use serenity::all::{
    ChannelId, CommandDataOptionValue, CommandInteraction, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage, GuildId,
    InteractionId, Message, MessageId, UserId,
};

use super::Trigger;
use crate::gateway::{Gateway, GatewayError};
use crate::{CommandError, Data};

/// Who invoked a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    pub bot: bool,
    pub avatar_url: Option<String>,
}

impl From<&serenity::all::User> for Author {
    fn from(user: &serenity::all::User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            bot: user.bot,
            avatar_url: Some(user.face()),
        }
    }
}

/// A chat message as the registry sees it.
#[derive(Debug, Clone)]
pub struct TextMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: Author,
    pub content: String,
}

impl From<&Message> for TextMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            guild_id: message.guild_id,
            author: Author::from(&message.author),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    User(UserId),
}

/// A slash-command interaction with its options flattened to top-level values.
#[derive(Debug, Clone)]
pub struct InteractionInvocation {
    pub id: InteractionId,
    pub token: String,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: Author,
    pub command_name: String,
    pub options: Vec<(String, OptionValue)>,
}

impl From<&CommandInteraction> for InteractionInvocation {
    fn from(interaction: &CommandInteraction) -> Self {
        let options = interaction
            .data
            .options
            .iter()
            .filter_map(|option| {
                let value = match &option.value {
                    CommandDataOptionValue::String(value) => OptionValue::String(value.clone()),
                    CommandDataOptionValue::Integer(value) => OptionValue::Integer(*value),
                    CommandDataOptionValue::Boolean(value) => OptionValue::Boolean(*value),
                    CommandDataOptionValue::User(value) => OptionValue::User(*value),
                    _ => return None,
                };
                Some((option.name.clone(), value))
            })
            .collect();

        Self {
            id: interaction.id,
            token: interaction.token.clone(),
            channel_id: interaction.channel_id,
            guild_id: interaction.guild_id,
            author: Author::from(&interaction.user),
            command_name: interaction.data.name.clone(),
            options,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Invocation {
    Text {
        message: TextMessage,
        args: Vec<String>,
    },
    Interaction(InteractionInvocation),
}

/// Everything a handler gets to see about one invocation.
///
/// Built fresh for every event and dropped once the handler and the error
/// callback are done with it.
pub struct Context {
    invocation: Invocation,
    prefix: String,
    data: Arc<Data>,
    gateway: Arc<dyn Gateway>,
}

impl Context {
    pub fn new(
        invocation: Invocation,
        prefix: impl Into<String>,
        data: Arc<Data>,
        gateway: Arc<dyn Gateway>,
    ) -> Self {
        Self {
            invocation,
            prefix: prefix.into(),
            data,
            gateway,
        }
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn trigger(&self) -> Trigger {
        match self.invocation {
            Invocation::Text { .. } => Trigger::Text,
            Invocation::Interaction(_) => Trigger::Interaction,
        }
    }

    pub fn guild_id(&self) -> Option<GuildId> {
        match &self.invocation {
            Invocation::Text { message, .. } => message.guild_id,
            Invocation::Interaction(interaction) => interaction.guild_id,
        }
    }

    /// The guild, or a user error when invoked outside of one.
    pub fn require_guild(&self) -> Result<GuildId, CommandError> {
        self.guild_id()
            .ok_or_else(|| CommandError::user("This command can only be used in a server."))
    }

    pub fn author(&self) -> &Author {
        match &self.invocation {
            Invocation::Text { message, .. } => &message.author,
            Invocation::Interaction(interaction) => &interaction.author,
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        match &self.invocation {
            Invocation::Text { message, .. } => message.channel_id,
            Invocation::Interaction(interaction) => interaction.channel_id,
        }
    }

    /// Words after the command name. Always empty for interactions.
    pub fn args(&self) -> &[String] {
        match &self.invocation {
            Invocation::Text { args, .. } => args,
            Invocation::Interaction(_) => &[],
        }
    }

    fn option(&self, name: &str) -> Option<&OptionValue> {
        match &self.invocation {
            Invocation::Interaction(interaction) => interaction
                .options
                .iter()
                .find(|(option, _)| option == name)
                .map(|(_, value)| value),
            Invocation::Text { .. } => None,
        }
    }

    pub fn string_option(&self, name: &str) -> Option<&str> {
        match self.option(name)? {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn integer_option(&self, name: &str) -> Option<i64> {
        match self.option(name)? {
            OptionValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn boolean_option(&self, name: &str) -> Option<bool> {
        match self.option(name)? {
            OptionValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn user_option(&self, name: &str) -> Option<UserId> {
        match self.option(name)? {
            OptionValue::User(value) => Some(*value),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub async fn reply(&self, content: impl Into<String>) -> Result<(), GatewayError> {
        let content = content.into();
        match &self.invocation {
            Invocation::Text { message, .. } => {
                self.gateway
                    .send_message(message.channel_id, CreateMessage::new().content(content))
                    .await
            }
            Invocation::Interaction(interaction) => {
                self.respond(
                    interaction,
                    CreateInteractionResponseMessage::new().content(content),
                )
                .await
            }
        }
    }

    /// Like [`Context::reply`], but quotes the invoking message on the text
    /// surface.
    pub async fn reply_quoting(&self, content: impl Into<String>) -> Result<(), GatewayError> {
        let content = content.into();
        match &self.invocation {
            Invocation::Text { message, .. } => {
                let reply = CreateMessage::new()
                    .content(content)
                    .reference_message((message.channel_id, message.id));
                self.gateway.send_message(message.channel_id, reply).await
            }
            Invocation::Interaction(interaction) => {
                self.respond(
                    interaction,
                    CreateInteractionResponseMessage::new().content(content),
                )
                .await
            }
        }
    }

    pub async fn reply_embed(&self, embed: CreateEmbed) -> Result<(), GatewayError> {
        match &self.invocation {
            Invocation::Text { message, .. } => {
                self.gateway
                    .send_message(message.channel_id, CreateMessage::new().embed(embed))
                    .await
            }
            Invocation::Interaction(interaction) => {
                self.respond(
                    interaction,
                    CreateInteractionResponseMessage::new().embed(embed),
                )
                .await
            }
        }
    }

    async fn respond(
        &self,
        interaction: &InteractionInvocation,
        message: CreateInteractionResponseMessage,
    ) -> Result<(), GatewayError> {
        self.gateway
            .create_interaction_response(
                interaction.id,
                interaction.token.clone(),
                CreateInteractionResponse::Message(message),
            )
            .await
    }
}
