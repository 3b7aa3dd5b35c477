use super::*;
use serenity::model::event::VoiceServerUpdateEvent;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::prelude::{Message, Ready};
use serenity::prelude::{Context, EventHandler};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait OnReady {
    async fn process(&self, ctx: Context, ready: Ready);
}

#[async_trait]
pub trait OnVoiceServerUpdate {
    async fn process(&self, ctx: Context, update: VoiceServerUpdateEvent);
}

/// Splits off the first whitespace-delimited token; the rest keeps its inner
/// spacing.
pub fn next_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(match text.find(char::is_whitespace) {
        Some(index) => (&text[..index], text[index..].trim_start()),
        None => (text, ""),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub mentions: Vec<UserId>,
    pub content: String,
}

impl From<&Message> for IncomingMessage {
    fn from(msg: &Message) -> Self {
        Self {
            guild_id: msg.guild_id,
            channel_id: msg.channel_id,
            author_id: msg.author.id,
            mentions: msg.mentions.iter().map(|user| user.id).collect(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommandParams<'a> {
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub mentions: &'a [UserId],
    /// Text after the verb.
    pub text: &'a str,
}

impl<'a> CommandParams<'a> {
    pub fn args(&self) -> Vec<&'a str> {
        self.text.split_whitespace().collect()
    }

    fn with_text(self, text: &'a str) -> Self {
        Self { text, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpInfo {
    pub header_suffix: Option<String>,
    pub description: String,
}

#[async_trait]
pub trait Command<C: ChatContext>: Send + Sync {
    fn help_info(&self) -> Option<HelpInfo> {
        None
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Ignored,
    Command(String),
    Fallback,
}

/// Verb to command lookup with a fallback for unknown or missing verbs.
pub struct CommandTable<C: ChatContext> {
    commands: HashMap<String, Box<dyn Command<C>>>,
    fallback: Box<dyn Command<C>>,
}

impl<C: ChatContext> CommandTable<C> {
    pub fn new(fallback: impl Command<C> + 'static) -> Self {
        Self {
            commands: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    pub fn with(mut self, verb: &str, command: impl Command<C> + 'static) -> Self {
        self.commands.insert(verb.to_lowercase(), Box::new(command));
        self
    }

    pub fn help_entries(&self) -> Vec<(String, HelpInfo)> {
        let mut entries: Vec<(String, HelpInfo)> = self
            .commands
            .iter()
            .filter_map(|(verb, command)| command.help_info().map(|info| (verb.clone(), info)))
            .collect();
        entries.sort_by(|f, s| f.0.cmp(&s.0));
        entries
    }

    pub async fn dispatch<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) -> Dispatched {
        let Some((verb, rest)) = next_token(params.text) else {
            self.fallback.process(ctx, params).await;
            return Dispatched::Fallback;
        };
        let verb = verb.to_lowercase();
        let Some(command) = self.commands.get(&verb) else {
            self.fallback.process(ctx, params).await;
            return Dispatched::Fallback;
        };
        command.process(ctx, params.with_text(rest)).await;
        Dispatched::Command(verb)
    }
}

/// A verb whose first argument selects a command from its own table.
pub struct CommandGroup<C: ChatContext> {
    pub help_info: Option<HelpInfo>,
    pub table: CommandTable<C>,
}

#[async_trait]
impl<C: ChatContext> Command<C> for CommandGroup<C> {
    fn help_info(&self) -> Option<HelpInfo> {
        self.help_info.clone()
    }
    async fn process<'a>(&'a self, ctx: &'a C, params: CommandParams<'a>) {
        let dispatched = self.table.dispatch(ctx, params).await;
        trace!("Command group dispatched {:?}.", dispatched);
    }
}

/// Shared, runtime-changeable command prefix.
#[derive(Clone)]
pub struct Prefix(Arc<RwLock<String>>);

impl Prefix {
    pub fn new(prefix: &str) -> Self {
        Self(Arc::new(RwLock::new(prefix.to_string())))
    }

    pub async fn get(&self) -> String {
        self.0.read().await.clone()
    }

    pub async fn set(&self, prefix: String) {
        *self.0.write().await = prefix;
    }
}

pub struct CommandRouter<C: ChatContext> {
    pub prefix: Prefix,
    pub table: CommandTable<C>,
}

impl<C: ChatContext> CommandRouter<C> {
    pub async fn dispatch(&self, ctx: &C, message: &IncomingMessage) -> Dispatched {
        let Some((first, rest)) = next_token(&message.content) else {
            return Dispatched::Ignored;
        };
        if first != self.prefix.get().await {
            return Dispatched::Ignored;
        }
        let params = CommandParams {
            guild_id: message.guild_id,
            channel_id: message.channel_id,
            author_id: message.author_id,
            mentions: &message.mentions,
            text: rest,
        };
        self.table.dispatch(ctx, params).await
    }
}

pub struct Handler {
    pub on_ready: Box<dyn OnReady + Send + Sync + 'static>,
    pub on_voice_server_update: Box<dyn OnVoiceServerUpdate + Send + Sync + 'static>,
    pub router: CommandRouter<Context>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        };
        let event_uuid = Uuid::new_v4();
        trace!("[{}] Message ENTER from {}.", event_uuid, msg.author.id);
        let message = IncomingMessage::from(&msg);
        let dispatched = self.router.dispatch(&ctx, &message).await;
        trace!("[{}] Message EXIT with {:?}.", event_uuid, dispatched);
    }
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.on_ready.process(ctx, ready).await;
    }
    async fn voice_server_update(&self, ctx: Context, update: VoiceServerUpdateEvent) {
        self.on_voice_server_update.process(ctx, update).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use std::sync::Mutex;

    struct Probe {
        name: &'static str,
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl Command<TestChat> for Probe {
        async fn process<'a>(&'a self, _ctx: &'a TestChat, params: CommandParams<'a>) {
            self.calls
                .lock()
                .unwrap()
                .push((self.name.to_string(), params.text.to_string()));
        }
    }

    fn router(calls: &Arc<Mutex<Vec<(String, String)>>>) -> CommandRouter<TestChat> {
        let probe = |name| Probe {
            name,
            calls: calls.clone(),
        };
        let music = CommandGroup {
            help_info: None,
            table: CommandTable::new(probe("music-fallback"))
                .with("play", probe("play"))
                .with("stop", probe("stop")),
        };
        CommandRouter {
            prefix: Prefix::new("!c"),
            table: CommandTable::new(probe("fallback"))
                .with("ping", probe("ping"))
                .with("music", music),
        }
    }

    #[test]
    fn splits_tokens() {
        assert_eq!(next_token("  play lofi  beats "), Some(("play", "lofi  beats ")));
        assert_eq!(next_token("stop"), Some(("stop", "")));
        assert_eq!(next_token("   "), None);
    }

    #[tokio::test]
    async fn routes_by_prefix_and_verb() {
        let calls = Arc::new(Mutex::new(vec![]));
        let router = router(&calls);
        let chat = TestChat::default();

        assert_eq!(
            router.dispatch(&chat, &message("!c ping")).await,
            Dispatched::Command("ping".to_string())
        );
        assert_eq!(
            router.dispatch(&chat, &message("!c PING")).await,
            Dispatched::Command("ping".to_string())
        );
        assert_eq!(
            router.dispatch(&chat, &message("!c bogus")).await,
            Dispatched::Fallback
        );
        assert_eq!(router.dispatch(&chat, &message("!c")).await, Dispatched::Fallback);
        assert_eq!(router.dispatch(&chat, &message("x ping")).await, Dispatched::Ignored);
        assert_eq!(router.dispatch(&chat, &message("!cping")).await, Dispatched::Ignored);
        assert_eq!(
            calls.lock().unwrap().iter().map(|c| c.0.as_str()).collect::<Vec<_>>(),
            vec!["ping", "ping", "fallback", "fallback"]
        );
    }

    #[tokio::test]
    async fn group_passes_query_verbatim() {
        let calls = Arc::new(Mutex::new(vec![]));
        let router = router(&calls);
        let chat = TestChat::default();

        router
            .dispatch(&chat, &message("!c music play lofi beats"))
            .await;
        router.dispatch(&chat, &message("!c music")).await;
        router.dispatch(&chat, &message("!c music rewind")).await;
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                ("play".to_string(), "lofi beats".to_string()),
                ("music-fallback".to_string(), "".to_string()),
                ("music-fallback".to_string(), "rewind".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn prefix_change_applies_to_next_message() {
        let calls = Arc::new(Mutex::new(vec![]));
        let router = router(&calls);
        let chat = TestChat::default();

        router.prefix.set("?".to_string()).await;
        assert_eq!(router.dispatch(&chat, &message("!c ping")).await, Dispatched::Ignored);
        assert_eq!(
            router.dispatch(&chat, &message("? ping")).await,
            Dispatched::Command("ping".to_string())
        );
    }

    #[tokio::test]
    async fn print_text_command_replies_in_channel() {
        let chat = TestChat::default();
        let table: CommandTable<TestChat> = CommandTable::new(PrintTextCommand {
            help_info: None,
            text: "unknown command".to_string(),
        });
        let msg = message("whatever");
        let params = CommandParams {
            guild_id: msg.guild_id,
            channel_id: msg.channel_id,
            author_id: msg.author_id,
            mentions: &msg.mentions,
            text: &msg.content,
        };
        table.dispatch(&chat, params).await;
        assert_eq!(chat.replies(), vec!["unknown command"]);
    }
}
