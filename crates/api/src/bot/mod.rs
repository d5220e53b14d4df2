mod error;

use core::time::Duration;
use dashmap::DashMap;
use game::{Config, Hint, Notifier, Session, Skip, Verdict};
use log::info;
use std::sync::Arc;
use store::{JsonQuestions, ScoreFiles};
use twilight_model::{
    application::interaction::{
        application_command::{CommandData, CommandDataOption, CommandOptionValue},
        Interaction, InteractionData, InteractionType,
    },
    channel::message::{
        embed::{Embed, EmbedField},
        MessageFlags,
    },
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
    id::{marker::ChannelMarker, Id},
};

type ChannelId = Id<ChannelMarker>;
type Trivia = Session<Arc<JsonQuestions>, Arc<ScoreFiles>, Arc<dyn Notifier>>;

pub struct Bot {
    /// One game per channel, created on first use.
    sessions: DashMap<ChannelId, Arc<Trivia>>,
    questions: Arc<JsonQuestions>,
    scores: Arc<ScoreFiles>,
    notifier: Arc<dyn Notifier>,
    config: Config,
}

fn ephemeral(text: String) -> InteractionResponse {
    InteractionResponse {
        kind: InteractionResponseType::ChannelMessageWithSource,
        data: Some(InteractionResponseData {
            content: Some(text),
            flags: Some(MessageFlags::EPHEMERAL),
            ..Default::default()
        }),
    }
}

/// Extracts the submission of the `/answer` command.
fn answer_text(options: &[CommandDataOption]) -> error::Result<&str> {
    let [CommandDataOption { name, value: CommandOptionValue::String(text) }] = options else {
        return Err(error::Error::InvalidParams);
    };

    if name.as_str() != "text" {
        return Err(error::Error::UnknownParamName);
    }

    Ok(text.as_str())
}

impl Bot {
    pub fn new(notifier: impl Notifier, questions: JsonQuestions, scores: ScoreFiles, config: Config) -> Self {
        Self {
            sessions: DashMap::new(),
            questions: Arc::new(questions),
            scores: Arc::new(scores),
            notifier: Arc::new(notifier),
            config,
        }
    }

    pub async fn on_message(&self, interaction: Interaction) -> InteractionResponse {
        let result = match interaction.kind {
            InteractionType::Ping => Ok(InteractionResponse { kind: InteractionResponseType::Pong, data: None }),
            InteractionType::ApplicationCommand => self.on_app_command(interaction).await,
            _ => Err(error::Error::UnsupportedInteraction),
        };

        match result {
            Ok(res) => res,
            Err(err) => ephemeral(err.to_string()),
        }
    }

    async fn session(&self, channel: ChannelId) -> Arc<Trivia> {
        let existing = self.sessions.get(&channel).map(|entry| Arc::clone(entry.value()));
        if let Some(session) = existing {
            return session;
        }

        // Scores are loaded without holding the map's shard lock. A concurrent first command in the
        // same channel may load them twice, but only one of the sessions is kept.
        info!("opening a trivia session in channel {channel}");
        let session = Session::new(
            channel.to_string(),
            self.config.clone(),
            Arc::clone(&self.questions),
            Arc::clone(&self.scores),
            Arc::clone(&self.notifier),
        )
        .await;
        let entry = self.sessions.entry(channel).or_insert(session);
        Arc::clone(entry.value())
    }

    async fn on_app_command(&self, interaction: Interaction) -> error::Result<InteractionResponse> {
        let user =
            interaction.member.and_then(|member| member.user).xor(interaction.user).ok_or(error::Error::UnknownUser)?;
        let Some(InteractionData::ApplicationCommand(data)) = interaction.data else {
            return Err(error::Error::Fatal);
        };

        let CommandData { name, options, .. } = *data;
        if name.as_str() == "help" {
            return Ok(Self::on_help_command());
        }

        let channel = interaction.channel.map(|channel| channel.id).ok_or(error::Error::UnknownChannel)?;
        let session = self.session(channel).await;
        let text = match name.as_str() {
            "start" => {
                if session.is_question_active().await {
                    String::from("A question is already in progress.")
                } else {
                    session.start_next_question(Some(Duration::ZERO)).await;
                    String::from("Here comes a new question!")
                }
            }
            "answer" => match session.handle_answer(&user.name, answer_text(&options)?).await {
                Verdict::Idle => String::from("There is no active question right now."),
                Verdict::Ignored => String::from("Not quite. Try again!"),
                Verdict::Correct { points, score } => format!("Correct! That is +{points}, for a total of {score}."),
            },
            "skip" => match session.record_skip(&user.name).await {
                Skip::Idle => String::from("There is no active question right now."),
                Skip::Pending { .. } => String::from("Your vote to skip has been counted."),
                Skip::Abandoned => String::from("The question has been skipped."),
            },
            "hint" => match session.request_hint().await {
                Hint::Idle => String::from("There is no active question right now."),
                Hint::Throttled => String::from("Please wait a little before asking for another hint."),
                Hint::Shown => String::from("A hint has been posted."),
            },
            "scores" => {
                session.request_scores().await;
                String::from("The standings have been posted.")
            }
            _ => return Err(error::Error::UnknownCommandName),
        };

        Ok(ephemeral(text))
    }

    fn on_help_command() -> InteractionResponse {
        let commands = [
            ("`/start`", "Post a new question if none is in progress."),
            ("`/answer text`", "Submit an answer. Case and surrounding spaces do not matter."),
            ("`/skip`", "Vote to abandon the current question."),
            ("`/hint`", "Reveal a hint. Hints are rate limited."),
            ("`/scores`", "Show the standings of this channel."),
            ("`/help`", "Summon this help menu!"),
        ];
        let fields = commands
            .into_iter()
            .map(|(name, value)| EmbedField { name: String::from(name), value: String::from(value), inline: false })
            .collect();
        InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(InteractionResponseData {
                flags: Some(MessageFlags::EPHEMERAL),
                embeds: Some(Vec::from([Embed {
                    author: None,
                    color: None,
                    footer: None,
                    image: None,
                    provider: None,
                    thumbnail: None,
                    timestamp: None,
                    url: None,
                    video: None,
                    kind: String::from("rich"),
                    title: Some(String::from("Trivia Commands")),
                    description: Some(String::from("Available commands for the trivia bot.")),
                    fields,
                }])),
                ..Default::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{answer_text, error::Error, Bot, CommandDataOption, CommandOptionValue, InteractionResponseType};
    use async_trait::async_trait;
    use core::time::Duration;
    use game::{Announcement, Config, Notifier};
    use serde_json::{json, Value};
    use std::{
        fs,
        sync::{Arc, Mutex},
    };
    use store::{JsonQuestions, ScoreFiles};
    use tempfile::TempDir;
    use twilight_model::{application::interaction::Interaction, http::interaction::InteractionResponse};

    fn option(name: &str, value: CommandOptionValue) -> CommandDataOption {
        CommandDataOption { name: String::from(name), value }
    }

    #[test]
    fn extracts_answer_text() {
        let options = [option("text", CommandOptionValue::String(String::from(" Paris ")))];
        assert!(matches!(answer_text(&options), Ok(" Paris ")));
    }

    #[test]
    fn rejects_malformed_answers() {
        assert!(matches!(answer_text(&[]), Err(Error::InvalidParams)));
        assert!(matches!(
            answer_text(&[option("text", CommandOptionValue::Integer(4))]),
            Err(Error::InvalidParams)
        ));
        assert!(matches!(
            answer_text(&[option("guess", CommandOptionValue::String(String::from("4")))]),
            Err(Error::UnknownParamName)
        ));
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Announcement>>>);

    impl Recorder {
        fn take(&self) -> Vec<Announcement> {
            core::mem::take(&mut *self.0.lock().unwrap())
        }

        /// Waits for the session's background round to post something.
        async fn wait(&self) -> Vec<Announcement> {
            for _ in 0..200 {
                let posted = self.take();
                if !posted.is_empty() {
                    return posted;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            Vec::new()
        }
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn post(&self, _: &str, announcement: Announcement) {
            self.0.lock().unwrap().push(announcement);
        }
    }

    fn bot() -> (Bot, Recorder, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let questions = dir.path().join("questions.json");
        fs::write(&questions, r#"[{ "text": "What is the capital of France?", "answer": "Paris" }]"#).unwrap();

        let recorder = Recorder::default();
        let bot = Bot::new(
            recorder.clone(),
            JsonQuestions::new(questions),
            ScoreFiles::new(dir.path().join("scores")),
            Config::default(),
        );
        (bot, recorder, dir)
    }

    fn interaction(mut body: Value) -> Interaction {
        body["application_id"] = json!("1");
        body["id"] = json!("2");
        body["token"] = json!("token");
        serde_json::from_value(body).unwrap()
    }

    fn command(channel: Option<&str>, name: &str, options: Value) -> Interaction {
        let mut body = json!({
            "type": 2,
            "user": { "id": "3", "username": "alice", "discriminator": "0" },
            "data": { "id": "4", "name": name, "type": 1, "options": options },
        });
        if let Some(id) = channel {
            body["channel"] = json!({ "id": id, "type": 0 });
        }
        interaction(body)
    }

    fn content(response: InteractionResponse) -> String {
        assert!(matches!(response.kind, InteractionResponseType::ChannelMessageWithSource));
        response.data.and_then(|data| data.content).unwrap_or_default()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn answers_pings_with_pongs() {
        let (bot, recorder, _dir) = bot();
        let response = bot.on_message(interaction(json!({ "type": 1 }))).await;
        assert!(matches!(response.kind, InteractionResponseType::Pong));
        assert!(response.data.is_none());
        assert!(recorder.take().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn routes_commands_to_the_channel_session() {
        let (bot, recorder, _dir) = bot();
        let none = json!([]);

        let reply = content(bot.on_message(command(Some("100"), "start", none.clone())).await);
        assert_eq!(reply, "Here comes a new question!");
        assert_eq!(
            recorder.wait().await,
            [Announcement::Question { text: String::from("What is the capital of France?"), points: 1 }]
        );

        let reply = content(bot.on_message(command(Some("100"), "start", none.clone())).await);
        assert_eq!(reply, "A question is already in progress.");
        let reply = content(bot.on_message(command(Some("100"), "hint", none.clone())).await);
        assert_eq!(reply, "Please wait a little before asking for another hint.");

        let guess = |text: &str| json!([{ "name": "text", "type": 3, "value": text }]);
        let reply = content(bot.on_message(command(Some("100"), "answer", guess("Lyon"))).await);
        assert_eq!(reply, "Not quite. Try again!");

        // Another channel has a game of its own.
        let reply = content(bot.on_message(command(Some("200"), "answer", guess("Paris"))).await);
        assert_eq!(reply, "There is no active question right now.");

        let reply = content(bot.on_message(command(Some("100"), "skip", none.clone())).await);
        assert_eq!(reply, "Your vote to skip has been counted.");
        recorder.take();

        let reply = content(bot.on_message(command(Some("100"), "answer", guess(" paris "))).await);
        assert_eq!(reply, "Correct! That is +1, for a total of 1.");
        assert!(matches!(recorder.take().as_slice(), [Announcement::Correct { score: 1, .. }]));

        let reply = content(bot.on_message(command(Some("100"), "scores", none)).await);
        assert_eq!(reply, "The standings have been posted.");
        assert!(matches!(recorder.take().as_slice(), [Announcement::Standings(standings)] if standings.len() == 1));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn reports_unusable_commands() {
        let (bot, recorder, _dir) = bot();

        let reply = content(bot.on_message(command(Some("100"), "dance", json!([]))).await);
        assert_eq!(reply, Error::UnknownCommandName.to_string());

        let reply = content(bot.on_message(command(None, "start", json!([]))).await);
        assert_eq!(reply, Error::UnknownChannel.to_string());

        let reply = content(bot.on_message(command(Some("100"), "answer", json!([]))).await);
        assert_eq!(reply, Error::InvalidParams.to_string());

        // Help needs no channel.
        let response = bot.on_message(command(None, "help", json!([]))).await;
        assert!(response.data.and_then(|data| data.embeds).is_some_and(|embeds| embeds.len() == 1));
        assert!(recorder.take().is_empty());
    }
}
