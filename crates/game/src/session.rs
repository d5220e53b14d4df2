use crate::{Announcement, Config, Notifier, QuestionSource, ScoreStore};
use core::time::Duration;
use log::{debug, error, info, warn};
use model::{Question, ScoreBoard};
use std::{collections::HashSet, sync::Arc};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant},
};

/// Result of a skip vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    /// No round is in progress.
    Idle,
    /// The vote was counted but the round continues.
    Pending { remaining: usize },
    /// The ballot is full and the next round has been scheduled.
    Abandoned,
}

/// Result of checking a submitted answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// No round is in progress, so nothing was evaluated.
    Idle,
    /// The submission was evaluated and did not match.
    Ignored,
    Correct { points: u32, score: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hint {
    Idle,
    /// Asked again before the hint delay elapsed.
    Throttled,
    Shown,
}

struct State {
    question: Option<Question>,
    /// A question fetched for a round that was superseded meanwhile. The next round asks it first.
    spare: Option<Question>,
    skips: HashSet<String>,
    scores: ScoreBoard,
    /// Correct answers left until the standings are shown again.
    reveal_countdown: u32,
    /// When the current question was posted or the last hint was given.
    last_hint: Instant,
    /// Bumped on every transition to idle. A deferred fetch only lands in its own round.
    round: u64,
    /// The scheduled round while it is still waiting out its delay.
    pending: Option<JoinHandle<()>>,
}

/// The trivia game of a single channel.
///
/// State changes happen under a lock, but announcements are only posted once it is released so that
/// a slow notifier never holds up the other commands of the channel.
pub struct Session<Q, S, N> {
    channel: Box<str>,
    config: Config,
    source: Q,
    store: S,
    notifier: N,
    state: Mutex<State>,
    /// Serializes score writes so that an older snapshot never overwrites a newer one.
    persist: Mutex<()>,
}

impl<Q, S, N> Session<Q, S, N>
where
    Q: QuestionSource,
    S: ScoreStore,
    N: Notifier,
{
    /// Creates an idle session. The channel's scores are loaded right away; a failed load starts
    /// from an empty board.
    pub async fn new(channel: impl Into<Box<str>>, config: Config, source: Q, store: S, notifier: N) -> Arc<Self> {
        let channel = channel.into();
        let scores = store.load(&channel).await.unwrap_or_else(|err| {
            warn!("failed to load the scores of channel {channel}: {err}");
            ScoreBoard::new()
        });
        let state = State {
            question: None,
            spare: None,
            skips: HashSet::new(),
            scores,
            reveal_countdown: config.show_score_interval.get(),
            last_hint: Instant::now(),
            round: 0,
            pending: None,
        };
        Arc::new(Self {
            channel,
            config,
            source,
            store,
            notifier,
            state: Mutex::new(state),
            persist: Mutex::new(()),
        })
    }

    pub async fn is_question_active(&self) -> bool {
        self.state.lock().await.question.is_some()
    }

    /// Snapshot of the active question, if any.
    pub async fn question(&self) -> Option<Question> {
        self.state.lock().await.question.clone()
    }

    pub async fn score(&self, user: &str) -> u64 {
        self.state.lock().await.scores.get(user).copied().unwrap_or_default()
    }

    /// Ends the current round immediately and schedules the next question after `delay`, which
    /// defaults to the configured gap. Any previously scheduled question is cancelled.
    pub async fn start_next_question(self: &Arc<Self>, delay: Option<Duration>) {
        let mut state = self.state.lock().await;
        self.schedule(&mut state, delay);
    }

    pub async fn record_skip(self: &Arc<Self>, user: &str) -> Skip {
        let mut state = self.state.lock().await;
        if state.question.is_none() {
            return Skip::Idle;
        }

        state.skips.insert(user.to_owned());
        let votes = state.skips.len();
        let needed = self.config.skip_count.get();
        if votes < needed {
            drop(state);
            let remaining = needed - votes;
            self.announce([Announcement::SkipVote { user: user.to_owned(), remaining }]).await;
            return Skip::Pending { remaining };
        }

        info!("channel {} voted to skip round {}", self.channel, state.round);
        let answer = state.question.take().map(|question| question.answer).unwrap_or_default();
        self.schedule(&mut state, None);
        drop(state);

        self.announce([Announcement::Skipped { answer }]).await;
        Skip::Abandoned
    }

    pub async fn handle_answer(self: &Arc<Self>, user: &str, submission: &str) -> Verdict {
        let mut state = self.state.lock().await;
        let points = match state.question.as_ref() {
            None => return Verdict::Idle,
            Some(question) if !question.accepts(submission) => return Verdict::Ignored,
            Some(question) => question.points(),
        };

        let answer = state.question.take().map(|question| question.answer).unwrap_or_default();
        let score = {
            let score = state.scores.entry(user.to_owned()).or_default();
            *score = score.saturating_add(points.into());
            *score
        };

        let mut announcements = Vec::from([Announcement::Correct { user: user.to_owned(), answer, score }]);
        state.reveal_countdown = state.reveal_countdown.saturating_sub(1);
        if state.reveal_countdown == 0 {
            state.reveal_countdown = self.config.show_score_interval.get();
            announcements.push(Announcement::Standings(model::standings(&state.scores)));
        }

        self.schedule(&mut state, None);
        drop(state);

        self.persist().await;
        self.announce(announcements).await;
        Verdict::Correct { points, score }
    }

    pub async fn request_hint(&self) -> Hint {
        let mut state = self.state.lock().await;
        let Some(question) = state.question.as_ref() else {
            return Hint::Idle;
        };

        if state.last_hint.elapsed() < self.config.hint_delay {
            return Hint::Throttled;
        }

        let hint = question.hint().into_owned();
        state.last_hint = Instant::now();
        drop(state);

        self.announce([Announcement::Hint(hint)]).await;
        Hint::Shown
    }

    /// Shows the standings on demand. This also restarts the automatic reveal countdown.
    pub async fn request_scores(&self) {
        let mut state = self.state.lock().await;
        state.reveal_countdown = self.config.show_score_interval.get();
        let standings = model::standings(&state.scores);
        drop(state);

        self.announce([Announcement::Standings(standings)]).await;
    }

    async fn announce(&self, announcements: impl IntoIterator<Item = Announcement>) {
        for announcement in announcements {
            self.notifier.post(&self.channel, announcement).await;
        }
    }

    /// Writes the latest board. The in-memory board stays authoritative even when this fails.
    async fn persist(&self) {
        let _guard = self.persist.lock().await;
        let scores = self.state.lock().await.scores.clone();
        if let Err(err) = self.store.save(&self.channel, &scores).await {
            error!("failed to save the scores of channel {}: {err}", self.channel);
        }
    }

    fn schedule(self: &Arc<Self>, state: &mut State, delay: Option<Duration>) {
        state.question = None;
        state.skips.clear();
        state.round = state.round.wrapping_add(1);
        if let Some(pending) = state.pending.take() {
            debug!("cancelling the pending question of channel {}", self.channel);
            pending.abort();
        }

        let round = state.round;
        let delay = delay.unwrap_or(self.config.next_question_gap);
        let session = Arc::clone(self);
        state.pending = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            session.begin_round(round).await;
        }));
    }

    async fn begin_round(&self, round: u64) {
        let spare = {
            let mut state = self.state.lock().await;
            if state.round != round {
                return;
            }
            // From here on the round runs to completion and cannot be aborted.
            state.pending = None;
            state.spare.take()
        };

        let fetched = match spare {
            Some(question) => Ok(question),
            None => self.source.next_question().await,
        };

        let mut state = self.state.lock().await;
        if state.round != round {
            debug!("keeping a stale question of channel {} for the next round", self.channel);
            if let Ok(question) = fetched {
                state.spare = Some(question);
            }
            return;
        }

        let announcement = match fetched {
            Ok(question) => {
                info!("channel {} starts round {round}", self.channel);
                let announcement = Announcement::Question { text: question.text.clone(), points: question.points() };
                state.question = Some(question);
                state.last_hint = Instant::now();
                announcement
            }
            Err(err) => {
                error!("no question available for channel {}: {err}", self.channel);
                Announcement::NoQuestion
            }
        };
        drop(state);

        self.announce([announcement]).await;
    }
}
