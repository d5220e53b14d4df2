mod announce;
mod config;
mod session;

pub use announce::Announcement;
pub use config::Config;
pub use model::{Question, ScoreBoard, Standing};
pub use session::{Hint, Session, Skip, Verdict};

use async_trait::async_trait;
use core::fmt::Display;
use std::sync::Arc;

/// Supplies the question of each new round.
#[async_trait]
pub trait QuestionSource: Send + Sync + 'static {
    type Error: Display + Send;

    async fn next_question(&self) -> Result<Question, Self::Error>;
}

/// Channel-scoped persistence of the scores.
#[async_trait]
pub trait ScoreStore: Send + Sync + 'static {
    type Error: Display + Send;

    async fn load(&self, channel: &str) -> Result<ScoreBoard, Self::Error>;
    async fn save(&self, channel: &str, scores: &ScoreBoard) -> Result<(), Self::Error>;
}

/// Fire-and-forget delivery of announcements to a channel.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn post(&self, channel: &str, announcement: Announcement);
}

#[async_trait]
impl<T: QuestionSource> QuestionSource for Arc<T> {
    type Error = T::Error;

    async fn next_question(&self) -> Result<Question, Self::Error> {
        T::next_question(self).await
    }
}

#[async_trait]
impl<T: ScoreStore> ScoreStore for Arc<T> {
    type Error = T::Error;

    async fn load(&self, channel: &str) -> Result<ScoreBoard, Self::Error> {
        T::load(self, channel).await
    }

    async fn save(&self, channel: &str, scores: &ScoreBoard) -> Result<(), Self::Error> {
        T::save(self, channel, scores).await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn post(&self, channel: &str, announcement: Announcement) {
        T::post(self, channel, announcement).await
    }
}
