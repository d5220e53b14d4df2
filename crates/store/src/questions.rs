use crate::error::{Error, Result};
use async_trait::async_trait;
use game::QuestionSource;
use log::{info, warn};
use model::Question;
use std::{collections::VecDeque, path::PathBuf};
use tokio::{fs, sync::Mutex};

/// Serves the questions of a JSON array file in order. Once every question has been asked, the file
/// is read again so that edits are picked up between passes.
pub struct JsonQuestions {
    path: PathBuf,
    deck: Mutex<VecDeque<Question>>,
}

impl JsonQuestions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), deck: Mutex::default() }
    }

    async fn reload(&self) -> Result<VecDeque<Question>> {
        let bytes = fs::read(&self.path).await?;
        let questions: Vec<Question> = serde_json::from_slice(&bytes)?;
        drop(bytes);

        let total = questions.len();
        let deck: VecDeque<_> = questions.into_iter().filter(Question::is_well_formed).collect();
        if deck.len() < total {
            warn!("skipped {} malformed questions in {}", total - deck.len(), self.path.display());
        }

        if deck.is_empty() {
            return Err(Error::NoQuestions);
        }

        info!("loaded {} questions from {}", deck.len(), self.path.display());
        Ok(deck)
    }
}

#[async_trait]
impl QuestionSource for JsonQuestions {
    type Error = Error;

    async fn next_question(&self) -> Result<Question> {
        let mut deck = self.deck.lock().await;
        if deck.is_empty() {
            *deck = self.reload().await?;
        }
        deck.pop_front().ok_or(Error::NoQuestions)
    }
}
