use crate::error::{Error, Result};
use async_trait::async_trait;
use game::ScoreStore;
use model::ScoreBoard;
use std::{io::ErrorKind, path::PathBuf};
use tokio::fs;

/// One pretty-printed JSON file per channel, all within a single directory.
pub struct ScoreFiles {
    dir: PathBuf,
}

impl ScoreFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_of(&self, channel: &str) -> Result<PathBuf> {
        let valid = !channel.is_empty()
            && channel.bytes().all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_'));
        if !valid {
            return Err(Error::BadChannel);
        }
        Ok(self.dir.join(format!("{channel}.json")))
    }
}

#[async_trait]
impl ScoreStore for ScoreFiles {
    type Error = Error;

    async fn load(&self, channel: &str) -> Result<ScoreBoard> {
        let path = self.path_of(channel)?;
        match fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ScoreBoard::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, channel: &str, scores: &ScoreBoard) -> Result<()> {
        let path = self.path_of(channel)?;
        let bytes = serde_json::to_vec_pretty(scores)?;
        fs::create_dir_all(&self.dir).await?;
        fs::write(path, bytes).await?;
        Ok(())
    }
}
