use std::path::PathBuf;

use syncsketch_shared::{
    decode_session_file, encode_session_file, SessionFileData, SessionFileDecodeError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] SessionFileDecodeError),
    #[error("session encoding failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

/// One `<session id>.bin` file per session in a directory.
pub struct FileStorage {
    session_dir: PathBuf,
}

impl FileStorage {
    pub fn new(session_dir: PathBuf) -> Self {
        Self { session_dir }
    }

    fn path(&self, session_id: &str) -> PathBuf {
        self.session_dir.join(format!("{session_id}.bin"))
    }

    pub async fn load_session(&self, session_id: &str) -> Result<SessionFileData, StorageError> {
        let payload = tokio::fs::read(self.path(session_id)).await?;
        Ok(decode_session_file(&payload)?)
    }

    pub async fn save_session(
        &self,
        session_id: &str,
        data: &SessionFileData,
    ) -> Result<(), StorageError> {
        let payload = encode_session_file(data)?;
        tokio::fs::write(self.path(session_id), payload).await?;
        Ok(())
    }
}
